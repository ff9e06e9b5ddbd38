//! Alert threshold submission
//!
//! Two entry points share one endpoint. [`AlertSubmitter::update_rules`] posts
//! an arbitrary rules object and reports through a blocking [`Dialog`];
//! [`AlertSubmitter::save_thresholds`] reads the three form inputs and
//! reports inline. Neither guards against double submission.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::client::{render_json, RequestClient};
use crate::widgets::Panel;

/// Endpoint accepting both payload shapes
pub const ALERTS_PATH: &str = "/api/alerts/update";

/// Percentage used for any input that is missing or does not parse
pub const DEFAULT_PERCENT: i64 = 80;

/// Parse an input value the way a browser's `parseInt(v, 10)` would:
/// leading whitespace, an optional sign, then the longest run of digits.
/// Anything without digits falls back to [`DEFAULT_PERCENT`].
pub fn parse_threshold(input: Option<&str>) -> i64 {
    let Some(raw) = input else {
        return DEFAULT_PERCENT;
    };

    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return DEFAULT_PERCENT;
    }

    match digits.parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) => DEFAULT_PERCENT,
    }
}

/// Payload of the named-field variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub cpu: i64,
    pub memory: i64,
    pub disk: i64,
}

impl AlertThresholds {
    /// Each field defaults independently
    pub fn from_inputs(cpu: Option<&str>, memory: Option<&str>, disk: Option<&str>) -> Self {
        Self {
            cpu: parse_threshold(cpu),
            memory: parse_threshold(memory),
            disk: parse_threshold(disk),
        }
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cpu: DEFAULT_PERCENT,
            memory: DEFAULT_PERCENT,
            disk: DEFAULT_PERCENT,
        }
    }
}

/// The threshold form: three optional inputs and the inline output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertForm {
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub disk: Option<String>,
    pub output: Panel,
}

impl AlertForm {
    pub fn thresholds(&self) -> AlertThresholds {
        AlertThresholds::from_inputs(self.cpu.as_deref(), self.memory.as_deref(), self.disk.as_deref())
    }
}

/// Blocking user-facing confirmation
pub trait Dialog: Send + Sync {
    fn alert(&self, message: &str);
}

/// Dialog printing to standard output
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleDialog;

impl Dialog for ConsoleDialog {
    fn alert(&self, message: &str) {
        println!("{}", message);
    }
}

/// Posts alert configuration to the backend
pub struct AlertSubmitter {
    client: RequestClient,
    dialog: Arc<dyn Dialog>,
    form: Option<Arc<RwLock<AlertForm>>>,
}

impl AlertSubmitter {
    /// `form` is `None` when the page has no threshold form
    pub fn new(client: RequestClient, dialog: Arc<dyn Dialog>, form: Option<AlertForm>) -> Self {
        Self {
            client,
            dialog,
            form: form.map(|f| Arc::new(RwLock::new(f))),
        }
    }

    pub fn has_form(&self) -> bool {
        self.form.is_some()
    }

    pub async fn form(&self) -> Option<AlertForm> {
        match &self.form {
            Some(form) => Some(form.read().await.clone()),
            None => None,
        }
    }

    /// Set the form inputs; `None` leaves an input as it is
    pub async fn set_inputs(&self, cpu: Option<String>, memory: Option<String>, disk: Option<String>) {
        if let Some(form) = &self.form {
            let mut form = form.write().await;
            if cpu.is_some() {
                form.cpu = cpu;
            }
            if memory.is_some() {
                form.memory = memory;
            }
            if disk.is_some() {
                form.disk = disk;
            }
        }
    }

    /// Post `rules` verbatim and report through the dialog.
    /// Returns whether the backend accepted them.
    pub async fn update_rules(&self, rules: &Value) -> bool {
        let body = render_json(rules, false);
        match self.client.post(ALERTS_PATH, body).await {
            Ok(ack) => {
                info!("Alert rules updated");
                self.dialog.alert(&format!("Alerts updated: {}", ack.to_compact()));
                true
            }
            Err(e) => {
                error!(error = %e, category = e.category(), "Alert rules update failed");
                self.dialog.alert(&format!("Error updating alerts: {}", e));
                false
            }
        }
    }

    /// Read the form, post the thresholds and render the outcome inline.
    ///
    /// Returns the submitted thresholds, or `None` when the page has no form.
    pub async fn save_thresholds(&self) -> Option<AlertThresholds> {
        let form = self.form.as_ref()?;
        let thresholds = form.read().await.thresholds();

        let body = match serde_json::to_string(&thresholds) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to encode thresholds");
                form.write().await.output.show(format!("Error: {}", e));
                return Some(thresholds);
            }
        };

        info!(
            cpu = thresholds.cpu,
            memory = thresholds.memory,
            disk = thresholds.disk,
            "Saving alert thresholds"
        );
        let text = match self.client.post(ALERTS_PATH, body).await {
            Ok(ack) => format!("Updated: {}", ack.to_compact()),
            Err(e) => {
                error!(error = %e, category = e.category(), "Alert threshold update failed");
                format!("Error: {}", e)
            }
        };

        form.write().await.output.show(text);
        Some(thresholds)
    }
}
