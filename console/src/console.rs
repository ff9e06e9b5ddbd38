//! Page initialization and feature wiring
//!
//! [`Console::initialize`] looks at the page once, activates every feature
//! whose elements exist, and hands back entry points for the UI events. A
//! missing element only switches its feature off.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::alerts::{AlertForm, AlertSubmitter, AlertThresholds, Dialog};
use crate::client::{HttpTransport, RequestClient, RequestStats};
use crate::config::PollingConfig;
use crate::info::InfoFetcher;
use crate::navigation::{BackAction, BackButton, SessionHistory};
use crate::page::{Capabilities, ElementId, PageLayout};
use crate::provision::{ProvisionController, ProvisionOutcome, ProvisionRequest, ProvisionView};
use crate::status::{StatusBoard, StatusEvent, StatusPoller};
use crate::toast::Toast;
use crate::widgets::{Button, Panel};
use crate::{ConsoleError, Result};

/// Page the console is hosted on
pub const CONSOLE_PATH: &str = "/admin";

/// Serializable copy of every view
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleSnapshot {
    pub captured_at: DateTime<Utc>,
    pub capabilities: Capabilities,
    pub status: Option<StatusBoard>,
    pub provision: Option<ProvisionView>,
    pub info: Option<Panel>,
    pub alerts: Option<AlertForm>,
    pub requests: RequestStats,
}

/// The admin console hosted on one page
pub struct Console {
    client: RequestClient,
    capabilities: Capabilities,
    polling: PollingConfig,
    status: Option<Arc<StatusPoller>>,
    provision: Option<ProvisionController>,
    info: Option<InfoFetcher>,
    alerts: AlertSubmitter,
    history: Option<RwLock<SessionHistory>>,
}

impl Console {
    /// Wire every feature the page supports
    pub fn initialize(
        layout: PageLayout,
        transport: Arc<dyn HttpTransport>,
        polling: PollingConfig,
        dialog: Arc<dyn Dialog>,
    ) -> Result<Self> {
        let capabilities = layout.capabilities();
        let client = RequestClient::new(transport, layout.meta.clone());

        let status = capabilities.status.then(|| {
            Arc::new(StatusPoller::new(
                client.clone(),
                std::time::Duration::from_millis(polling.status_interval_ms),
            ))
        });

        let provision = if capabilities.provision {
            let view = ProvisionView::new(
                Button::new(layout.text(ElementId::BtnProvision).unwrap_or_default()),
                layout.contains(ElementId::ProvisionResult).then(Panel::new),
                layout.contains(ElementId::Toast).then(Toast::new),
            );
            Some(ProvisionController::new(client.clone(), view, &ProvisionRequest::standard())?)
        } else {
            None
        };

        let info = capabilities.info.then(|| InfoFetcher::new(client.clone()));

        let form = capabilities.alert_form.then(|| AlertForm {
            cpu: layout.text(ElementId::Cpu).map(str::to_string),
            memory: layout.text(ElementId::Memory).map(str::to_string),
            disk: layout.text(ElementId::Disk).map(str::to_string),
            output: Panel::new(),
        });
        let alerts = AlertSubmitter::new(client.clone(), dialog, form);

        let history = capabilities
            .back
            .then(|| RwLock::new(SessionHistory::new(CONSOLE_PATH)));

        info!(
            status = capabilities.status,
            provision = capabilities.provision,
            info = capabilities.info,
            alert_form = capabilities.alert_form,
            back = capabilities.back,
            csrf = layout.meta.csrf_token().is_some(),
            "Console initialized"
        );

        Ok(Self {
            client,
            capabilities,
            polling,
            status,
            provision,
            info,
            alerts,
            history,
        })
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn client(&self) -> &RequestClient {
        &self.client
    }

    /// Start status polling: one check now, then one per interval.
    ///
    /// Returns `None` when the page has no status indicators or polling is off.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        let Some(poller) = &self.status else {
            warn!("Status indicators missing, polling not started");
            return None;
        };
        if !self.polling.enabled {
            info!("Status polling disabled");
            return None;
        }
        Some(poller.start())
    }

    /// Run a single status check outside the timer
    pub async fn refresh_status(&self) -> Result<StatusEvent> {
        let poller = self
            .status
            .as_ref()
            .ok_or_else(|| ConsoleError::feature_unavailable("status", ElementId::PromStatus))?;
        Ok(poller.tick().await)
    }

    /// Click on the provision button
    pub async fn provision(&self) -> Result<ProvisionOutcome> {
        let controller = self
            .provision
            .as_ref()
            .ok_or_else(|| ConsoleError::feature_unavailable("provision", ElementId::BtnProvision))?;
        Ok(controller.click().await)
    }

    /// Click on the Grafana info button
    pub async fn fetch_info(&self) -> Result<bool> {
        let fetcher = self
            .info
            .as_ref()
            .ok_or_else(|| ConsoleError::feature_unavailable("grafana info", ElementId::BtnGrafInfo))?;
        Ok(fetcher.fetch().await)
    }

    /// Type into the threshold inputs; `None` leaves an input untouched
    pub async fn set_alert_inputs(
        &self,
        cpu: Option<String>,
        memory: Option<String>,
        disk: Option<String>,
    ) -> Result<()> {
        if !self.alerts.has_form() {
            return Err(ConsoleError::feature_unavailable("alert form", ElementId::BtnAlertSaveAjax));
        }
        self.alerts.set_inputs(cpu, memory, disk).await;
        Ok(())
    }

    /// Click on the save-thresholds button
    pub async fn save_thresholds(&self) -> Result<AlertThresholds> {
        self.alerts
            .save_thresholds()
            .await
            .ok_or_else(|| ConsoleError::feature_unavailable("alert form", ElementId::BtnAlertSaveAjax))
    }

    /// Post an arbitrary rules object; needs no page element
    pub async fn update_alert_rules(&self, rules: &Value) -> bool {
        self.alerts.update_rules(rules).await
    }

    /// Click on the back button
    pub async fn go_back(&self) -> Result<BackAction> {
        let history = self
            .history
            .as_ref()
            .ok_or_else(|| ConsoleError::feature_unavailable("back", ElementId::BtnBack))?;
        let mut history = history.write().await;
        Ok(BackButton::press(&mut *history))
    }

    /// Session history, when the page has a back button
    pub async fn history(&self) -> Option<SessionHistory> {
        match &self.history {
            Some(history) => Some(history.read().await.clone()),
            None => None,
        }
    }

    pub async fn snapshot(&self) -> ConsoleSnapshot {
        let status = match &self.status {
            Some(poller) => Some(poller.board().await),
            None => None,
        };
        let provision = match &self.provision {
            Some(controller) => Some(controller.view().await),
            None => None,
        };
        let info = match &self.info {
            Some(fetcher) => Some(fetcher.panel().await),
            None => None,
        };

        ConsoleSnapshot {
            captured_at: Utc::now(),
            capabilities: self.capabilities,
            status,
            provision,
            info,
            alerts: self.alerts.form().await,
            requests: self.client.stats().await,
        }
    }
}
