//! One-shot "provision dashboard" workflow
//!
//! The view is a button, an optional result panel and an optional toast. All
//! transitions go through [`ProvisionView::apply`], so one click always runs
//! disable, request, then exactly one of success or failure, then re-enable.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::client::{is_truthy, render_json, RequestClient, ResponseBody};
use crate::toast::{Toast, ToastNotifier};
use crate::widgets::{Button, ButtonState, Panel};
use crate::RequestError;

/// Canonical provisioning endpoint
pub const PROVISION_PATH: &str = "/admin/provision";

/// Result panel text while the request is in flight
pub const PLACEHOLDER_TEXT: &str = "Starting provisioning…";

/// Datasource part of the provisioning payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub access: String,
    #[serde(rename = "isDefault")]
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSpec {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSpec {
    pub uid: String,
    pub title: String,
    pub panels: Vec<Value>,
}

/// Fixed payload sent on every provisioning click
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    pub datasource: DatasourceSpec,
    pub folder: FolderSpec,
    pub dashboard: DashboardSpec,
}

impl ProvisionRequest {
    /// Prometheus datasource, the SRD folder and an empty API dashboard
    pub fn standard() -> Self {
        Self {
            datasource: DatasourceSpec {
                name: "Prometheus".to_string(),
                kind: "prometheus".to_string(),
                url: "http://prometheus:9090".to_string(),
                access: "proxy".to_string(),
                is_default: true,
            },
            folder: FolderSpec {
                title: "SRD Monitoring".to_string(),
            },
            dashboard: DashboardSpec {
                uid: "srd-api".to_string(),
                title: "SRD HTTP API Dashboard".to_string(),
                panels: Vec::new(),
            },
        }
    }
}

impl Default for ProvisionRequest {
    fn default() -> Self {
        Self::standard()
    }
}

/// What the backend reports after provisioning. Every field is optional on
/// the wire; missing text renders empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvisionResult {
    pub message: Option<String>,
    pub grafana_folder: Option<String>,
    pub grafana_dashboard_title: Option<String>,
    pub grafana_dashboard_url: Option<String>,
    pub raw: Option<Value>,
    /// The whole response
    pub body: Value,
}

impl ProvisionResult {
    pub fn from_body(body: ResponseBody) -> Self {
        let body = body.into_value();
        Self {
            message: text_field(&body, "message"),
            grafana_folder: text_field(&body, "grafana_folder"),
            grafana_dashboard_title: text_field(&body, "grafana_dashboard_title"),
            grafana_dashboard_url: text_field(&body, "grafana_dashboard_url").filter(|url| !url.is_empty()),
            raw: body.get("raw").filter(|raw| is_truthy(raw)).cloned(),
            body,
        }
    }

    /// `raw` when the backend sent a truthy one, else the whole response
    pub fn display_payload(&self) -> &Value {
        self.raw.as_ref().unwrap_or(&self.body)
    }

    /// Success toast markup; the link only appears with a dashboard URL
    pub fn toast_html(&self) -> String {
        let link = self
            .grafana_dashboard_url
            .as_deref()
            .map(|url| format!(r#"<a class="btn" href="{}" target="_blank">Open in Grafana</a>"#, url))
            .unwrap_or_default();

        format!(
            "<strong>✅ {}</strong><br>Folder: <code>{}</code> - Dashboard: <code>{}</code><br>{}",
            self.message.as_deref().unwrap_or_default(),
            self.grafana_folder.as_deref().unwrap_or_default(),
            self.grafana_dashboard_title.as_deref().unwrap_or_default(),
            link,
        )
    }
}

fn text_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Failure toast markup
pub fn failure_toast_html(message: &str) -> String {
    format!("<strong>❌ Provision failed.</strong><br><code>{}</code>", message)
}

/// Transitions of the provisioning view
#[derive(Debug, Clone)]
pub enum ProvisionEvent {
    Started,
    Succeeded(ProvisionResult),
    Failed(RequestError),
}

/// Provisioning view state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisionView {
    pub button: Button,
    /// Label the button carried when the current run started
    pub previous_label: Option<String>,
    pub result: Option<Panel>,
    pub toast: Option<Toast>,
}

impl ProvisionView {
    pub fn new(button: Button, result: Option<Panel>, toast: Option<Toast>) -> Self {
        Self {
            button,
            previous_label: None,
            result,
            toast,
        }
    }

    pub fn apply(&mut self, event: ProvisionEvent) {
        match event {
            ProvisionEvent::Started => {
                self.previous_label = Some(self.button.label.clone());
                self.button.transition(ButtonState::Busy);
                if let Some(result) = self.result.as_mut() {
                    result.show(PLACEHOLDER_TEXT);
                }
                if let Some(toast) = self.toast.as_mut() {
                    toast.clear();
                }
            }
            ProvisionEvent::Succeeded(outcome) => {
                if let Some(toast) = self.toast.as_mut() {
                    ToastNotifier::notify(toast, true, outcome.toast_html());
                }
                if let Some(result) = self.result.as_mut() {
                    result.show(render_json(outcome.display_payload(), true));
                }
                self.button.transition(ButtonState::Success);
            }
            ProvisionEvent::Failed(err) => {
                let message = err.to_string();
                if let Some(toast) = self.toast.as_mut() {
                    ToastNotifier::notify(toast, false, failure_toast_html(&message));
                }
                if let Some(result) = self.result.as_mut() {
                    result.show(format!("Error: {}", message));
                }
                self.button.transition(ButtonState::ErrorRetry);
            }
        }
    }
}

/// How a click ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The button was disabled; nothing was sent
    Ignored,
    Provisioned,
    Failed,
}

/// Drives the provisioning view
pub struct ProvisionController {
    client: RequestClient,
    view: Arc<RwLock<ProvisionView>>,
    payload: String,
}

impl ProvisionController {
    pub fn new(client: RequestClient, view: ProvisionView, request: &ProvisionRequest) -> crate::Result<Self> {
        Ok(Self {
            client,
            view: Arc::new(RwLock::new(view)),
            payload: serde_json::to_string(request)?,
        })
    }

    pub async fn view(&self) -> ProvisionView {
        self.view.read().await.clone()
    }

    /// Handle a click on the provision button
    pub async fn click(&self) -> ProvisionOutcome {
        {
            let mut view = self.view.write().await;
            if view.button.disabled {
                debug!("Provision button is disabled, ignoring click");
                return ProvisionOutcome::Ignored;
            }
            view.apply(ProvisionEvent::Started);
        }

        info!(path = PROVISION_PATH, "Provisioning dashboard");
        let (event, outcome) = match self.client.post(PROVISION_PATH, self.payload.clone()).await {
            Ok(body) => {
                let result = ProvisionResult::from_body(body);
                info!(
                    folder = result.grafana_folder.as_deref().unwrap_or_default(),
                    dashboard = result.grafana_dashboard_title.as_deref().unwrap_or_default(),
                    "Dashboard provisioned"
                );
                (ProvisionEvent::Succeeded(result), ProvisionOutcome::Provisioned)
            }
            Err(e) => {
                error!(error = %e, category = e.category(), "Provision failed");
                (ProvisionEvent::Failed(e), ProvisionOutcome::Failed)
            }
        };

        self.view.write().await.apply(event);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toast::ToastTone;
    use crate::widgets::{BUSY_LABEL, RETRY_LABEL, SUCCESS_LABEL};
    use serde_json::json;

    fn view() -> ProvisionView {
        ProvisionView::new(Button::new("Provision"), Some(Panel::new()), Some(Toast::new()))
    }

    #[test]
    fn test_standard_payload_shape() {
        let payload = serde_json::to_value(ProvisionRequest::standard()).unwrap();
        assert_eq!(
            payload,
            json!({
                "datasource": {
                    "name": "Prometheus",
                    "type": "prometheus",
                    "url": "http://prometheus:9090",
                    "access": "proxy",
                    "isDefault": true
                },
                "folder": {"title": "SRD Monitoring"},
                "dashboard": {"uid": "srd-api", "title": "SRD HTTP API Dashboard", "panels": []}
            })
        );
    }

    #[test]
    fn test_started_disables_and_shows_placeholder() {
        let mut view = view();
        view.apply(ProvisionEvent::Started);

        assert!(view.button.disabled);
        assert_eq!(view.button.label, BUSY_LABEL);
        assert_eq!(view.previous_label.as_deref(), Some("Provision"));
        assert_eq!(view.result.as_ref().unwrap().text, PLACEHOLDER_TEXT);
        let toast = view.toast.as_ref().unwrap();
        assert!(toast.visible && toast.html.is_empty());
    }

    #[test]
    fn test_success_prefers_raw_payload() {
        let mut view = view();
        view.apply(ProvisionEvent::Started);
        let result = ProvisionResult::from_body(ResponseBody::Json(json!({
            "message": "Dashboard provisioned successfully.",
            "grafana_folder": "SRD - API Provisioned",
            "grafana_dashboard_title": "SRD - Network Resources",
            "grafana_dashboard_url": "http://grafana:3000/d/srd-api/srd",
            "raw": {"status": "success", "uid": "srd-api"}
        })));
        view.apply(ProvisionEvent::Succeeded(result));

        assert!(!view.button.disabled);
        assert_eq!(view.button.label, SUCCESS_LABEL);
        assert_eq!(
            view.result.as_ref().unwrap().text,
            "{\n  \"status\": \"success\",\n  \"uid\": \"srd-api\"\n}"
        );
        let toast = view.toast.as_ref().unwrap();
        assert_eq!(toast.tone, Some(ToastTone::Success));
        assert!(toast.html.contains(r#"href="http://grafana:3000/d/srd-api/srd""#));
    }

    #[test]
    fn test_failure_leaves_retry_label() {
        let mut view = view();
        view.apply(ProvisionEvent::Started);
        view.apply(ProvisionEvent::Failed(RequestError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        }));

        assert!(!view.button.disabled);
        assert_eq!(view.button.label, RETRY_LABEL);
        assert_ne!(view.button.label, "Provision");
        assert_eq!(view.result.as_ref().unwrap().text, "Error: bad gateway");
        let toast = view.toast.as_ref().unwrap();
        assert_eq!(toast.tone, Some(ToastTone::Failure));
        assert_eq!(toast.html, "<strong>❌ Provision failed.</strong><br><code>bad gateway</code>");
    }

    #[test]
    fn test_result_without_optional_elements() {
        let mut view = ProvisionView::new(Button::new("Provision"), None, None);
        view.apply(ProvisionEvent::Started);
        view.apply(ProvisionEvent::Failed(RequestError::Transport("refused".into())));
        assert_eq!(view.button.state, ButtonState::ErrorRetry);
        assert!(view.result.is_none() && view.toast.is_none());
    }

    #[test]
    fn test_empty_url_renders_no_link() {
        let result = ProvisionResult::from_body(ResponseBody::Json(json!({
            "message": "done",
            "grafana_dashboard_url": ""
        })));
        assert_eq!(result.grafana_dashboard_url, None);
        assert!(!result.toast_html().contains("<a "));
        assert_eq!(result.display_payload(), &result.body);
    }

    #[test]
    fn test_falsy_raw_falls_back_to_whole_result() {
        for raw in [json!(false), json!(0), json!(""), Value::Null] {
            let body = json!({"message": "m", "raw": raw});
            let result = ProvisionResult::from_body(ResponseBody::Json(body.clone()));
            assert_eq!(result.raw, None);
            assert_eq!(result.display_payload(), &body);
        }

        let result = ProvisionResult::from_body(ResponseBody::Json(json!({"raw": []})));
        assert_eq!(result.display_payload(), &json!([]));
    }
}
