//! Service health polling for the Prometheus and Grafana indicators

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::client::{is_truthy, RequestClient, ResponseBody};
use crate::widgets::Indicator;

/// Backend endpoint reporting both services
pub const STATUS_PATH: &str = "/api/status";

/// Default time between two status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10_000);

/// Health of the two services behind the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub prometheus: bool,
    pub grafana: bool,
}

impl ServiceStatus {
    /// Read both flags from a status response; a missing or falsy field is down
    pub fn from_body(body: &ResponseBody) -> Self {
        match body.as_json() {
            Some(value) => Self {
                prometheus: value.get("prometheus").map_or(false, is_truthy),
                grafana: value.get("grafana").map_or(false, is_truthy),
            },
            None => Self {
                prometheus: false,
                grafana: false,
            },
        }
    }
}

/// Outcome of one status check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Polled(ServiceStatus),
    /// The combined request failed; carries the error text
    Failed(String),
}

/// The two status indicators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusBoard {
    pub prometheus: Indicator,
    pub grafana: Indicator,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint the board from one check. A failed request marks both services
    /// as errored, whatever their real state.
    pub fn apply(&mut self, event: &StatusEvent) {
        match event {
            StatusEvent::Polled(status) => {
                self.prometheus.paint(status.prometheus);
                self.grafana.paint(status.grafana);
            }
            StatusEvent::Failed(_) => {
                self.prometheus.paint_error();
                self.grafana.paint_error();
            }
        }
    }
}

/// Periodic status checker painting a [`StatusBoard`]
pub struct StatusPoller {
    client: RequestClient,
    board: Arc<RwLock<StatusBoard>>,
    interval: Duration,
}

impl StatusPoller {
    pub fn new(client: RequestClient, interval: Duration) -> Self {
        Self {
            client,
            board: Arc::new(RwLock::new(StatusBoard::new())),
            interval,
        }
    }

    pub async fn board(&self) -> StatusBoard {
        self.board.read().await.clone()
    }

    /// Run one check and paint the result
    pub async fn tick(&self) -> StatusEvent {
        let event = match self.client.get(STATUS_PATH).await {
            Ok(body) => StatusEvent::Polled(ServiceStatus::from_body(&body)),
            Err(e) => {
                error!(error = %e, category = e.category(), "Error in status refresh");
                StatusEvent::Failed(e.to_string())
            }
        };

        self.board.write().await.apply(&event);
        debug!(?event, "Status painted");
        event
    }

    /// Check now, then every interval for as long as the runtime lives.
    ///
    /// Each check runs as its own task; a slow response never holds back the
    /// next one, and whichever finishes last owns the board.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        info!(interval_ms = self.interval.as_millis() as u64, "Starting status polling");

        let poller = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(poller.interval);
            loop {
                interval.tick().await;
                let check = Arc::clone(&poller);
                tokio::spawn(async move {
                    check.tick().await;
                });
            }
        })
    }
}
