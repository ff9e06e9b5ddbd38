//! On-demand Grafana diagnostics

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::client::RequestClient;
use crate::widgets::Panel;

pub const INFO_PATH: &str = "/admin/grafana-info";

/// Fetches the diagnostic blob into the info panel
pub struct InfoFetcher {
    client: RequestClient,
    panel: Arc<RwLock<Panel>>,
}

impl InfoFetcher {
    pub fn new(client: RequestClient) -> Self {
        Self {
            client,
            panel: Arc::new(RwLock::new(Panel::new())),
        }
    }

    pub async fn panel(&self) -> Panel {
        self.panel.read().await.clone()
    }

    /// Fetch and render; returns whether the request succeeded
    pub async fn fetch(&self) -> bool {
        let (text, ok) = match self.client.get(INFO_PATH).await {
            Ok(body) => {
                info!("Grafana info fetched");
                (body.to_pretty(), true)
            }
            Err(e) => {
                error!(error = %e, category = e.category(), "Grafana info request failed");
                (format!("Error: {}", e), false)
            }
        };

        self.panel.write().await.show(text);
        ok
    }
}
