//! # SRD Admin Console
//!
//! Client-side orchestration for the SRD monitoring stack admin page. The
//! console polls Prometheus and Grafana health, provisions the Grafana
//! dashboard, submits alert thresholds and fetches Grafana diagnostics, keeping
//! an explicit view state for each feature.

pub mod alerts;
pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod info;
pub mod navigation;
pub mod page;
pub mod provision;
pub mod status;
pub mod toast;
pub mod widgets;

pub use alerts::{AlertSubmitter, AlertThresholds, ConsoleDialog, Dialog};
pub use client::{HttpTransport, RequestClient, RequestOptions, ReqwestTransport, ResponseBody};
pub use self::config::ConsoleConfig;
pub use console::{Console, ConsoleSnapshot};
pub use error::{ConsoleError, RequestError, Result};
pub use page::{Capabilities, ElementId, PageLayout, PageMeta};
pub use provision::{ProvisionController, ProvisionOutcome, ProvisionRequest};
pub use status::{ServiceStatus, StatusPoller};

/// Current version of the console
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Console identifier
pub const SYSTEM_NAME: &str = "srd-console";
