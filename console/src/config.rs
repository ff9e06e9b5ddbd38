//! Configuration management for the admin console

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

use crate::page::{default_admin_elements, ElementId, PageLayout, PageMeta};
use crate::Result;

/// Config file looked up when none is given
pub const DEFAULT_CONFIG_PATH: &str = "config/srd-console";

/// Prefix of the environment overrides, e.g. `SRD_CONSOLE__BACKEND__BASE_URL`
pub const ENV_PREFIX: &str = "SRD_CONSOLE";

/// Main configuration structure for the console
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Backend connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Page contents
    #[serde(default)]
    pub page: PageConfig,

    /// Status polling
    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL request paths are joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// What the hosted page contains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Content of the `csrf-token` meta tag
    #[serde(default)]
    pub csrf_token: Option<String>,

    /// Element id to initial label or input value. Leaving an element out
    /// removes it from the page.
    #[serde(default = "default_elements")]
    pub elements: BTreeMap<String, String>,
}

/// Status polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Time between status checks in milliseconds
    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5050".to_string()
}

fn default_user_agent() -> String {
    format!("srd-console/{}", crate::VERSION)
}

fn default_elements() -> BTreeMap<String, String> {
    default_admin_elements()
        .into_iter()
        .map(|(id, text)| (id.as_str().to_string(), text))
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_status_interval_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            csrf_token: None,
            elements: default_elements(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            status_interval_ms: default_status_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from `path` (or the default file, if present) and
    /// `SRD_CONSOLE__*` environment variables
    pub fn load(path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if Url::parse(&self.backend.base_url).is_err() {
            return Err(ConfigError::Message(format!(
                "Invalid backend URL: {}",
                self.backend.base_url
            )));
        }

        if self.polling.status_interval_ms == 0 {
            return Err(ConfigError::Message(
                "status_interval_ms must be greater than 0".into(),
            ));
        }

        for id in self.page.elements.keys() {
            if id.parse::<ElementId>().is_err() {
                return Err(ConfigError::Message(format!("Unknown page element: {}", id)));
            }
        }

        Ok(())
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.polling.status_interval_ms)
    }

    /// Build the page described by this configuration
    pub fn to_layout(&self) -> Result<PageLayout> {
        let mut meta = PageMeta::new();
        if let Some(token) = &self.page.csrf_token {
            meta = PageMeta::with_csrf_token(token.clone());
        }

        let mut layout = PageLayout::new(meta);
        for (id, text) in &self.page.elements {
            layout.insert(id.parse::<ElementId>()?, text.clone());
        }
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ConsoleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.status_interval(), Duration::from_secs(10));

        let layout = config.to_layout().unwrap();
        assert!(layout.capabilities().status);
        assert_eq!(layout.meta.csrf_token(), None);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ConsoleConfig::default();
        config.backend.base_url = "not a url".into();
        assert!(config.validate().is_err());

        let mut config = ConsoleConfig::default();
        config.polling.status_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ConsoleConfig::default();
        config.page.elements.insert("btn-nope".into(), String::new());
        assert!(config.validate().is_err());
        assert!(config.to_layout().is_err());
    }

    #[test]
    fn test_load_from_file_keeps_defaults() {
        let path = std::env::temp_dir().join(format!("srd-console-test-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[backend]\nbase_url = \"http://backend:8000\"\n\n[page]\ncsrf_token = \"tok\"\n\n[page.elements]\nbtn-provision = \"Provision\"\n"
        )
        .unwrap();

        let config = ConsoleConfig::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.backend.base_url, "http://backend:8000");
        assert_eq!(config.polling.status_interval_ms, 10_000);
        assert_eq!(config.logging.level, "info");

        let layout = config.to_layout().unwrap();
        assert_eq!(layout.meta.csrf_token(), Some("tok"));
        let caps = layout.capabilities();
        assert!(caps.provision);
        assert!(!caps.status);
    }
}
