//! Error types for the admin console

use thiserror::Error;

use crate::page::ElementId;

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Failure of a single backend round trip.
///
/// The `Display` output is the text shown to the user. For an HTTP failure it
/// is the response body, verbatim, so callers must not expect it to be
/// structured.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The request never completed (connection refused, DNS, broken body...)
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response; carries the body text
    #[error("{body}")]
    Status { status: u16, body: String },

    /// JSON content type with a body that does not parse
    #[error("{0}")]
    Decode(String),

    /// A header value that cannot be put on the wire
    #[error("invalid header value for {name}")]
    InvalidHeader { name: String },
}

impl RequestError {
    /// HTTP status code, when the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the error category for log fields
    pub fn category(&self) -> &'static str {
        match self {
            RequestError::Transport(_) => "transport",
            RequestError::Status { .. } => "http",
            RequestError::Decode(_) => "decode",
            RequestError::InvalidHeader { .. } => "header",
        }
    }
}

/// Error types for console setup and the command-line host
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request failed: {0}")]
    Request(#[from] RequestError),

    #[error("Invalid element id: {0}")]
    InvalidElement(String),

    #[error("Feature unavailable on this page: {feature} (missing #{element})")]
    FeatureUnavailable { feature: String, element: ElementId },
}

impl ConsoleError {
    /// Create a new feature-unavailable error
    pub fn feature_unavailable<S: Into<String>>(feature: S, element: ElementId) -> Self {
        Self::FeatureUnavailable {
            feature: feature.into(),
            element,
        }
    }

    /// Get the error category for log fields
    pub fn category(&self) -> &'static str {
        match self {
            ConsoleError::Config(_) => "config",
            ConsoleError::Network(_) => "network",
            ConsoleError::Serialization(_) => "serialization",
            ConsoleError::Io(_) => "io",
            ConsoleError::InvalidUrl(_) => "config",
            ConsoleError::Request(e) => e.category(),
            ConsoleError::InvalidElement(_) => "validation",
            ConsoleError::FeatureUnavailable { .. } => "page",
        }
    }
}
