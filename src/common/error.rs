//! Error types for the smoke-test runner
//!
//! These cover failures of the tool itself (bad configuration, unreadable
//! scenario files, a client that cannot be built). Failures of the service
//! under test are never errors: they are recorded as step outcomes.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the smoke-test runner
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid scenario file '{path}': {error}")]
    ScenarioParse { path: String, error: String },

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    // === HTTP Errors ===
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("{method} {url} failed: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },

    #[error("Request to {url} timed out after {secs} seconds")]
    Timeout { url: String, secs: u64 },

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a transport error for a request
    pub fn transport(method: &str, url: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            method: method.to_string(),
            url: url.to_string(),
            message: message.into(),
        }
    }

    /// Create an invalid base URL error
    pub fn invalid_base_url(url: &str, reason: &str) -> Self {
        Self::InvalidBaseUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error came from talking to the service rather than from
    /// the tool's own setup
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Timeout { .. })
    }
}
