use std::time::Duration;

use thiserror::Error;

/// Common error type for featureprofiles tooling.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid path: {0}")]
    Path(String),

    #[error("No value at {path}")]
    NotFound { path: String },

    #[error("Timed out after {timeout:?} waiting for {path} to become {want}")]
    AwaitTimeout {
        path: String,
        want: String,
        timeout: Duration,
    },

    #[error("Device error: {0}")]
    Device(String),
}

impl Error {
    /// Create a configuration validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ConfigValidation(msg.into())
    }

    /// Create a device error.
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
