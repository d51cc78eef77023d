//! Error types for the gNMI client.

use thiserror::Error;

/// Result type alias using [`GnmiError`].
pub type Result<T> = std::result::Result<T, GnmiError>;

/// Errors raised while talking to a gNMI target.
#[derive(Error, Debug)]
pub enum GnmiError {
    /// Transport-level failure (connect, TLS).
    #[error("gNMI transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// RPC returned a non-OK status.
    #[error("gNMI RPC failed: {0}")]
    Status(#[from] tonic::Status),

    /// Invalid metadata value for credentials.
    #[error("Invalid credential metadata: {0}")]
    Metadata(#[from] tonic::metadata::errors::InvalidMetadataValue),

    /// Malformed path string.
    #[error("Invalid gNMI path: {0}")]
    Path(String),

    /// Target sent a value we cannot decode.
    #[error("Undecodable value at {path}: {message}")]
    Decode { path: String, message: String },

    /// Target reported an in-band error.
    #[error("Target error {code}: {message}")]
    Target { code: u32, message: String },

    /// Subscription ended before the expected value arrived.
    #[error("Subscription to {0} closed by target")]
    StreamClosed(String),

    /// I/O error reading TLS material.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GnmiError> for fpkit_common::Error {
    fn from(err: GnmiError) -> Self {
        match err {
            GnmiError::Path(msg) => fpkit_common::Error::Path(msg),
            GnmiError::Io(e) => fpkit_common::Error::Io(e),
            other => fpkit_common::Error::device(other.to_string()),
        }
    }
}
