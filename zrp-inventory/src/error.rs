//! Error types for the inventory test.

use thiserror::Error;

use fpkit_common::SampleError;

/// Result type alias using [`InventoryError`].
pub type Result<T> = std::result::Result<T, InventoryError>;

/// A fatal test failure.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Invalid command-line parameters.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// No sample arrived within the sampling interval.
    #[error("Inventory telemetry {stream} was not streamed in the most recent subscription interval")]
    NotStreamed { stream: String },

    /// A sample arrived but its value is absent or mistyped.
    #[error("Inventory telemetry {stream} is not present or valid, expected <{expected}>: {reason}")]
    InvalidValue {
        stream: String,
        expected: &'static str,
        reason: SampleError,
    },

    /// A leaf the test depends on holds an unexpected value.
    #[error("Unexpected value {value} at {path}")]
    UnexpectedValue { path: String, value: String },

    /// Device operation failed or timed out.
    #[error(transparent)]
    Device(#[from] fpkit_common::Error),
}
