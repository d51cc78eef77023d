//! Feature Profiles common library
//!
//! This crate provides shared types and utilities for the featureprofiles
//! conformance tooling:
//!
//! - [`telemetry`] - Leaf value model (`TelemetryValue`)
//! - [`device`] - The `Device` trait implemented by gNMI and simulated DUTs
//! - [`samplestream`] - Pull-based sample streams (`SampleStream`, `Sample`, `Leaf`)
//! - [`oc`] - OpenConfig path builders and enumerations
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`error`] - Error types

pub mod config;
pub mod device;
pub mod error;
pub mod oc;
pub mod samplestream;
pub mod telemetry;

// Re-export commonly used types at the crate root
pub use config::{LogFormat, LoggingConfig, ToolConfig, load_config, parse_config};
pub use device::Device;
pub use error::{Error, Result};
pub use oc::{ComponentType, InventoryLeaf, OperStatus};
pub use samplestream::{Leaf, Sample, SampleError, SampleSink, SampleStream};
pub use telemetry::{TelemetryValue, current_timestamp_millis};

/// Initialize tracing with the given configuration.
///
/// Output always goes to stderr so that tool output on stdout stays clean.
/// `RUST_LOG` takes precedence over the configured level.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// # Example
///
/// ```ignore
/// use fpkit_common::{LoggingConfig, LogFormat, init_tracing};
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Json,
/// };
/// init_tracing(&config)?;
/// ```
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
