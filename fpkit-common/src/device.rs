//! Device-under-test abstraction.

use std::future::Future;
use std::time::Duration;

use crate::error::Result;
use crate::samplestream::{Leaf, SampleStream};
use crate::telemetry::TelemetryValue;

/// Operations the conformance tests need from a device-under-test.
///
/// Paths are XPath-like OpenConfig paths (see [`crate::oc`]). Implemented by
/// the gNMI client and by the in-process simulated DUT.
pub trait Device: Send + Sync {
    /// Device name used in log lines.
    fn name(&self) -> &str;

    /// Read the current state value of a leaf.
    fn get(&self, path: &str) -> impl Future<Output = Result<TelemetryValue>> + Send;

    /// Merge a configuration value at `path`.
    fn update(
        &self,
        path: &str,
        value: TelemetryValue,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Block until the leaf at `path` equals `want`, or fail after `timeout`.
    fn await_value(
        &self,
        path: &str,
        want: &TelemetryValue,
        timeout: Duration,
    ) -> impl Future<Output = Result<TelemetryValue>> + Send;

    /// Start a sample stream for `path` with the given sampling interval.
    fn sample<T: Leaf + Send + 'static>(
        &self,
        path: &str,
        interval: Duration,
    ) -> impl Future<Output = Result<SampleStream<T>>> + Send;
}
