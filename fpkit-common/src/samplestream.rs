//! Pull-based sample streams.
//!
//! A device subscribes to a leaf in SAMPLE mode and feeds every reading into
//! a [`SampleSink`]. The test pulls from the paired [`SampleStream`] at its
//! checkpoints. Readings buffered before a pull are stale and dropped; the
//! pull waits at most one sampling interval for a fresh one to arrive.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::telemetry::TelemetryValue;

/// A leaf type that samples can be decoded into.
pub trait Leaf: Sized + fmt::Debug + fmt::Display {
    /// Name of the expected type, used in failure messages.
    const KIND: &'static str;

    /// Decode a raw value; `None` when the value has the wrong type.
    fn from_value(value: &TelemetryValue) -> Option<Self>;
}

impl Leaf for String {
    const KIND: &'static str = "string";

    fn from_value(value: &TelemetryValue) -> Option<Self> {
        value.as_text().map(str::to_string)
    }
}

/// Why a sample did not yield a typed value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("value is not present")]
    Absent,

    #[error("value has type {got}, expected <{expected}>")]
    WrongType { expected: &'static str, got: String },
}

/// One reading of a leaf.
#[derive(Debug, Clone)]
pub struct Sample<T> {
    /// Path of the sampled leaf.
    pub path: String,
    /// Unix epoch milliseconds of the reading.
    pub timestamp: i64,
    value: Option<TelemetryValue>,
    _leaf: PhantomData<T>,
}

impl<T: Leaf> Sample<T> {
    pub fn new(path: impl Into<String>, timestamp: i64, value: Option<TelemetryValue>) -> Self {
        Self {
            path: path.into(),
            timestamp,
            value,
            _leaf: PhantomData,
        }
    }

    /// Decode the value as `T`.
    pub fn val(&self) -> Result<T, SampleError> {
        let raw = self.value.as_ref().ok_or(SampleError::Absent)?;
        T::from_value(raw).ok_or_else(|| SampleError::WrongType {
            expected: T::KIND,
            got: raw.type_name().to_string(),
        })
    }
}

impl<T> fmt::Display for Sample<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} = {} @ {}", self.path, value, self.timestamp),
            None => write!(f, "{} = <absent> @ {}", self.path, self.timestamp),
        }
    }
}

type RawSample = (i64, Option<TelemetryValue>);

/// Producer side of a sample stream, owned by the device's forwarding task.
#[derive(Debug, Clone)]
pub struct SampleSink {
    tx: mpsc::UnboundedSender<RawSample>,
}

impl SampleSink {
    /// Push a reading. Returns `false` once the stream has been dropped.
    pub fn send(&self, timestamp: i64, value: Option<TelemetryValue>) -> bool {
        self.tx.send((timestamp, value)).is_ok()
    }
}

/// Consumer side of a sample stream.
pub struct SampleStream<T> {
    path: String,
    interval: Duration,
    rx: mpsc::UnboundedReceiver<RawSample>,
    task: Option<JoinHandle<()>>,
    _leaf: PhantomData<T>,
}

impl<T: Leaf> SampleStream<T> {
    /// Create a connected sink/stream pair for `path`.
    pub fn channel(path: impl Into<String>, interval: Duration) -> (SampleSink, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let stream = Self {
            path: path.into(),
            interval,
            rx,
            task: None,
            _leaf: PhantomData,
        };
        (SampleSink { tx }, stream)
    }

    /// Tie a forwarding task's lifetime to this stream.
    pub fn with_task(mut self, task: JoinHandle<()>) -> Self {
        self.task = Some(task);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Pull the next sample.
    ///
    /// Anything buffered before the call is discarded. Waits up to one
    /// sampling interval for a reading that arrives after the call; `None`
    /// means nothing was streamed in that window.
    pub async fn next(&mut self) -> Option<Sample<T>> {
        let mut stale = 0usize;
        while self.rx.try_recv().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            trace!(path = %self.path, stale, "Dropped stale samples");
        }

        let (timestamp, value) = tokio::time::timeout(self.interval, self.rx.recv())
            .await
            .ok()
            .flatten()?;
        Some(Sample::new(self.path.clone(), timestamp, value))
    }
}

impl<T> fmt::Display for SampleStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (every {:?})", self.path, self.interval)
    }
}

impl<T> fmt::Debug for SampleStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleStream")
            .field("path", &self.path)
            .field("interval", &self.interval)
            .finish()
    }
}

impl<T> Drop for SampleStream<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "/components/component[name=T1]/state/serial-no";

    #[tokio::test(start_paused = true)]
    async fn test_next_drops_stale_samples() {
        let (sink, mut stream) = SampleStream::<String>::channel(PATH, Duration::from_secs(10));
        assert!(sink.send(1, Some(TelemetryValue::from("SN"))));

        // The device goes quiet long before the checkpoint.
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(stream.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_ignores_backlog_for_fresh_sample() {
        let (sink, mut stream) = SampleStream::<String>::channel(PATH, Duration::from_secs(10));
        assert!(sink.send(1, Some(TelemetryValue::from("old"))));
        assert!(sink.send(2, Some(TelemetryValue::from("older"))));
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(4)).await;
            sink.send(3, Some(TelemetryValue::from("new")));
        });

        let sample = stream.next().await.unwrap();
        assert_eq!(sample.timestamp, 3);
        assert_eq!(sample.val().unwrap(), "new");
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_times_out_without_samples() {
        let (_sink, mut stream) = SampleStream::<String>::channel(PATH, Duration::from_secs(10));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_waits_for_late_sample() {
        let (sink, mut stream) = SampleStream::<String>::channel(PATH, Duration::from_secs(10));
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            sink.send(7, Some(TelemetryValue::from("late")));
        });

        let sample = stream.next().await.unwrap();
        assert_eq!(sample.val().unwrap(), "late");
    }

    #[test]
    fn test_sample_val_errors() {
        let absent: Sample<String> = Sample::new(PATH, 0, None);
        assert_eq!(absent.val(), Err(SampleError::Absent));

        let wrong: Sample<String> = Sample::new(PATH, 0, Some(TelemetryValue::Counter(3)));
        assert_eq!(
            wrong.val(),
            Err(SampleError::WrongType {
                expected: "string",
                got: "uint".to_string()
            })
        );
    }

    #[test]
    fn test_send_fails_after_stream_dropped() {
        let (sink, stream) = SampleStream::<String>::channel(PATH, Duration::from_secs(1));
        drop(stream);
        assert!(!sink.send(0, None));
    }
}
