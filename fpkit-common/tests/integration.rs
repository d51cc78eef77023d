//! Integration tests for fpkit-common library.

use std::time::Duration;

use serde::Deserialize;

use fpkit_common::{
    ComponentType, Error, InventoryLeaf, LogFormat, LoggingConfig, SampleError, SampleSink,
    SampleStream, TelemetryValue, ToolConfig, oc,
};

#[derive(Debug, Deserialize)]
struct SampleToolConfig {
    target: String,
    #[serde(default)]
    logging: LoggingConfig,
}

impl ToolConfig for SampleToolConfig {
    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn validate(&self) -> fpkit_common::Result<()> {
        if self.target.is_empty() {
            return Err(Error::validation("target is required"));
        }
        Ok(())
    }
}

#[test]
fn test_tool_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tool.json5");
    std::fs::write(
        &path,
        r#"{
            // JSON5 allows comments and trailing commas
            target: "dut:9339",
            logging: { level: "debug", format: "json" },
        }"#,
    )
    .unwrap();

    let config = SampleToolConfig::load(&path).expect("load failed");
    assert_eq!(config.target, "dut:9339");
    assert_eq!(config.logging().level, "debug");
    assert_eq!(config.logging().format, LogFormat::Json);
}

#[test]
fn test_tool_config_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = SampleToolConfig::load(dir.path().join("nope.json5")).unwrap_err();
    assert!(matches!(missing, Error::ConfigNotFound { .. }));

    let path = dir.path().join("empty-target.json5");
    std::fs::write(&path, r#"{ target: "" }"#).unwrap();
    let invalid = SampleToolConfig::load(&path).unwrap_err();
    assert!(matches!(invalid, Error::ConfigValidation(_)));
}

#[tokio::test(start_paused = true)]
async fn test_inventory_sampling_workflow() {
    let interval = Duration::from_secs(10);
    let serial = oc::component_state("Transceiver1", InventoryLeaf::SerialNo);
    let kind = oc::component_state("Transceiver1", InventoryLeaf::Type);

    let (serial_sink, mut serial_stream) = SampleStream::<String>::channel(&serial, interval);
    let (kind_sink, mut kind_stream) = SampleStream::<ComponentType>::channel(&kind, interval);

    send_later(&serial_sink, 1, Some(TelemetryValue::from("ZRP0001")));
    let sample = serial_stream.next().await.expect("no serial sample");
    assert_eq!(sample.path, serial);
    assert_eq!(sample.val().unwrap(), "ZRP0001");

    send_later(
        &kind_sink,
        1,
        Some(TelemetryValue::from("openconfig-platform-types:TRANSCEIVER")),
    );
    let sample = kind_stream.next().await.expect("no type sample");
    assert_eq!(
        sample.val().unwrap(),
        ComponentType::Hardware("TRANSCEIVER".to_string())
    );

    // The leaf disappears from the device.
    send_later(&serial_sink, 2, None);
    let sample = serial_stream.next().await.expect("no serial sample");
    assert_eq!(sample.val(), Err(SampleError::Absent));

    // A reading buffered before the checkpoint does not count.
    serial_sink.send(3, Some(TelemetryValue::from("ZRP0001")));
    assert!(serial_stream.next().await.is_none());
}

fn send_later(sink: &SampleSink, timestamp: i64, value: Option<TelemetryValue>) {
    let sink = sink.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        sink.send(timestamp, value);
    });
}

#[test]
fn test_json_ietf_values() {
    let value = TelemetryValue::from_json(serde_json::json!("UP"));
    assert_eq!(value.as_text(), Some("UP"));

    let value = TelemetryValue::from_json(serde_json::json!(193100000));
    assert_eq!(value, TelemetryValue::Counter(193100000));
    assert_eq!(value.type_name(), "uint");

    let value = TelemetryValue::from_json(serde_json::json!({"enabled": true}));
    assert_eq!(value.type_name(), "json");
}
