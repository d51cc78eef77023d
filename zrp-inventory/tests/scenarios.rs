//! End-to-end scenario runs against the simulated DUT.

use std::time::Duration;

use fpkit_common::{Device, InventoryLeaf, SampleError, TelemetryValue, oc, parse_config};
use zrp_inventory::{
    InventoryConfig, InventoryError, InventoryStreams, Scenario, ScenarioParams, SimDut,
    run_scenario,
};

const PORT1: &str = "Ethernet1/1";
const PORT2: &str = "Ethernet1/2";

fn test_config(mfg_date_unsupported: bool) -> InventoryConfig {
    let json = format!(
        r#"{{
            dut: {{ name: "sim", address: "127.0.0.1:9339" }},
            ports: {{ port1: "{PORT1}", port2: "{PORT2}" }},
            deviations: {{ component_mfg_date_unsupported: {mfg_date_unsupported} }},
            timing: {{
                sampling_interval_secs: 10,
                await_timeout_secs: 120,
                wait_interval_secs: 30,
            }},
        }}"#
    );
    parse_config(&json).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_interface_flap_passes() {
    let dut = SimDut::two_port(PORT1, PORT2);
    let config = test_config(false);
    let params = ScenarioParams::new(5).unwrap();

    run_scenario(&dut, &config, &params, Scenario::InterfaceFlap)
        .await
        .unwrap();

    // Interfaces end up re-enabled.
    assert_eq!(
        dut.leaf(&oc::interface_enabled(PORT1)),
        Some(TelemetryValue::Boolean(true))
    );
    assert_eq!(
        dut.leaf(&oc::interface_oper_status(PORT2)),
        Some(TelemetryValue::from("UP"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_transceiver_on_off_passes() {
    let dut = SimDut::two_port(PORT1, PORT2);
    let config = test_config(false);
    let params = ScenarioParams::new(5).unwrap();

    run_scenario(&dut, &config, &params, Scenario::TransceiverOnOff)
        .await
        .unwrap();

    let disabled: Vec<_> = dut
        .updates()
        .into_iter()
        .filter(|(path, value)| {
            path == &oc::transceiver_enabled("Transceiver1")
                && *value == TelemetryValue::Boolean(false)
        })
        .collect();
    assert_eq!(disabled.len(), 1);
    assert_eq!(
        dut.leaf(&oc::transceiver_enabled("Transceiver2")),
        Some(TelemetryValue::Boolean(true))
    );
}

#[tokio::test(start_paused = true)]
async fn test_operational_mode_is_applied_to_both_channels() {
    let dut = SimDut::two_port(PORT1, PORT2);
    let config = test_config(false);
    let params = ScenarioParams::new(1234).unwrap();

    run_scenario(&dut, &config, &params, Scenario::InterfaceFlap)
        .await
        .unwrap();

    for och in ["OpticalChannel1", "OpticalChannel2"] {
        let base = oc::optical_channel_config(och);
        assert_eq!(
            dut.leaf(&format!("{base}/operational-mode")),
            Some(TelemetryValue::Counter(1234))
        );
        assert_eq!(
            dut.leaf(&format!("{base}/frequency")),
            Some(TelemetryValue::Counter(193_100_000))
        );
        assert_eq!(
            dut.leaf(&format!("{base}/target-output-power")),
            Some(TelemetryValue::Gauge(-3.0))
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_absent_serial_number_fails() {
    let dut = SimDut::two_port(PORT1, PORT2);
    let path = oc::component_state("Transceiver1", InventoryLeaf::SerialNo);
    dut.remove_leaf(&path);

    let err = run_scenario(
        &dut,
        &test_config(false),
        &ScenarioParams::new(5).unwrap(),
        Scenario::InterfaceFlap,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains(&path));
    assert!(matches!(err, InventoryError::InvalidValue { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_wrong_typed_part_number_fails() {
    let dut = SimDut::two_port(PORT1, PORT2);
    let path = oc::component_state("Transceiver1", InventoryLeaf::PartNo);
    dut.set_leaf(&path, TelemetryValue::Counter(400));

    let err = run_scenario(
        &dut,
        &test_config(false),
        &ScenarioParams::new(5).unwrap(),
        Scenario::InterfaceFlap,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        InventoryError::InvalidValue {
            reason: SampleError::WrongType { .. },
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_muted_firmware_version_fails() {
    let dut = SimDut::two_port(PORT1, PORT2);
    let path = oc::component_state("Transceiver1", InventoryLeaf::FirmwareVersion);
    dut.mute(&path);

    let err = run_scenario(
        &dut,
        &test_config(false),
        &ScenarioParams::new(5).unwrap(),
        Scenario::TransceiverOnOff,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, InventoryError::NotStreamed { ref stream } if stream.contains(&path)));
}

/// Apply `fault` once `path` has been set to each of `values` in turn.
fn inject_after(
    dut: &SimDut,
    path: String,
    values: Vec<TelemetryValue>,
    fault: impl FnOnce(&SimDut) + Send + 'static,
) {
    let dut = dut.clone();
    tokio::spawn(async move {
        for value in &values {
            dut.await_value(&path, value, Duration::from_secs(3600))
                .await
                .unwrap();
        }
        fault(&dut);
    });
}

#[tokio::test(start_paused = true)]
async fn test_leaf_muted_while_interfaces_go_down_fails() {
    let dut = SimDut::two_port(PORT1, PORT2);
    let path = oc::component_state("Transceiver1", InventoryLeaf::SerialNo);
    let muted = path.clone();
    inject_after(
        &dut,
        oc::interface_enabled(PORT1),
        vec![TelemetryValue::Boolean(false)],
        move |dut| dut.mute(&muted),
    );

    let err = run_scenario(
        &dut,
        &test_config(false),
        &ScenarioParams::new(5).unwrap(),
        Scenario::InterfaceFlap,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, InventoryError::NotStreamed { ref stream } if stream.contains(&path)));
    // Failed at the DOWN checkpoint, before re-enabling.
    assert_eq!(
        dut.leaf(&oc::interface_enabled(PORT1)),
        Some(TelemetryValue::Boolean(false))
    );
    assert_eq!(
        dut.leaf(&oc::interface_oper_status(PORT1)),
        Some(TelemetryValue::from("DOWN"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_leaf_removed_while_transceivers_are_off_fails() {
    let dut = SimDut::two_port(PORT1, PORT2);
    let path = oc::component_state("Transceiver1", InventoryLeaf::HardwareVersion);
    let removed = path.clone();
    inject_after(
        &dut,
        oc::transceiver_enabled("Transceiver1"),
        vec![TelemetryValue::Boolean(false)],
        move |dut| dut.remove_leaf(&removed),
    );

    let err = run_scenario(
        &dut,
        &test_config(false),
        &ScenarioParams::new(5).unwrap(),
        Scenario::TransceiverOnOff,
    )
    .await
    .unwrap_err();

    match err {
        InventoryError::InvalidValue { stream, reason, .. } => {
            assert_eq!(stream, path);
            assert_eq!(reason, SampleError::Absent);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        dut.leaf(&oc::transceiver_enabled("Transceiver1")),
        Some(TelemetryValue::Boolean(false))
    );
}

#[tokio::test(start_paused = true)]
async fn test_leaf_removed_after_links_return_fails() {
    let dut = SimDut::two_port(PORT1, PORT2);
    let path = oc::component_state("Transceiver1", InventoryLeaf::MfgName);
    let removed = path.clone();
    inject_after(
        &dut,
        oc::interface_enabled(PORT1),
        vec![TelemetryValue::Boolean(false), TelemetryValue::Boolean(true)],
        move |dut| dut.remove_leaf(&removed),
    );

    let err = run_scenario(
        &dut,
        &test_config(false),
        &ScenarioParams::new(5).unwrap(),
        Scenario::InterfaceFlap,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        InventoryError::InvalidValue {
            reason: SampleError::Absent,
            ..
        }
    ));
    // The DOWN checkpoint passed; the failure is on the way back up.
    assert_eq!(
        dut.leaf(&oc::interface_enabled(PORT1)),
        Some(TelemetryValue::Boolean(true))
    );
}

#[tokio::test(start_paused = true)]
async fn test_link_that_never_comes_up_times_out() {
    let dut = SimDut::two_port(PORT1, PORT2).with_link_delay(Duration::from_secs(600));

    let err = run_scenario(
        &dut,
        &test_config(false),
        &ScenarioParams::new(5).unwrap(),
        Scenario::InterfaceFlap,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        InventoryError::Device(fpkit_common::Error::AwaitTimeout { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_mfg_date_skipped_when_unsupported() {
    let dut = SimDut::two_port(PORT1, PORT2);
    dut.mute(&oc::component_state("Transceiver1", InventoryLeaf::MfgDate));

    let config = test_config(true);
    let mut streams = InventoryStreams::start(
        &dut,
        "Transceiver1",
        &config.deviations,
        config.timing.sampling_interval(),
    )
    .await
    .unwrap();

    assert_eq!(streams.strings.len(), 5);
    assert_eq!(streams.unions.len(), 1);
    assert!(
        streams
            .strings
            .iter()
            .all(|s| !s.path().ends_with("/mfg-date"))
    );
    streams.verify().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_mfg_date_streamed_by_default() {
    let dut = SimDut::two_port(PORT1, PORT2);
    let config = test_config(false);
    let streams = InventoryStreams::start(
        &dut,
        "Transceiver2",
        &config.deviations,
        config.timing.sampling_interval(),
    )
    .await
    .unwrap();

    assert_eq!(streams.len(), 7);
}

#[test]
fn test_zero_operational_mode_rejected() {
    let err = ScenarioParams::new(0).unwrap_err();
    assert!(err.to_string().contains("operational-mode"));
}
