//! DUT configuration and lookup helpers shared by both scenarios.

use std::time::Duration;

use serde_json::json;
use tracing::info;

use fpkit_common::{Device, OperStatus, TelemetryValue, oc};

use crate::config::ScenarioParams;
use crate::error::{InventoryError, Result};

/// Name of the transceiver component plugged into an interface.
pub async fn transceiver_of<D: Device>(dut: &D, interface: &str) -> Result<String> {
    text_leaf(dut, &oc::interface_transceiver(interface)).await
}

/// Name of the optical channel component serving an interface.
pub async fn optical_channel_from_port<D: Device>(dut: &D, interface: &str) -> Result<String> {
    let transceiver = transceiver_of(dut, interface).await?;
    text_leaf(dut, &oc::associated_optical_channel(&transceiver)).await
}

async fn text_leaf<D: Device>(dut: &D, path: &str) -> Result<String> {
    match dut.get(path).await? {
        TelemetryValue::Text(name) if !name.is_empty() => Ok(name),
        other => Err(InventoryError::UnexpectedValue {
            path: path.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Make sure the default network instance exists.
pub async fn configure_default_network_instance<D: Device>(dut: &D, name: &str) -> Result<()> {
    let config = json!({
        "name": name,
        "type": "openconfig-network-instance-types:DEFAULT_INSTANCE",
    });
    dut.update(&oc::network_instance_config(name), config.into())
        .await?;
    Ok(())
}

/// Configure frequency, output power and operational mode of an optical channel.
pub async fn config_optical_channel<D: Device>(
    dut: &D,
    och: &str,
    params: &ScenarioParams,
) -> Result<()> {
    let config = json!({
        "frequency": params.frequency_mhz,
        "target-output-power": params.target_output_power,
        "operational-mode": params.operational_mode,
    });
    dut.update(&oc::optical_channel_config(och), config.into())
        .await?;
    info!(
        "Configured optical channel {} (frequency {} MHz, power {} dBm, mode {})",
        och, params.frequency_mhz, params.target_output_power, params.operational_mode
    );
    Ok(())
}

/// Set the administrative state of an interface.
pub async fn toggle_interface<D: Device>(dut: &D, interface: &str, enabled: bool) -> Result<()> {
    let config = json!({
        "name": interface,
        "type": "iana-if-type:ethernetCsmacd",
        "enabled": enabled,
    });
    dut.update(&oc::interface_config(interface), config.into())
        .await?;
    Ok(())
}

/// Power a port's transceiver on or off.
///
/// The component names for the port and its transceiver are asserted in
/// config first; the enable leaf takes the transceiver name, not the
/// interface name.
pub async fn set_transceiver_enabled<D: Device>(
    dut: &D,
    interface: &str,
    enabled: bool,
) -> Result<()> {
    let transceiver = transceiver_of(dut, interface).await?;
    dut.update(&oc::component_name_config(interface), interface.into())
        .await?;
    dut.update(
        &oc::component_config(&transceiver),
        json!({ "name": transceiver }).into(),
    )
    .await?;
    dut.update(&oc::transceiver_enabled(&transceiver), enabled.into())
        .await?;
    Ok(())
}

/// Wait until every interface reports `status`.
pub async fn await_oper_status<D: Device>(
    dut: &D,
    interfaces: &[&str],
    status: OperStatus,
    timeout: Duration,
) -> Result<()> {
    for interface in interfaces {
        dut.await_value(&oc::interface_oper_status(interface), &status.into(), timeout)
            .await?;
    }
    Ok(())
}
