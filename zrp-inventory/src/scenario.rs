//! Scenario orchestration.
//!
//! Both scenarios share one shape:
//!
//! 1. configure the optical channels of port1 and port2
//! 2. await both links UP, start the inventory streams and verify them
//! 3. disable connectivity, await both links DOWN, verify again
//! 4. wait, re-enable, await both links UP, verify a third time
//!
//! They differ only in how connectivity is disabled.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use fpkit_common::{ComponentType, Device, InventoryLeaf, OperStatus, SampleStream, oc};

use crate::config::{Deviations, InventoryConfig, ScenarioParams, TimingConfig};
use crate::dutcfg::{
    await_oper_status, config_optical_channel, configure_default_network_instance,
    optical_channel_from_port, set_transceiver_enabled, toggle_interface, transceiver_of,
};
use crate::error::{InventoryError, Result};
use crate::verify::verify_all_inventory_values;

/// How connectivity is taken down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Toggle the interfaces' administrative state.
    InterfaceFlap,
    /// Power the transceivers off and on.
    TransceiverOnOff,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::InterfaceFlap, Scenario::TransceiverOnOff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::InterfaceFlap => "interface-flap",
            Scenario::TransceiverOnOff => "transceiver-on-off",
        }
    }

    /// Quiescent period before connectivity is restored.
    pub fn quiescent_wait(&self, timing: &TimingConfig) -> Duration {
        match self {
            Scenario::InterfaceFlap => timing.wait_interval(),
            Scenario::TransceiverOnOff => timing.wait_interval() * 3,
        }
    }

    async fn set_connectivity<D: Device>(&self, dut: &D, ports: &[&str], up: bool) -> Result<()> {
        for port in ports {
            match self {
                Scenario::InterfaceFlap => toggle_interface(dut, port, up).await?,
                Scenario::TransceiverOnOff => set_transceiver_enabled(dut, port, up).await?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "interface-flap" => Ok(Scenario::InterfaceFlap),
            "transceiver-on-off" => Ok(Scenario::TransceiverOnOff),
            other => Err(InventoryError::InvalidParams(format!(
                "unknown scenario '{}'",
                other
            ))),
        }
    }
}

/// Sample streams over the inventory leaves of one component.
pub struct InventoryStreams {
    pub strings: Vec<SampleStream<String>>,
    pub unions: Vec<SampleStream<ComponentType>>,
}

impl InventoryStreams {
    /// Start one stream per string leaf plus one for the component type.
    ///
    /// `mfg-date` is skipped when the device does not support it.
    pub async fn start<D: Device>(
        dut: &D,
        component: &str,
        deviations: &Deviations,
        interval: Duration,
    ) -> Result<Self> {
        let mut strings: Vec<SampleStream<String>> = Vec::new();
        for leaf in InventoryLeaf::STRINGS {
            if leaf == InventoryLeaf::MfgDate && deviations.component_mfg_date_unsupported {
                continue;
            }
            strings.push(
                dut.sample(&oc::component_state(component, leaf), interval)
                    .await?,
            );
        }

        let unions: Vec<SampleStream<ComponentType>> = vec![
            dut.sample(&oc::component_state(component, InventoryLeaf::Type), interval)
                .await?,
        ];

        Ok(Self { strings, unions })
    }

    pub async fn verify(&mut self) -> Result<()> {
        verify_all_inventory_values(&mut self.strings, &mut self.unions).await
    }

    pub fn len(&self) -> usize {
        self.strings.len() + self.unions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run one scenario to completion. Any failure aborts it.
pub async fn run_scenario<D: Device>(
    dut: &D,
    config: &InventoryConfig,
    params: &ScenarioParams,
    scenario: Scenario,
) -> Result<()> {
    let ports = config.ports.names();
    let timing = &config.timing;
    info!(scenario = %scenario, dut = dut.name(), "Starting scenario");

    let transceiver = transceiver_of(dut, ports[0]).await?;
    let mut channels = Vec::with_capacity(ports.len());
    for port in ports {
        channels.push(optical_channel_from_port(dut, port).await?);
    }

    configure_default_network_instance(dut, &config.deviations.default_network_instance).await?;
    for och in &channels {
        config_optical_channel(dut, och, params).await?;
    }

    await_oper_status(dut, &ports, OperStatus::Up, timing.await_timeout()).await?;

    let mut streams = InventoryStreams::start(
        dut,
        &transceiver,
        &config.deviations,
        timing.sampling_interval(),
    )
    .await?;
    info!(
        "Sampling {} inventory leaves of {} every {:?}",
        streams.len(),
        transceiver,
        timing.sampling_interval()
    );
    streams.verify().await?;

    scenario.set_connectivity(dut, &ports, false).await?;
    await_oper_status(dut, &ports, OperStatus::Down, timing.await_timeout()).await?;
    info!("Interfaces are down: {}, {}", ports[0], ports[1]);
    streams.verify().await?;

    tokio::time::sleep(scenario.quiescent_wait(timing)).await;

    scenario.set_connectivity(dut, &ports, true).await?;
    await_oper_status(dut, &ports, OperStatus::Up, timing.await_timeout()).await?;
    info!("Interfaces are up: {}, {}", ports[0], ports[1]);
    streams.verify().await?;

    info!(scenario = %scenario, "Scenario passed");
    Ok(())
}
