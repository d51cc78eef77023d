//! Inventory test configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use fpkit_common::{Error, LoggingConfig, ToolConfig};
use fpkit_gnmi::GnmiTarget;

use crate::error::InventoryError;

/// Optical channel frequency in MHz.
pub const FREQUENCY_MHZ: u64 = 193_100_000;

/// Optical channel target output power in dBm.
pub const TARGET_OUTPUT_POWER_DBM: f64 = -3.0;

/// Top-level configuration for the inventory test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Device under test
    pub dut: GnmiTarget,

    /// DUT ports wired back to back
    pub ports: PortsConfig,

    /// Known device deviations
    #[serde(default)]
    pub deviations: Deviations,

    /// Waits and sampling
    #[serde(default)]
    pub timing: TimingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The two DUT ports used by the test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortsConfig {
    /// Interface name of port1 (e.g. "Ethernet1/1")
    pub port1: String,

    /// Interface name of port2
    pub port2: String,
}

impl PortsConfig {
    pub fn names(&self) -> [&str; 2] {
        [&self.port1, &self.port2]
    }
}

/// Device-specific deviations from the OpenConfig models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deviations {
    /// The device does not report `mfg-date` for components
    #[serde(default)]
    pub component_mfg_date_unsupported: bool,

    /// Name of the default network instance
    #[serde(default = "default_network_instance")]
    pub default_network_instance: String,
}

impl Default for Deviations {
    fn default() -> Self {
        Self {
            component_mfg_date_unsupported: false,
            default_network_instance: default_network_instance(),
        }
    }
}

/// Test timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Sampling interval of inventory streams in seconds
    #[serde(default = "default_sampling_interval")]
    pub sampling_interval_secs: u64,

    /// Timeout for link state transitions in seconds
    #[serde(default = "default_await_timeout")]
    pub await_timeout_secs: u64,

    /// Quiescent wait before re-enabling in seconds.
    /// The transceiver power-cycle scenario waits three times as long.
    #[serde(default = "default_wait_interval")]
    pub wait_interval_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sampling_interval_secs: default_sampling_interval(),
            await_timeout_secs: default_await_timeout(),
            wait_interval_secs: default_wait_interval(),
        }
    }
}

impl TimingConfig {
    pub fn sampling_interval(&self) -> Duration {
        Duration::from_secs(self.sampling_interval_secs)
    }

    pub fn await_timeout(&self) -> Duration {
        Duration::from_secs(self.await_timeout_secs)
    }

    pub fn wait_interval(&self) -> Duration {
        Duration::from_secs(self.wait_interval_secs)
    }
}

fn default_network_instance() -> String {
    "DEFAULT".to_string()
}

fn default_sampling_interval() -> u64 {
    10
}

fn default_await_timeout() -> u64 {
    600 // 10 minutes
}

fn default_wait_interval() -> u64 {
    30
}

impl ToolConfig for InventoryConfig {
    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn validate(&self) -> fpkit_common::Result<()> {
        if self.ports.port1.is_empty() || self.ports.port2.is_empty() {
            return Err(Error::validation("ports.port1 and ports.port2 are required"));
        }
        if self.ports.port1 == self.ports.port2 {
            return Err(Error::validation("ports.port1 and ports.port2 must differ"));
        }
        if self.timing.sampling_interval_secs == 0 {
            return Err(Error::validation("timing.sampling_interval_secs must be > 0"));
        }
        if self.timing.await_timeout_secs == 0 {
            return Err(Error::validation("timing.await_timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Optical channel parameters applied to both ports
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioParams {
    /// Vendor-specific operational mode
    pub operational_mode: u16,

    /// Channel frequency in MHz
    pub frequency_mhz: u64,

    /// Target output power in dBm
    pub target_output_power: f64,
}

impl ScenarioParams {
    /// Validate the operational mode once, at startup.
    pub fn new(operational_mode: u16) -> Result<Self, InventoryError> {
        if operational_mode == 0 {
            return Err(InventoryError::InvalidParams(
                "please specify the vendor-specific operational-mode flag".to_string(),
            ));
        }
        Ok(Self {
            operational_mode,
            frequency_mhz: FREQUENCY_MHZ,
            target_output_power: TARGET_OUTPUT_POWER_DBM,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpkit_common::parse_config;

    #[test]
    fn test_deserialize_config() {
        let json = r#"{
            dut: {
                name: "dut",
                address: "192.168.1.1:9339",
            },
            ports: {
                port1: "Ethernet1/1",
                port2: "Ethernet1/2",
            },
            deviations: {
                component_mfg_date_unsupported: true,
            },
        }"#;

        let config: InventoryConfig = parse_config(json).unwrap();
        assert_eq!(config.ports.names(), ["Ethernet1/1", "Ethernet1/2"]);
        assert!(config.deviations.component_mfg_date_unsupported);
        assert_eq!(config.deviations.default_network_instance, "DEFAULT");
        assert_eq!(config.timing.sampling_interval(), Duration::from_secs(10));
        assert_eq!(config.timing.await_timeout(), Duration::from_secs(600));
        assert_eq!(config.timing.wait_interval(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_same_port() {
        let json = r#"{
            dut: { name: "dut", address: "dut:9339" },
            ports: { port1: "Ethernet1", port2: "Ethernet1" },
        }"#;

        let config: InventoryConfig = parse_config(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zrp_inventory.json5");
        std::fs::write(
            &path,
            r#"{
                dut: {
                    name: "dut",
                    address: "dut.example.net:9339",
                    credentials: { username: "admin", password: "admin" },
                    tls: { enabled: true, domain: "dut.example.net" },
                },
                ports: { port1: "Ethernet1/1", port2: "Ethernet1/2" },
                timing: { wait_interval_secs: 5 },
                logging: { level: "debug" },
            }"#,
        )
        .unwrap();

        let config = InventoryConfig::load(&path).unwrap();
        assert!(config.dut.tls.enabled);
        assert_eq!(config.timing.wait_interval(), Duration::from_secs(5));
        assert_eq!(config.timing.sampling_interval(), Duration::from_secs(10));
        assert_eq!(config.logging().level, "debug");
    }

    #[test]
    fn test_scenario_params() {
        let params = ScenarioParams::new(5).unwrap();
        assert_eq!(params.operational_mode, 5);
        assert_eq!(params.frequency_mhz, 193_100_000);
        assert_eq!(params.target_output_power, -3.0);

        assert!(matches!(
            ScenarioParams::new(0),
            Err(InventoryError::InvalidParams(_))
        ));
    }
}
