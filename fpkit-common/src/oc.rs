//! OpenConfig paths and enumerations used by the inventory tests.
//!
//! Paths are rendered in the XPath-like form understood by the gNMI client,
//! e.g. `/interfaces/interface[name=Ethernet1/1]/state/oper-status`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::samplestream::Leaf;
use crate::telemetry::TelemetryValue;

/// `/interfaces/interface[name=<name>]/state/oper-status`
pub fn interface_oper_status(interface: &str) -> String {
    format!("/interfaces/interface[name={}]/state/oper-status", interface)
}

/// `/interfaces/interface[name=<name>]/state/transceiver`
pub fn interface_transceiver(interface: &str) -> String {
    format!("/interfaces/interface[name={}]/state/transceiver", interface)
}

/// `/interfaces/interface[name=<name>]/config`
pub fn interface_config(interface: &str) -> String {
    format!("/interfaces/interface[name={}]/config", interface)
}

/// `/interfaces/interface[name=<name>]/config/enabled`
pub fn interface_enabled(interface: &str) -> String {
    format!("/interfaces/interface[name={}]/config/enabled", interface)
}

/// `/components/component[name=<name>]/config`
pub fn component_config(component: &str) -> String {
    format!("/components/component[name={}]/config", component)
}

/// `/components/component[name=<name>]/config/name`
pub fn component_name_config(component: &str) -> String {
    format!("/components/component[name={}]/config/name", component)
}

/// `/components/component[name=<name>]/state/<leaf>`
pub fn component_state(component: &str, leaf: InventoryLeaf) -> String {
    format!(
        "/components/component[name={}]/state/{}",
        component,
        leaf.as_str()
    )
}

/// `/components/component[name=<name>]/transceiver/config/enabled`
pub fn transceiver_enabled(transceiver: &str) -> String {
    format!(
        "/components/component[name={}]/transceiver/config/enabled",
        transceiver
    )
}

/// Optical channel associated with the first physical channel of a transceiver.
pub fn associated_optical_channel(transceiver: &str) -> String {
    format!(
        "/components/component[name={}]/transceiver/physical-channels/channel[index=0]/state/associated-optical-channel",
        transceiver
    )
}

/// `/components/component[name=<name>]/optical-channel/config`
pub fn optical_channel_config(och: &str) -> String {
    format!("/components/component[name={}]/optical-channel/config", och)
}

/// `/network-instances/network-instance[name=<name>]/config`
pub fn network_instance_config(name: &str) -> String {
    format!("/network-instances/network-instance[name={}]/config", name)
}

/// Inventory state leaves of a platform component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InventoryLeaf {
    SerialNo,
    PartNo,
    MfgName,
    HardwareVersion,
    FirmwareVersion,
    MfgDate,
    Type,
}

impl InventoryLeaf {
    /// String-typed leaves, in the order they are sampled.
    pub const STRINGS: [InventoryLeaf; 6] = [
        InventoryLeaf::SerialNo,
        InventoryLeaf::PartNo,
        InventoryLeaf::MfgName,
        InventoryLeaf::HardwareVersion,
        InventoryLeaf::FirmwareVersion,
        InventoryLeaf::MfgDate,
    ];

    /// YANG leaf name.
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryLeaf::SerialNo => "serial-no",
            InventoryLeaf::PartNo => "part-no",
            InventoryLeaf::MfgName => "mfg-name",
            InventoryLeaf::HardwareVersion => "hardware-version",
            InventoryLeaf::FirmwareVersion => "firmware-version",
            InventoryLeaf::MfgDate => "mfg-date",
            InventoryLeaf::Type => "type",
        }
    }
}

impl fmt::Display for InventoryLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interface operational state (`oper-status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperStatus {
    Up,
    Down,
    Testing,
    Unknown,
    Dormant,
    NotPresent,
    LowerLayerDown,
}

impl OperStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperStatus::Up => "UP",
            OperStatus::Down => "DOWN",
            OperStatus::Testing => "TESTING",
            OperStatus::Unknown => "UNKNOWN",
            OperStatus::Dormant => "DORMANT",
            OperStatus::NotPresent => "NOT_PRESENT",
            OperStatus::LowerLayerDown => "LOWER_LAYER_DOWN",
        }
    }
}

impl fmt::Display for OperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OperStatus> for TelemetryValue {
    fn from(status: OperStatus) -> Self {
        TelemetryValue::Text(status.as_str().to_string())
    }
}

// Identities derived from OPENCONFIG_HARDWARE_COMPONENT, including those
// defined outside openconfig-platform-types.
const HARDWARE_COMPONENTS: &[&str] = &[
    "CHASSIS",
    "BACKPLANE",
    "FABRIC",
    "POWER_SUPPLY",
    "FAN",
    "FAN_TRAY",
    "SENSOR",
    "FRU",
    "LINECARD",
    "CONTROLLER_CARD",
    "PORT",
    "TRANSCEIVER",
    "CPU",
    "STORAGE",
    "INTEGRATED_CIRCUIT",
    "OPTICAL_CHANNEL",
];

const SOFTWARE_COMPONENTS: &[&str] = &[
    "OPERATING_SYSTEM",
    "OPERATING_SYSTEM_UPDATE",
    "BIOS",
    "BOOT_LOADER",
    "SOFTWARE_MODULE",
];

/// Union value of a component's `type` leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentType {
    /// `OPENCONFIG_HARDWARE_COMPONENT` identity, e.g. `TRANSCEIVER`.
    Hardware(String),
    /// `OPENCONFIG_SOFTWARE_COMPONENT` identity, e.g. `OPERATING_SYSTEM`.
    Software(String),
}

impl ComponentType {
    /// Parse an identityref, with or without its module prefix.
    pub fn parse(identity: &str) -> Option<Self> {
        let name = strip_module(identity);
        if HARDWARE_COMPONENTS.contains(&name) {
            Some(ComponentType::Hardware(name.to_string()))
        } else if SOFTWARE_COMPONENTS.contains(&name) {
            Some(ComponentType::Software(name.to_string()))
        } else {
            None
        }
    }

    pub fn identity(&self) -> &str {
        match self {
            ComponentType::Hardware(name) | ComponentType::Software(name) => name,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identity())
    }
}

impl Leaf for ComponentType {
    const KIND: &'static str = "union";

    fn from_value(value: &TelemetryValue) -> Option<Self> {
        ComponentType::parse(value.as_text()?)
    }
}

fn strip_module(identity: &str) -> &str {
    identity
        .rsplit_once(':')
        .map(|(_, name)| name)
        .unwrap_or(identity)
}
