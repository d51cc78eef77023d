//! Inventory telemetry conformance test for 400ZR_PLUS transceivers
//!
//! Verifies that a DUT keeps streaming valid inventory leaves for a
//! transceiver across interface flaps and transceiver power cycles.

pub mod config;
pub mod dutcfg;
pub mod error;
pub mod scenario;
pub mod sim;
pub mod verify;

pub use config::{InventoryConfig, ScenarioParams};
pub use error::{InventoryError, Result};
pub use scenario::{InventoryStreams, Scenario, run_scenario};
pub use sim::{SimDut, SimInventory};
pub use verify::verify_all_inventory_values;
