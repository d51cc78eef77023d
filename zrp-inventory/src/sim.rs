//! In-process simulated DUT.
//!
//! Models just enough of a router with 400ZR_PLUS optics to drive the
//! scenarios without hardware: inventory leaves per transceiver, interface
//! to transceiver to optical channel mapping, and oper-status that follows
//! the configuration after a link settle delay. Faults can be injected per
//! leaf to exercise the failure paths.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use fpkit_common::{
    Device, Error, InventoryLeaf, Leaf, OperStatus, SampleStream, TelemetryValue,
    current_timestamp_millis, oc,
};

/// Inventory reported by a simulated transceiver.
#[derive(Debug, Clone)]
pub struct SimInventory {
    pub serial_no: String,
    pub part_no: String,
    pub mfg_name: String,
    pub hardware_version: String,
    pub firmware_version: String,
    pub mfg_date: String,
}

impl SimInventory {
    /// A plausible 400ZR_PLUS module.
    pub fn zr_plus(serial_no: &str) -> Self {
        Self {
            serial_no: serial_no.to_string(),
            part_no: "QDD-400G-ZRP-S".to_string(),
            mfg_name: "Acme Optics".to_string(),
            hardware_version: "1.0".to_string(),
            firmware_version: "61.23".to_string(),
            mfg_date: "2024-03-18".to_string(),
        }
    }

    fn leaves(&self) -> [(InventoryLeaf, &str); 6] {
        [
            (InventoryLeaf::SerialNo, &self.serial_no),
            (InventoryLeaf::PartNo, &self.part_no),
            (InventoryLeaf::MfgName, &self.mfg_name),
            (InventoryLeaf::HardwareVersion, &self.hardware_version),
            (InventoryLeaf::FirmwareVersion, &self.firmware_version),
            (InventoryLeaf::MfgDate, &self.mfg_date),
        ]
    }
}

#[derive(Debug, Clone)]
struct SimPort {
    interface: String,
    transceiver: String,
    optical_channel: String,
}

#[derive(Debug, Default)]
struct SimState {
    leaves: HashMap<String, TelemetryValue>,
    muted: HashSet<String>,
    ports: Vec<SimPort>,
    updates: Vec<(String, TelemetryValue)>,
}

impl SimState {
    /// Store an update with merge semantics: JSON objects are flattened
    /// into one leaf per member.
    fn merge(&mut self, path: &str, value: TelemetryValue) {
        match value {
            TelemetryValue::Json(serde_json::Value::Object(members)) => {
                for (name, member) in members {
                    self.merge(&format!("{}/{}", path, name), TelemetryValue::from_json(member));
                }
            }
            value => {
                self.leaves.insert(path.to_string(), value);
            }
        }
    }

    fn flag(&self, path: &str) -> bool {
        !matches!(self.leaves.get(path), Some(TelemetryValue::Boolean(false)))
    }

    /// A link is up when the interface and its transceiver are enabled and
    /// the optical channel has an operational mode.
    fn link_status(&self, port: &SimPort) -> OperStatus {
        let interface_enabled = self.flag(&oc::interface_enabled(&port.interface));
        let transceiver_enabled = self.flag(&oc::transceiver_enabled(&port.transceiver));
        let channel_configured = self.leaves.contains_key(&format!(
            "{}/operational-mode",
            oc::optical_channel_config(&port.optical_channel)
        ));

        if interface_enabled && transceiver_enabled && channel_configured {
            OperStatus::Up
        } else {
            OperStatus::Down
        }
    }

    fn refresh_links(&mut self) -> bool {
        let mut changed = false;
        for port in self.ports.clone() {
            let path = oc::interface_oper_status(&port.interface);
            let status: TelemetryValue = self.link_status(&port).into();
            if self.leaves.get(&path) != Some(&status) {
                debug!("Simulated link {} is now {}", port.interface, status);
                self.leaves.insert(path, status);
                changed = true;
            }
        }
        changed
    }
}

/// Simulated device-under-test.
#[derive(Clone)]
pub struct SimDut {
    name: String,
    state: Arc<Mutex<SimState>>,
    changes: watch::Sender<u64>,
    link_delay: Duration,
}

impl SimDut {
    pub fn new(name: impl Into<String>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(SimState::default())),
            changes,
            link_delay: Duration::from_secs(5),
        }
    }

    /// Time for a link to follow a configuration change.
    pub fn with_link_delay(mut self, delay: Duration) -> Self {
        self.link_delay = delay;
        self
    }

    /// Add a port with its transceiver and optical channel.
    pub fn with_port(
        self,
        interface: &str,
        transceiver: &str,
        optical_channel: &str,
        inventory: SimInventory,
    ) -> Self {
        {
            let mut state = self.lock();
            state.leaves.insert(
                oc::interface_transceiver(interface),
                TelemetryValue::from(transceiver),
            );
            state.leaves.insert(
                oc::associated_optical_channel(transceiver),
                TelemetryValue::from(optical_channel),
            );
            for (leaf, value) in inventory.leaves() {
                state.leaves.insert(
                    oc::component_state(transceiver, leaf),
                    TelemetryValue::from(value),
                );
            }
            state.leaves.insert(
                oc::component_state(transceiver, InventoryLeaf::Type),
                TelemetryValue::from("openconfig-platform-types:TRANSCEIVER"),
            );
            state.ports.push(SimPort {
                interface: interface.to_string(),
                transceiver: transceiver.to_string(),
                optical_channel: optical_channel.to_string(),
            });
            state.refresh_links();
        }
        self
    }

    /// A two-port DUT wired the way the test expects.
    pub fn two_port(port1: &str, port2: &str) -> Self {
        Self::new("sim-dut")
            .with_port(port1, "Transceiver1", "OpticalChannel1", SimInventory::zr_plus("ZRP0001"))
            .with_port(port2, "Transceiver2", "OpticalChannel2", SimInventory::zr_plus("ZRP0002"))
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version += 1);
    }

    /// Overwrite a state leaf.
    pub fn set_leaf(&self, path: &str, value: TelemetryValue) {
        self.lock().leaves.insert(path.to_string(), value);
        self.notify();
    }

    /// Remove a leaf; streams report it as absent.
    pub fn remove_leaf(&self, path: &str) {
        self.lock().leaves.remove(path);
        self.notify();
    }

    /// Stop streaming a leaf entirely.
    pub fn mute(&self, path: &str) {
        self.lock().muted.insert(path.to_string());
    }

    /// Current value of any leaf, config or state.
    pub fn leaf(&self, path: &str) -> Option<TelemetryValue> {
        self.lock().leaves.get(path).cloned()
    }

    /// Every update received, in order.
    pub fn updates(&self) -> Vec<(String, TelemetryValue)> {
        self.lock().updates.clone()
    }

    fn schedule_link_refresh(&self) {
        let dut = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(dut.link_delay).await;
            let changed = dut.lock().refresh_links();
            if changed {
                dut.notify();
            }
        });
    }
}

fn matches_want(got: Option<&TelemetryValue>, want: &TelemetryValue) -> bool {
    got == Some(want)
}

impl Device for SimDut {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, path: &str) -> fpkit_common::Result<TelemetryValue> {
        self.leaf(path).ok_or_else(|| Error::NotFound {
            path: path.to_string(),
        })
    }

    async fn update(&self, path: &str, value: TelemetryValue) -> fpkit_common::Result<()> {
        {
            let mut state = self.lock();
            state.updates.push((path.to_string(), value.clone()));
            state.merge(path, value);
        }
        self.notify();
        self.schedule_link_refresh();
        Ok(())
    }

    async fn await_value(
        &self,
        path: &str,
        want: &TelemetryValue,
        timeout: Duration,
    ) -> fpkit_common::Result<TelemetryValue> {
        let mut changes = self.changes.subscribe();
        let wait = async {
            loop {
                let reached = matches_want(self.lock().leaves.get(path), want);
                if reached || changes.changed().await.is_err() {
                    return;
                }
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| Error::AwaitTimeout {
                path: path.to_string(),
                want: want.to_string(),
                timeout,
            })?;
        Ok(want.clone())
    }

    async fn sample<T: Leaf + Send + 'static>(
        &self,
        path: &str,
        interval: Duration,
    ) -> fpkit_common::Result<SampleStream<T>> {
        let (sink, stream) = SampleStream::channel(path, interval);
        let dut = self.clone();
        let leaf = path.to_string();

        // Twice per interval, so every pull window holds a reading strictly
        // inside it.
        let period = (interval / 2).max(Duration::from_millis(1));
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let (muted, value) = {
                    let state = dut.lock();
                    (state.muted.contains(&leaf), state.leaves.get(&leaf).cloned())
                };
                if muted {
                    continue;
                }
                if !sink.send(current_timestamp_millis(), value) {
                    return;
                }
            }
        });

        Ok(stream.with_task(task))
    }
}
