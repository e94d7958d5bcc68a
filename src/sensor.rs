use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fan speed target in PWM units.
pub type Speed = u64;

/// Name of a sensor object on the management bus.
pub type SensorId = String;

/// A single live sensor value together with the presence of the service
/// that produces it. `owned = false` means the producing service is
/// absent from the bus and the value must be treated as stale even when
/// it is numerically present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: SensorId,
    pub value: f64,
    pub owned: bool,
}

/// The cached `(value, owned)` pair a zone keeps per group member after
/// a service refresh. A sensor whose read failed has `value = 0.0` and
/// `owned = false`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberService {
    pub value: f64,
    pub owned: bool,
}

/// Read side of the sensor/service collaborator.
///
/// Implementations back onto the management bus property cache; reads
/// are expected to be fast local lookups. A failed read surfaces as
/// `None` and the caller records the member as un-owned. Unavailability
/// is the expected path the trust and default-floor mechanisms exist to
/// handle, so it is never an error.
pub trait SensorSource {
    fn read(&self, id: &str) -> Option<f64>;
    fn is_owned(&self, id: &str) -> bool;

    /// Snapshot one sensor into the service cache shape.
    fn service(&self, id: &str) -> MemberService {
        match self.read(id) {
            Some(value) => MemberService {
                value,
                owned: self.is_owned(id),
            },
            // No such property on the bus: skip the value, treat the
            // member as currently un-owned.
            None => MemberService {
                value: 0.0,
                owned: false,
            },
        }
    }
}

/// In-memory sensor bus used by the daemon's simulated hardware and by
/// tests. Owner state defaults to present for any sensor that has a
/// value and can be withdrawn independently of the value.
#[derive(Debug, Default, Clone)]
pub struct SensorMap {
    values: HashMap<SensorId, f64>,
    disowned: HashMap<SensorId, bool>,
}

impl SensorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<SensorId>, value: f64) {
        self.values.insert(id.into(), value);
    }

    pub fn set_owned(&mut self, id: impl Into<SensorId>, owned: bool) {
        self.disowned.insert(id.into(), !owned);
    }

    pub fn remove(&mut self, id: &str) {
        self.values.remove(id);
        self.disowned.remove(id);
    }

    pub fn sensor_ids(&self) -> impl Iterator<Item = &SensorId> {
        self.values.keys()
    }
}

impl SensorSource for SensorMap {
    fn read(&self, id: &str) -> Option<f64> {
        self.values.get(id).copied()
    }

    fn is_owned(&self, id: &str) -> bool {
        match self.values.get(id) {
            Some(_) => !self.disowned.get(id).copied().unwrap_or(false),
            // Sensor not in the cache at all, therefore owner missing.
            None => false,
        }
    }
}
