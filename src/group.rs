use crate::sensor::SensorId;
use serde::{Deserialize, Serialize};

/// One sensor reference within a group. `counts` controls whether the
/// member participates in trust decisions; members that do not count
/// are still refreshed into the service cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub sensor: SensorId,
    pub counts: bool,
}

impl GroupMember {
    pub fn new(sensor: impl Into<SensorId>) -> Self {
        Self {
            sensor: sensor.into(),
            counts: true,
        }
    }

    pub fn excluded(sensor: impl Into<SensorId>) -> Self {
        Self {
            sensor: sensor.into(),
            counts: false,
        }
    }
}

/// A named, ordered set of sensor references used as the unit of trust
/// and action evaluation. Membership order is insertion order from
/// configuration and is stable for the group's lifetime. Groups are
/// immutable after load; live `(value, owned)` snapshots are cached on
/// the zone, keyed by group name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub members: Vec<GroupMember>,
}

impl Group {
    pub fn new(name: impl Into<String>, members: Vec<GroupMember>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members that participate in trust decisions, in declared order.
    pub fn counting_members(&self) -> impl Iterator<Item = &GroupMember> {
        self.members.iter().filter(|m| m.counts)
    }
}
