use crate::group::Group;
use crate::sensor::{SensorReading, SensorSource, Speed};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Snapshot of a zone's arbitrated control state, suitable for status
/// reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneState {
    pub id: String,
    pub floor: Speed,
    pub ceiling: Speed,
    pub target: Speed,
    pub default_floor: Speed,
    pub full_speed: Speed,
}

/// Arbitrated control state for one physical fan domain.
///
/// The zone holds the merged result of every concurrently active
/// constraint: a floor, a ceiling, the commanded target, and a
/// per-group gate map recording which groups are currently allowed to
/// move the floor. It runs no logic of its own; actions call the
/// mutators and the invariant
/// `default_floor <= floor <= target <= ceiling <= full_speed`
/// is restored by silent clamping after every mutation. Clamping
/// instead of erroring keeps each action side-effect-local; the next
/// stimulus re-evaluates state anyway.
#[derive(Debug, Clone)]
pub struct Zone {
    id: String,
    floor: Speed,
    ceiling: Speed,
    target: Speed,
    default_floor: Speed,
    full_speed: Speed,

    /// Gate map: which group most recently asserted whether floor
    /// changes keyed to it are allowed. Entries persist until the
    /// owning action rewrites them.
    floor_change_allowed: HashMap<String, bool>,

    /// Cached `(value, owned)` snapshots per group, in member order.
    /// Replaced wholesale on every refresh, never merged.
    group_services: HashMap<String, Vec<SensorReading>>,
}

impl Zone {
    /// Build a zone from its configured bounds. Bounds are expected to
    /// be pre-validated (`default_floor <= ceiling <= full_speed`); the
    /// zone starts at its default floor and commands full speed until
    /// the first arbitrated firing lowers it.
    pub fn new(id: impl Into<String>, default_floor: Speed, ceiling: Speed, full_speed: Speed) -> Self {
        let zone = Self {
            id: id.into(),
            floor: default_floor,
            ceiling,
            target: ceiling,
            default_floor,
            full_speed,
            floor_change_allowed: HashMap::new(),
            group_services: HashMap::new(),
        };
        zone.assert_invariants();
        zone
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn floor(&self) -> Speed {
        self.floor
    }

    pub fn ceiling(&self) -> Speed {
        self.ceiling
    }

    pub fn default_floor(&self) -> Speed {
        self.default_floor
    }

    pub fn full_speed(&self) -> Speed {
        self.full_speed
    }

    /// The currently commanded speed for this zone.
    pub fn commanded(&self) -> Speed {
        self.target
    }

    pub fn state(&self) -> ZoneState {
        ZoneState {
            id: self.id.clone(),
            floor: self.floor,
            ceiling: self.ceiling,
            target: self.target,
            default_floor: self.default_floor,
            full_speed: self.full_speed,
        }
    }

    /// Set the zone floor, clamped to `[default_floor, ceiling]`. The
    /// target is raised along with the floor when it would fall below.
    pub fn set_floor(&mut self, speed: Speed) {
        let clamped = speed.clamp(self.default_floor, self.ceiling);
        if clamped != speed {
            debug!(zone = %self.id, requested = speed, clamped, "floor request clamped");
        }
        self.floor = clamped;
        if self.target < self.floor {
            self.target = self.floor;
        }
        self.assert_invariants();
    }

    /// Set the zone ceiling, clamped to `[floor, full_speed]`. The
    /// target is lowered along with the ceiling when it would exceed.
    pub fn set_ceiling(&mut self, speed: Speed) {
        let clamped = speed.clamp(self.floor, self.full_speed);
        if clamped != speed {
            debug!(zone = %self.id, requested = speed, clamped, "ceiling request clamped");
        }
        self.ceiling = clamped;
        if self.target > self.ceiling {
            self.target = self.ceiling;
        }
        self.assert_invariants();
    }

    /// Set the commanded target, clamped to `[floor, ceiling]`.
    pub fn set_target(&mut self, speed: Speed) {
        let clamped = speed.clamp(self.floor, self.ceiling);
        if clamped != speed {
            debug!(zone = %self.id, requested = speed, clamped, "target request clamped");
        }
        self.target = clamped;
        self.assert_invariants();
    }

    /// Record whether `group` currently permits floor changes keyed to
    /// it. The entry persists until the owning action rewrites it.
    pub fn set_floor_change_allowed(&mut self, group: &Group, allowed: bool) {
        self.floor_change_allowed.insert(group.name.clone(), allowed);
    }

    /// Whether floor changes keyed to `group` are currently allowed.
    /// A group that has never asserted a constraint does not hold the
    /// gate closed.
    pub fn floor_change_allowed(&self, group: &Group) -> bool {
        self.floor_change_allowed
            .get(&group.name)
            .copied()
            .unwrap_or(true)
    }

    /// Whether every group that has asserted a gate entry currently
    /// allows floor changes.
    pub fn all_floor_changes_allowed(&self) -> bool {
        self.floor_change_allowed.values().all(|allowed| *allowed)
    }

    /// Refresh the cached `(value, owned)` view of the group's member
    /// services from the live sensor collaborator. Members whose read
    /// fails are recorded un-owned, not skipped, so the snapshot always
    /// parallels the group's membership order.
    pub fn set_services(&mut self, group: &Group, sensors: &dyn SensorSource) {
        let services = group
            .members
            .iter()
            .map(|member| {
                let service = sensors.service(&member.sensor);
                SensorReading {
                    id: member.sensor.clone(),
                    value: service.value,
                    owned: service.owned,
                }
            })
            .collect();
        self.group_services.insert(group.name.clone(), services);
    }

    /// The most recently refreshed snapshot for `group`. Empty if the
    /// group has never been refreshed against this zone.
    pub fn group_services(&self, group: &Group) -> &[SensorReading] {
        self.group_services
            .get(&group.name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.default_floor <= self.floor,
            "Zone {} floor {} below default floor {}",
            self.id,
            self.floor,
            self.default_floor
        );
        debug_assert!(
            self.floor <= self.target,
            "Zone {} target {} below floor {}",
            self.id,
            self.target,
            self.floor
        );
        debug_assert!(
            self.target <= self.ceiling,
            "Zone {} target {} above ceiling {}",
            self.id,
            self.target,
            self.ceiling
        );
        debug_assert!(
            self.ceiling <= self.full_speed,
            "Zone {} ceiling {} above full speed {}",
            self.id,
            self.ceiling,
            self.full_speed
        );
    }
}
