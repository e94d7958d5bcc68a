use crate::group::Group;
use crate::sensor::SensorSource;
use crate::trust::TrustStrategy;
use crate::zone::Zone;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configured policy logic run against a zone when an event fires.
///
/// Actions are stateless configuration; all state lives in the zone.
/// Every action is re-run on each stimulus that targets its event, not
/// only on state transitions, so `run` must be idempotent for unchanged
/// inputs. Closed variant dispatched by the name declared in
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Action {
    /// Force the zone's default floor while any member of the group is
    /// missing its owning service, and gate other floor changes keyed
    /// to the group until ownership is restored.
    DefaultFloor,

    /// Hold the zone at full speed while the group's sensor data is
    /// untrusted under the configured strategy. Data that cannot be
    /// believed must not justify anything less than maximum cooling.
    FullSpeedOnMistrust { strategy: TrustStrategy },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::DefaultFloor => "default_floor",
            Action::FullSpeedOnMistrust { .. } => "full_speed_on_mistrust",
        }
    }

    /// Run the action against the addressed zone. Mutates only the
    /// zone; sensor reads go through the collaborator and failures
    /// surface as un-owned members, never as errors.
    pub fn run(&self, zone: &mut Zone, group: &Group, sensors: &dyn SensorSource) {
        match self {
            Action::DefaultFloor => run_default_floor(zone, group, sensors),
            Action::FullSpeedOnMistrust { strategy } => {
                run_full_speed_on_mistrust(zone, group, sensors, *strategy);
            }
        }
    }
}

fn run_default_floor(zone: &mut Zone, group: &Group, sensors: &dyn SensorSource) {
    // Set/update the services of the group.
    zone.set_services(group, sensors);
    let missing_owner = zone.group_services(group).iter().any(|s| !s.owned);
    if missing_owner {
        info!(
            zone = %zone.id(),
            group = %group.name,
            floor = zone.default_floor(),
            "member service missing, forcing default floor"
        );
        zone.set_floor(zone.default_floor());
    }
    // Update fan control floor change allowed.
    zone.set_floor_change_allowed(group, !missing_owner);
}

fn run_full_speed_on_mistrust(
    zone: &mut Zone,
    group: &Group,
    sensors: &dyn SensorSource,
    strategy: TrustStrategy,
) {
    zone.set_services(group, sensors);
    let result = strategy.evaluate(group, zone.group_services(group));
    if result.trusted {
        debug!(zone = %zone.id(), group = %group.name, "group trusted");
        return;
    }
    info!(
        zone = %zone.id(),
        group = %group.name,
        strategy = strategy.name(),
        excluded = result.excluded.len(),
        "group untrusted, holding full speed"
    );
    zone.set_target(zone.full_speed());
}
