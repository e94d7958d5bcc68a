use crate::action::Action;
use crate::group::Group;
use crate::trigger::Trigger;

/// A configured fan control event: the unit binding groups of sensors,
/// the triggers that react to them, and the actions to run when a
/// trigger fires. Events address exactly one zone and live for the
/// process lifetime; configuration is immutable after load.
///
/// When no events address a zone, that zone is commanded its
/// `full_speed` value unconditionally.
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub zone: String,
    pub groups: Vec<Group>,
    pub actions: Vec<Action>,
    pub triggers: Vec<Trigger>,
}

impl Event {
    /// Whether any of this event's triggers track `sensor`.
    pub fn tracks_sensor(&self, sensor: &str) -> bool {
        self.triggers.iter().any(|t| {
            matches!(&t.kind, crate::trigger::TriggerKind::Signal { sensor: tracked }
                if tracked == sensor)
        })
    }
}
