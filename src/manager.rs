use crate::config::ControlConfig;
use crate::error::{ConfigError, ControlError};
use crate::event::Event;
use crate::group::{Group, GroupMember};
use crate::sensor::{SensorId, SensorSource, Speed};
use crate::trigger::Trigger;
use crate::zone::Zone;
use heapless::spsc::Queue;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};

const MAX_STIMULUS_QUEUE_SIZE: usize = 32;

type StimulusQueue = Queue<Stimulus, MAX_STIMULUS_QUEUE_SIZE>;

/// An external occurrence the control loop reacts to. Stimuli are
/// queued and served one at a time; a firing always runs to completion
/// before the next stimulus is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stimulus {
    /// Startup. Dispatched synchronously before any external stimulus
    /// so every zone has a first arbitrated speed.
    Init,
    /// A tracked bus property changed.
    SignalChanged { sensor: SensorId },
    /// Wall-clock advanced by `dt`; timer triggers accumulate it.
    TimerTick { dt: Duration },
}

/// Write side of the hardware actuation collaborator. Called only when
/// a zone's arbitrated speed actually changes.
pub trait SpeedActuator {
    fn set_commanded_speed(&mut self, zone: &str, speed: Speed);
}

/// Actuator that only records what was commanded; used by tests and by
/// the CLI dry run.
#[derive(Debug, Default)]
pub struct RecordingActuator {
    pub commands: Vec<(String, Speed)>,
}

impl SpeedActuator for RecordingActuator {
    fn set_commanded_speed(&mut self, zone: &str, speed: Speed) {
        self.commands.push((zone.to_string(), speed));
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct DispatchStats {
    pub stimuli_processed: u32,
    pub event_firings: u32,
    pub dropped_stimuli: u32,
    pub speed_changes: u32,
}

/// Process-scoped owner of all zones and events.
///
/// The manager routes stimuli to trigger firings and runs each firing's
/// `(action, group)` pairs in configuration order against the event's
/// addressed zone. All zone mutation happens on the single thread that
/// holds `&mut Manager`, which gives the per-zone sequential
/// consistency guarantee without locks.
pub struct Manager {
    zones: HashMap<String, Zone>,
    events: Vec<Event>,
    /// Zones addressed by at least one event; the rest are commanded
    /// full speed unconditionally.
    event_zones: HashSet<String>,
    /// Last speed pushed to the actuator per zone.
    applied: HashMap<String, Speed>,
    stimulus_queue: StimulusQueue,
    stats: DispatchStats,
}

impl Manager {
    /// Build a manager from a validated configuration. Any dangling
    /// reference or malformed entry is fatal here, before the control
    /// loop starts.
    pub fn new(config: &ControlConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut zones = HashMap::new();
        for zc in &config.zones {
            zones.insert(
                zc.id.clone(),
                Zone::new(&zc.id, zc.default_floor, zc.ceiling, zc.full_speed),
            );
        }

        let mut events = Vec::with_capacity(config.events.len());
        let mut event_zones = HashSet::new();
        for ec in &config.events {
            event_zones.insert(ec.zone.clone());
            let groups = ec
                .groups
                .iter()
                .map(|gc| {
                    Group::new(
                        &gc.name,
                        gc.members
                            .iter()
                            .map(|mc| GroupMember {
                                sensor: mc.sensor.clone(),
                                counts: mc.counts,
                            })
                            .collect(),
                    )
                })
                .collect();
            events.push(Event {
                name: ec.name.clone(),
                zone: ec.zone.clone(),
                groups,
                actions: ec.actions.clone(),
                triggers: ec.triggers.iter().cloned().map(Trigger::new).collect(),
            });
        }

        Ok(Self {
            zones,
            events,
            event_zones,
            applied: HashMap::new(),
            stimulus_queue: Queue::new(),
            stats: DispatchStats::default(),
        })
    }

    /// Arm every trigger and run the startup firing synchronously.
    /// After this returns, every zone has been commanded a first speed:
    /// init-triggered events have arbitrated theirs, and zones no event
    /// addresses run at full speed.
    pub fn start(&mut self, sensors: &dyn SensorSource, actuator: &mut dyn SpeedActuator) {
        for event in &mut self.events {
            for trigger in &mut event.triggers {
                trigger.arm();
            }
        }
        info!(
            zones = self.zones.len(),
            events = self.events.len(),
            "fan control manager starting"
        );
        self.dispatch(&Stimulus::Init, sensors, actuator);
    }

    /// Queue a stimulus for cooperative processing. The queue is
    /// bounded; overflow drops the stimulus and reports it, and the
    /// next naturally occurring stimulus re-evaluates the same state.
    pub fn queue_stimulus(&mut self, stimulus: Stimulus) -> Result<(), ControlError> {
        self.stimulus_queue.enqueue(stimulus).map_err(|_| {
            self.stats.dropped_stimuli = self.stats.dropped_stimuli.saturating_add(1);
            ControlError::StimulusQueueFull
        })
    }

    /// Serve all queued stimuli, each to completion, in arrival order.
    pub fn process_stimuli(&mut self, sensors: &dyn SensorSource, actuator: &mut dyn SpeedActuator) {
        while let Some(stimulus) = self.stimulus_queue.dequeue() {
            self.dispatch(&stimulus, sensors, actuator);
        }
    }

    /// Dispatch one stimulus: fire every matching trigger, run each
    /// fired event's actions in configuration order, then push changed
    /// speeds to the actuator.
    pub fn dispatch(
        &mut self,
        stimulus: &Stimulus,
        sensors: &dyn SensorSource,
        actuator: &mut dyn SpeedActuator,
    ) {
        self.stats.stimuli_processed = self.stats.stimuli_processed.saturating_add(1);

        for event in &mut self.events {
            let mut fired = false;
            // Every trigger observes the stimulus; timer bookkeeping
            // must advance even after another trigger already fired.
            for trigger in &mut event.triggers {
                let this_fired = match stimulus {
                    Stimulus::Init => trigger.fire_init(),
                    Stimulus::SignalChanged { sensor } => trigger.fire_signal(sensor),
                    Stimulus::TimerTick { dt } => trigger.fire_tick(*dt),
                };
                fired = fired || this_fired;
            }
            if !fired {
                continue;
            }

            let Some(zone) = self.zones.get_mut(&event.zone) else {
                // Unreachable after validation; skip rather than tear
                // down the control loop.
                warn!(event = %event.name, zone = %event.zone, "fired event has no zone");
                continue;
            };

            debug!(event = %event.name, zone = %event.zone, "event firing");
            self.stats.event_firings = self.stats.event_firings.saturating_add(1);
            for action in &event.actions {
                for group in &event.groups {
                    action.run(zone, group, sensors);
                }
            }
        }

        self.apply_speeds(actuator);
    }

    /// Push each zone's effective commanded speed to the actuator when
    /// it differs from the last applied value.
    fn apply_speeds(&mut self, actuator: &mut dyn SpeedActuator) {
        for (id, zone) in &self.zones {
            let speed = if self.event_zones.contains(id) {
                zone.commanded()
            } else {
                // Documented default: a zone with no configured events
                // runs at full speed.
                zone.full_speed()
            };
            if self.applied.get(id) != Some(&speed) {
                info!(zone = %id, speed, "commanding fan speed");
                actuator.set_commanded_speed(id, speed);
                self.applied.insert(id.clone(), speed);
                self.stats.speed_changes = self.stats.speed_changes.saturating_add(1);
            }
        }
    }

    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.zones.get(id)
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }
}
