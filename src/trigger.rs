use crate::sensor::SensorId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether a timer trigger re-arms after expiry or fires exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    Repeating,
    Oneshot,
}

/// The stimulus a trigger is armed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerKind {
    /// Fires on every observed change of the tracked sensor property.
    Signal { sensor: SensorId },
    /// Fires when the configured period elapses; actions run against
    /// the live snapshot at fire time, not the values at arm time.
    Timer {
        #[serde(rename = "interval_ms", with = "interval_ms")]
        interval: Duration,
        timer: TimerKind,
    },
    /// Fires once, synchronously, during startup, before any external
    /// stimulus is processed.
    Init,
}

/// Per-trigger firing state. Signal and repeating-timer triggers cycle
/// back to `Idle` after each firing; init and oneshot-timer triggers
/// terminate in `Fired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerState {
    Idle,
    Armed,
    Fired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub kind: TriggerKind,
    state: TriggerState,
    /// Milliseconds of accumulated tick time since the last expiry,
    /// for timer triggers.
    elapsed: Duration,
}

impl Trigger {
    pub fn new(kind: TriggerKind) -> Self {
        Self {
            kind,
            state: TriggerState::Idle,
            elapsed: Duration::ZERO,
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn arm(&mut self) {
        if self.state == TriggerState::Idle {
            self.state = TriggerState::Armed;
        }
    }

    /// Whether this trigger has terminated and can never fire again.
    pub fn terminated(&self) -> bool {
        self.state == TriggerState::Fired
    }

    /// Record a firing, re-arming unless the kind terminates.
    fn complete_firing(&mut self) {
        match self.kind {
            TriggerKind::Init | TriggerKind::Timer { timer: TimerKind::Oneshot, .. } => {
                self.state = TriggerState::Fired;
            }
            _ => {
                self.state = TriggerState::Idle;
                self.arm();
            }
        }
    }

    /// Fire against a startup stimulus. Returns whether the trigger
    /// fired.
    pub fn fire_init(&mut self) -> bool {
        if self.terminated() || !matches!(self.kind, TriggerKind::Init) {
            return false;
        }
        self.complete_firing();
        true
    }

    /// Fire against an observed property change on `sensor`.
    pub fn fire_signal(&mut self, sensor: &str) -> bool {
        if self.terminated() {
            return false;
        }
        match &self.kind {
            TriggerKind::Signal { sensor: tracked } if tracked == sensor => {
                self.complete_firing();
                true
            }
            _ => false,
        }
    }

    /// Advance timer bookkeeping by `dt` and fire if the period has
    /// elapsed.
    pub fn fire_tick(&mut self, dt: Duration) -> bool {
        if self.terminated() {
            return false;
        }
        match self.kind {
            TriggerKind::Timer { interval, .. } => {
                self.elapsed += dt;
                if self.elapsed >= interval {
                    self.elapsed = Duration::ZERO;
                    self.complete_firing();
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }
}

mod interval_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}
