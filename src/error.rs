use thiserror::Error;

/// Fatal configuration problems. The process must not start with a
/// partially valid configuration, so every variant aborts the load.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("duplicate zone id `{0}`")]
    DuplicateZone(String),

    #[error("event `{event}` references undeclared zone `{zone}`")]
    UnknownZone { event: String, zone: String },

    #[error(
        "zone `{zone}` bounds cannot hold default_floor {default_floor} <= ceiling {ceiling} <= full_speed {full_speed}"
    )]
    InvalidZoneBounds {
        zone: String,
        default_floor: u64,
        ceiling: u64,
        full_speed: u64,
    },

    #[error("event `{0}` declares no actions")]
    NoActions(String),

    #[error("event `{0}` declares no triggers")]
    NoTriggers(String),
}

/// Runtime errors of the dispatch layer. Transient sensor
/// unavailability is deliberately absent: it surfaces as un-owned
/// members and conservative arbitration, not as an error.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("stimulus queue full, stimulus dropped")]
    StimulusQueueFull,
}
