//! # Fan Zone Control
//!
//! A fan-speed control engine for server management controllers. The
//! crate continuously evaluates redundant sensor inputs, judges whether
//! each group of readings can currently be believed, and merges many
//! independently configured floor/ceiling/trust constraints into one
//! commanded speed per physical fan zone — always erring toward a
//! safe (higher) speed when information is missing or suspicious.
//!
//! ## Quick Start
//!
//! ```rust
//! use fanctl::config::ControlConfig;
//! use fanctl::manager::{Manager, RecordingActuator};
//! use fanctl::sensor::SensorMap;
//!
//! let config = ControlConfig::from_json(
//!     r#"{ "zones": [ { "id": "zone0", "default_floor": 20,
//!                       "ceiling": 100, "full_speed": 100 } ] }"#,
//! ).unwrap();
//!
//! let mut manager = Manager::new(&config).unwrap();
//! let bus = SensorMap::new();
//! let mut actuator = RecordingActuator::default();
//!
//! // The startup firing guarantees a first arbitrated speed.
//! manager.start(&bus, &mut actuator);
//! assert_eq!(actuator.commands, vec![("zone0".to_string(), 100)]);
//! ```
//!
//! ## Architecture
//!
//! - [`sensor`] - Sensor readings and the bus collaborator seam
//! - [`group`] - Ordered sensor groups, the unit of trust and action
//! - [`trust`] - Strategies judging whether a group is believable
//! - [`action`] - Configured zone mutations run on event firings
//! - [`trigger`] - Signal, timer, and startup trigger state machines
//! - [`event`] - Configuration units binding groups, triggers, actions
//! - [`zone`] - Arbitrated floor/ceiling/target state per fan domain
//! - [`manager`] - Stimulus queue and synchronous dispatch
//! - [`config`] - Load-time configuration model and validation

#![deny(warnings)]
#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod config;
pub mod error;
pub mod event;
pub mod group;
pub mod manager;
pub mod sensor;
pub mod trigger;
pub mod trust;
pub mod zone;

// Re-export main public types for convenience
pub use action::Action;
pub use config::ControlConfig;
pub use error::{ConfigError, ControlError};
pub use group::{Group, GroupMember};
pub use manager::{Manager, SpeedActuator, Stimulus};
pub use sensor::{SensorReading, SensorSource, Speed};
pub use trust::{TrustResult, TrustStrategy};
pub use zone::Zone;
