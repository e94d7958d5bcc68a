use crate::action::Action;
use crate::error::ConfigError;
use crate::sensor::{SensorId, Speed};
use crate::trigger::TriggerKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Top-level configuration: the zones under control and the events
/// that drive them. Loaded once at startup; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    pub zones: Vec<ZoneConfig>,
    #[serde(default)]
    pub events: Vec<EventConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub id: String,
    pub default_floor: Speed,
    pub ceiling: Speed,
    pub full_speed: Speed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    #[serde(default)]
    pub members: Vec<MemberConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberConfig {
    pub sensor: SensorId,
    #[serde(default = "default_counts")]
    pub counts: bool,
}

fn default_counts() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    pub name: String,
    pub zone: String,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
    pub actions: Vec<Action>,
    pub triggers: Vec<TriggerKind>,
}

impl ControlConfig {
    /// Load and validate a configuration file. Any malformed entry,
    /// unknown action/strategy name, or dangling zone reference is
    /// fatal here, before the control loop exists.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut zone_ids = HashSet::new();
        for zone in &self.zones {
            if !zone_ids.insert(zone.id.as_str()) {
                return Err(ConfigError::DuplicateZone(zone.id.clone()));
            }
            if zone.default_floor > zone.ceiling || zone.ceiling > zone.full_speed {
                return Err(ConfigError::InvalidZoneBounds {
                    zone: zone.id.clone(),
                    default_floor: zone.default_floor,
                    ceiling: zone.ceiling,
                    full_speed: zone.full_speed,
                });
            }
        }

        for event in &self.events {
            if !zone_ids.contains(event.zone.as_str()) {
                return Err(ConfigError::UnknownZone {
                    event: event.name.clone(),
                    zone: event.zone.clone(),
                });
            }
            if event.actions.is_empty() {
                return Err(ConfigError::NoActions(event.name.clone()));
            }
            if event.triggers.is_empty() {
                return Err(ConfigError::NoTriggers(event.name.clone()));
            }
            // Empty groups are legal: a group with no members is a real
            // configuration corner and flows through actions vacuously.
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> &'static str {
        r#"{
            "zones": [
                { "id": "zone0", "default_floor": 20, "ceiling": 100, "full_speed": 100 }
            ],
            "events": [
                {
                    "name": "fan presence floor",
                    "zone": "zone0",
                    "groups": [
                        { "name": "fan tachs",
                          "members": [ { "sensor": "fan0_tach" },
                                       { "sensor": "fan1_tach", "counts": false } ] }
                    ],
                    "actions": [ { "name": "default_floor" } ],
                    "triggers": [ { "kind": "init" },
                                  { "kind": "timer", "interval_ms": 5000, "timer": "repeating" } ]
                }
            ]
        }"#
    }

    #[test]
    fn test_minimal_config_parses() {
        let config = ControlConfig::from_json(minimal_config()).unwrap();
        assert_eq!(config.zones.len(), 1);
        assert_eq!(config.events.len(), 1);
        let event = &config.events[0];
        assert!(event.groups[0].members[0].counts);
        assert!(!event.groups[0].members[1].counts);
    }

    #[test]
    fn test_unknown_zone_reference_is_fatal() {
        let raw = minimal_config().replace("\"zone\": \"zone0\"", "\"zone\": \"zone9\"");
        let err = ControlConfig::from_json(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownZone { .. }));
    }

    #[test]
    fn test_inverted_zone_bounds_are_fatal() {
        let raw = minimal_config().replace("\"default_floor\": 20", "\"default_floor\": 120");
        let err = ControlConfig::from_json(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidZoneBounds { .. }));
    }

    #[test]
    fn test_unknown_strategy_name_is_fatal() {
        let raw = minimal_config().replace(
            r#"{ "name": "default_floor" }"#,
            r#"{ "name": "full_speed_on_mistrust", "strategy": "coin_flip" }"#,
        );
        let err = ControlConfig::from_json(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_event_without_triggers_is_fatal() {
        let mut raw: serde_json::Value = serde_json::from_str(minimal_config()).unwrap();
        raw["events"][0]["triggers"] = serde_json::json!([]);
        let err = ControlConfig::from_json(&raw.to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::NoTriggers(_)));
    }

    #[test]
    fn test_event_without_actions_is_fatal() {
        let mut raw: serde_json::Value = serde_json::from_str(minimal_config()).unwrap();
        raw["events"][0]["actions"] = serde_json::json!([]);
        let err = ControlConfig::from_json(&raw.to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::NoActions(_)));
    }

    #[test]
    fn test_duplicate_zone_id_is_fatal() {
        let mut raw: serde_json::Value = serde_json::from_str(minimal_config()).unwrap();
        let zone = raw["zones"][0].clone();
        raw["zones"].as_array_mut().unwrap().push(zone);
        let err = ControlConfig::from_json(&raw.to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateZone(_)));
    }
}
