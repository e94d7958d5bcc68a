use crate::group::Group;
use crate::sensor::{SensorId, SensorReading};
use serde::{Deserialize, Serialize};

/// Verdict of a trust evaluation. When the group is untrusted,
/// `excluded` names the member sensors that must not be used to drive
/// speed decisions downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustResult {
    pub trusted: bool,
    pub excluded: Vec<SensorId>,
}

impl TrustResult {
    fn trusted() -> Self {
        Self {
            trusted: true,
            excluded: Vec::new(),
        }
    }

    fn untrusted(excluded: Vec<SensorId>) -> Self {
        Self {
            trusted: false,
            excluded,
        }
    }
}

/// Trust strategies a group can be configured with. Closed variant
/// dispatched by the name declared in configuration; every strategy is
/// a pure function of the current member snapshot, with no state
/// carried between evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustStrategy {
    /// Trusted as long as at least one counting member reports a
    /// nonzero speed. All members reading zero at once means the whole
    /// set is failing the same way, so none of it is believable.
    NonzeroSpeed,
}

impl TrustStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            TrustStrategy::NonzeroSpeed => "nonzero_speed",
        }
    }

    /// Evaluate the strategy over a group's current service snapshot.
    /// Members configured with `counts = false` never influence the
    /// verdict. A group with no counting members has no evidence of
    /// motion at all and is untrusted.
    pub fn evaluate(&self, group: &Group, services: &[SensorReading]) -> TrustResult {
        match self {
            TrustStrategy::NonzeroSpeed => {
                let counting: Vec<&SensorReading> = services
                    .iter()
                    .filter(|s| group.counting_members().any(|m| m.sensor == s.id))
                    .collect();

                if counting.iter().any(|s| s.value != 0.0) {
                    TrustResult::trusted()
                } else {
                    // No partial exclusion for this strategy: the whole
                    // membership is excluded together. An empty set has
                    // no evidence of motion and falls out untrusted.
                    TrustResult::untrusted(counting.iter().map(|s| s.id.clone()).collect())
                }
            }
        }
    }
}
