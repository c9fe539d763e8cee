//! Immutable definition records loaded from configuration.
//!
//! Definitions are plain data. The engine reads them and never mutates
//! them; every runtime entity holds its definition behind an `Arc` and
//! keeps its own mutable state alongside.

use serde::{Deserialize, Serialize};

use crate::enums::AbilityTrigger;
use crate::ids::{AbilityId, AgentDefinitionId, CallDefinitionId};
use crate::stats::StatProfile;

/// A timed stat modifier an agent can activate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    /// Identity; re-activating the same id refreshes instead of stacking.
    pub id: AbilityId,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// How long the modifier stays active once activated, in seconds.
    #[serde(default = "default_ability_duration")]
    pub duration_seconds: f64,
    /// Intended cooldown in seconds. Carried for presentation; the
    /// engine does not block re-activation on it.
    #[serde(default = "default_ability_cooldown")]
    pub cooldown_seconds: f64,
    /// When the ability fires by itself during a mission.
    #[serde(default)]
    pub trigger: AbilityTrigger,
    /// Flat deltas, applied to the base profile.
    #[serde(default)]
    pub flat: StatProfile,
    /// Percent deltas (`1.0` = +100%), applied after all flat deltas.
    #[serde(default)]
    pub percent: StatProfile,
}

/// A dispatchable agent archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Identity of the archetype.
    pub id: AgentDefinitionId,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,
    /// Base stats before any modifier.
    #[serde(default = "default_base_stats")]
    pub base_stats: StatProfile,
    /// Abilities this agent can use, by id.
    #[serde(default)]
    pub abilities: Vec<AbilityId>,
    /// Movement speed before the mobility bonus.
    #[serde(default = "default_base_move_speed")]
    pub base_move_speed: f64,
}

/// How a call judges the team sent to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallRequirement {
    /// Per-stat resolution weights (weighted-score variant).
    Weighted(StatProfile),
    /// A required stat profile the combined team is compared against
    /// (required-profile variant). Components `<= 0` mean "no requirement".
    Required(StatProfile),
}

impl Default for CallRequirement {
    fn default() -> Self {
        Self::Weighted(default_weights())
    }
}

/// A kind of distress call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallDefinition {
    /// Identity of the call kind.
    pub id: CallDefinitionId,
    /// Short title.
    #[serde(default)]
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Scoring requirement.
    #[serde(default)]
    pub requirement: CallRequirement,
    /// Base difficulty scalar. Interpreted on a 0--10 scale by the
    /// weighted variant and as a divisor by the required-profile variant.
    #[serde(default = "default_base_difficulty")]
    pub base_difficulty: f64,
    /// Suggested team size.
    #[serde(default = "default_recommended_agents")]
    pub recommended_agents: u32,
    /// Lower bound of the randomly drawn mission duration, in seconds.
    #[serde(default = "default_min_duration")]
    pub min_duration_seconds: f64,
    /// Upper bound of the randomly drawn mission duration, in seconds.
    #[serde(default = "default_max_duration")]
    pub max_duration_seconds: f64,
    /// Seconds from creation until the call expires, dispatched or not.
    /// `None` means it never expires.
    #[serde(default)]
    pub time_limit_seconds: Option<f64>,
}

/// Default per-stat weights for the weighted-score variant.
pub const fn default_weights() -> StatProfile {
    StatProfile::new(0.2, 0.2, 0.2, 0.1, 0.15, 0.1, 0.05)
}

const fn default_ability_duration() -> f64 {
    10.0
}

const fn default_ability_cooldown() -> f64 {
    20.0
}

const fn default_base_stats() -> StatProfile {
    StatProfile::splat(5.0)
}

const fn default_base_move_speed() -> f64 {
    3.5
}

const fn default_base_difficulty() -> f64 {
    5.0
}

const fn default_recommended_agents() -> u32 {
    1
}

const fn default_min_duration() -> f64 {
    10.0
}

const fn default_max_duration() -> f64 {
    30.0
}
