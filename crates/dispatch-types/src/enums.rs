//! Enumeration types shared across the dispatch workspace.

use serde::{Deserialize, Serialize};

/// Result of resolving a mission.
///
/// `Pending` is the only non-terminal value; every other variant is set
/// exactly once and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionOutcome {
    /// Not yet resolved.
    Pending,
    /// High-probability mission that won its roll.
    Success,
    /// Either a lucky low-probability win or an unlucky high-probability loss.
    PartialSuccess,
    /// Low-probability mission that lost its roll.
    Failure,
}

impl MissionOutcome {
    /// Whether the outcome is final.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether the outcome clears the underlying call.
    pub const fn clears_call(self) -> bool {
        matches!(self, Self::Success | Self::PartialSuccess)
    }
}

impl core::fmt::Display for MissionOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::PartialSuccess => "partial_success",
            Self::Failure => "failure",
        };
        f.write_str(name)
    }
}

/// Lifecycle phase of a call instance and its mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionPhase {
    /// The call exists but no agents have been dispatched yet.
    Created,
    /// Agents are assigned; waiting on the timer or on arrival.
    Pending,
    /// The outcome has been rolled. Terminal.
    Resolved,
    /// The call ran out of time before anyone was dispatched. Terminal.
    Expired,
}

impl MissionPhase {
    /// Whether the phase is final.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Expired)
    }
}

/// What causes a pending mission to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTrigger {
    /// Resolve once the scheduled resolve time has passed.
    #[default]
    Time,
    /// Resolve once every assigned agent reports arrival.
    Arrival,
}

/// When an ability fires on its own during a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityTrigger {
    /// Only activated explicitly by the host.
    #[default]
    Manual,
    /// Activated when the agent is dispatched.
    MissionStart,
    /// Activated (or refreshed) on every tick while on a mission.
    MissionTick,
    /// Activated just before the mission outcome is rolled.
    BeforeResolve,
}
