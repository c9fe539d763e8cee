//! Notifications emitted by the resolution core.
//!
//! Events are fire-and-forget: the core hands them to whatever sink the
//! host injected and never reads them back. Each lifecycle notification
//! (call created, mission resolved, call expired) fires at most once per
//! mission instance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::MissionOutcome;
use crate::ids::{AbilityId, AgentId, CallDefinitionId, MissionId};
use crate::position::Position;

/// A single notification with its timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchEvent {
    /// Tick during which the event was produced.
    pub tick: u64,
    /// Simulation time in seconds at emission.
    pub sim_time: f64,
    /// Wall-clock time at emission.
    pub emitted_at: DateTime<Utc>,
    /// What happened.
    pub kind: EventKind,
}

impl DispatchEvent {
    /// Stamp `kind` with the current wall-clock time.
    pub fn now(tick: u64, sim_time: f64, kind: EventKind) -> Self {
        Self {
            tick,
            sim_time,
            emitted_at: Utc::now(),
            kind,
        }
    }

    /// The mission this event concerns, if any.
    pub fn mission_id(&self) -> Option<MissionId> {
        match &self.kind {
            EventKind::CallCreated { mission_id, .. }
            | EventKind::AgentsDispatched { mission_id, .. }
            | EventKind::MissionResolved { mission_id, .. }
            | EventKind::CallExpired { mission_id, .. } => Some(*mission_id),
            EventKind::AbilityActivated { .. } | EventKind::AbilityExpired { .. } => None,
        }
    }
}

/// The payload of a [`DispatchEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A new distress call appeared.
    CallCreated {
        /// Instance id.
        mission_id: MissionId,
        /// Which kind of call.
        call: CallDefinitionId,
        /// Where the call is.
        position: Position,
    },
    /// Agents were sent to a call.
    AgentsDispatched {
        /// Instance id.
        mission_id: MissionId,
        /// The team, in dispatch order.
        agents: Vec<AgentId>,
        /// Success probability with the team's stats at dispatch time.
        probability_estimate: f64,
    },
    /// A mission reached its terminal outcome.
    MissionResolved {
        /// Instance id.
        mission_id: MissionId,
        /// The rolled outcome.
        outcome: MissionOutcome,
        /// Success probability used for the roll.
        probability: f64,
        /// The roll itself, if one was drawn.
        roll: Option<f64>,
        /// Whether the outcome cleared the call.
        call_cleared: bool,
    },
    /// A call ran out of time, answered or not.
    CallExpired {
        /// Instance id.
        mission_id: MissionId,
        /// Which kind of call.
        call: CallDefinitionId,
    },
    /// An ability modifier became active (or was refreshed).
    AbilityActivated {
        /// The agent.
        agent_id: AgentId,
        /// The ability.
        ability: AbilityId,
        /// Absolute expiry time in seconds.
        expires_at: f64,
    },
    /// An ability modifier ran out.
    AbilityExpired {
        /// The agent.
        agent_id: AgentId,
        /// The ability.
        ability: AbilityId,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn resolved_event_serializes_with_type_tag() {
        let event = DispatchEvent::now(
            3,
            1.5,
            EventKind::MissionResolved {
                mission_id: MissionId::new(),
                outcome: MissionOutcome::PartialSuccess,
                probability: 0.3,
                roll: Some(0.1),
                call_cleared: true,
            },
        );
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"]["type"], "mission_resolved");
        assert_eq!(json["kind"]["outcome"], "partial_success");
        assert_eq!(json["tick"], 3);
    }

    #[test]
    fn ability_events_have_no_mission() {
        let event = DispatchEvent::now(
            0,
            0.0,
            EventKind::AbilityExpired {
                agent_id: AgentId::new(),
                ability: AbilityId::new("rush"),
            },
        );
        assert!(event.mission_id().is_none());
    }
}
