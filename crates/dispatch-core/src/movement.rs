//! The movement collaborator seam.
//!
//! Pathfinding lives outside the engine. The engine only ever asks where
//! an agent is relative to its target and tells it where to go next.

use std::collections::{BTreeMap, BTreeSet};

use dispatch_types::{AgentId, Position};

/// Movement as seen by the dispatch engine.
pub trait MovementSource: Send {
    /// Whether the agent has reached its current destination.
    fn is_at_destination(&self, agent: AgentId) -> bool;

    /// Send the agent toward `destination` at `speed` units per second.
    fn set_destination(&mut self, agent: AgentId, destination: Position, speed: f64);

    /// Distance from the agent to `target`.
    fn distance_to(&self, agent: AgentId, target: Position) -> f64;

    /// Whether the agent is standing still with nowhere to go.
    fn is_idle(&self, agent: AgentId) -> bool;

    /// Let `dt` seconds of movement happen. Hosts that move agents on
    /// their own schedule leave this as a no-op.
    fn advance(&mut self, _dt: f64) {}
}

/// Movement driven entirely by the caller.
///
/// Agents stay where they are placed. Arrival is reported only after
/// [`mark_arrived`](Self::mark_arrived) (or immediately when constructed
/// with [`instant`](Self::instant)), which makes arrival-driven missions
/// easy to script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedMovement {
    positions: BTreeMap<AgentId, Position>,
    destinations: BTreeMap<AgentId, Position>,
    arrived: BTreeSet<AgentId>,
    instant: bool,
}

impl ScriptedMovement {
    /// Agents arrive only when told to.
    pub fn new() -> Self {
        Self::default()
    }

    /// Agents arrive the moment a destination is set.
    pub fn instant() -> Self {
        Self {
            instant: true,
            ..Self::default()
        }
    }

    /// Place an agent.
    pub fn place(&mut self, agent: AgentId, position: Position) {
        self.positions.insert(agent, position);
    }

    /// Report the agent as arrived and move it onto its destination.
    pub fn mark_arrived(&mut self, agent: AgentId) {
        if let Some(destination) = self.destinations.get(&agent) {
            self.positions.insert(agent, *destination);
        }
        self.arrived.insert(agent);
    }

    /// The agent's current destination, if one was set.
    pub fn destination(&self, agent: AgentId) -> Option<Position> {
        self.destinations.get(&agent).copied()
    }

    /// The agent's position (origin if never placed).
    pub fn position(&self, agent: AgentId) -> Position {
        self.positions.get(&agent).copied().unwrap_or(Position::ORIGIN)
    }
}

impl MovementSource for ScriptedMovement {
    fn is_at_destination(&self, agent: AgentId) -> bool {
        self.arrived.contains(&agent)
    }

    fn set_destination(&mut self, agent: AgentId, destination: Position, _speed: f64) {
        self.destinations.insert(agent, destination);
        if self.instant {
            self.positions.insert(agent, destination);
            self.arrived.insert(agent);
        } else {
            self.arrived.remove(&agent);
        }
    }

    fn distance_to(&self, agent: AgentId, target: Position) -> f64 {
        self.position(agent).distance(&target)
    }

    fn is_idle(&self, agent: AgentId) -> bool {
        !self.destinations.contains_key(&agent) || self.arrived.contains(&agent)
    }
}
