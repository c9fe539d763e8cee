//! Straight-line movement for the headless engine.
//!
//! Agents travel directly toward their destination at the speed they were
//! given when it was set, covering `speed * dt` each tick. There is no
//! terrain and no collision; this stands in for a pathfinding host.

use std::collections::BTreeMap;

use dispatch_core::movement::MovementSource;
use dispatch_types::{AgentId, Position};

/// Distance below which an agent counts as arrived.
const ARRIVAL_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct Leg {
    destination: Position,
    speed: f64,
}

/// Moves agents in straight lines.
#[derive(Debug, Clone, Default)]
pub struct LinearMovement {
    positions: BTreeMap<AgentId, Position>,
    legs: BTreeMap<AgentId, Leg>,
    home: Position,
}

impl LinearMovement {
    /// Unplaced agents start at `home`.
    pub fn new(home: Position) -> Self {
        Self {
            home,
            ..Self::default()
        }
    }

    /// Place an agent.
    pub fn place(&mut self, agent: AgentId, position: Position) {
        self.positions.insert(agent, position);
    }

    /// The agent's current position.
    pub fn position(&self, agent: AgentId) -> Position {
        self.positions.get(&agent).copied().unwrap_or(self.home)
    }

    /// Number of agents still travelling.
    pub fn travelling(&self) -> usize {
        self.legs.len()
    }
}

impl MovementSource for LinearMovement {
    fn is_at_destination(&self, agent: AgentId) -> bool {
        !self.legs.contains_key(&agent)
    }

    fn set_destination(&mut self, agent: AgentId, destination: Position, speed: f64) {
        if self.position(agent).distance(&destination) <= ARRIVAL_TOLERANCE {
            self.legs.remove(&agent);
            return;
        }
        self.legs.insert(
            agent,
            Leg {
                destination,
                speed: speed.max(0.0),
            },
        );
    }

    fn distance_to(&self, agent: AgentId, target: Position) -> f64 {
        self.position(agent).distance(&target)
    }

    fn is_idle(&self, agent: AgentId) -> bool {
        !self.legs.contains_key(&agent)
    }

    fn advance(&mut self, dt: f64) {
        let mut arrived = Vec::new();
        for (agent, leg) in &self.legs {
            let from = self.positions.get(agent).copied().unwrap_or(self.home);
            let next = from.step_toward(&leg.destination, leg.speed * dt.max(0.0));
            self.positions.insert(*agent, next);
            if next.distance(&leg.destination) <= ARRIVAL_TOLERANCE {
                arrived.push(*agent);
            }
        }
        for agent in arrived {
            self.legs.remove(&agent);
        }
    }
}
