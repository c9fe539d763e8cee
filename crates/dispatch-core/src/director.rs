//! Director trait and stub implementations.
//!
//! Once per tick the engine shows a [`DispatchDirector`] the open calls and
//! the available pool, and applies the [`DispatchOrder`]s it returns. The
//! director is whatever decides what happens next: a player, an
//! autopilot, or a test script.

use std::collections::BTreeMap;

use dispatch_types::{
    AbilityId, AgentId, CallDefinitionId, MissionId, MissionPhase, Position, StatProfile,
};

use crate::clock::Moment;
use crate::dispatch::DispatchCoordinator;
use crate::movement::MovementSource;

/// Errors a director can report.
#[derive(Debug, thiserror::Error)]
pub enum DirectorError {
    /// An internal error in the director.
    #[error("director error: {message}")]
    Internal {
        /// Description of the error.
        message: String,
    },
}

/// An open call as seen by a director.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenCall {
    /// Instance id.
    pub mission_id: MissionId,
    /// Which kind of call.
    pub call: CallDefinitionId,
    /// Where it is.
    pub position: Position,
    /// `Created` (waiting for a team) or `Pending`.
    pub phase: MissionPhase,
    /// Suggested team size.
    pub recommended_agents: u32,
    /// Remaining fraction of the time limit.
    pub time_progress: f64,
}

/// A pooled agent as seen by a director.
#[derive(Debug, Clone, PartialEq)]
pub struct PooledAgent {
    /// Agent id.
    pub agent_id: AgentId,
    /// Whether the movement system reports the agent idle.
    pub idle: bool,
    /// Current stats.
    pub stats: StatProfile,
}

/// What a director sees each tick.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchSnapshot {
    /// Current tick.
    pub tick: u64,
    /// Current simulation time.
    pub now: f64,
    /// Open calls in creation order.
    pub open_calls: Vec<OpenCall>,
    /// Available agents in pool order.
    pub available: Vec<PooledAgent>,
    /// Every call definition id, in id order.
    pub call_types: Vec<CallDefinitionId>,
}

impl DispatchSnapshot {
    /// Capture the coordinator's current state.
    pub fn capture(
        coordinator: &DispatchCoordinator,
        at: Moment,
        movement: &dyn MovementSource,
    ) -> Self {
        let open_calls = coordinator
            .active_calls()
            .map(|mission| OpenCall {
                mission_id: mission.id(),
                call: mission.call().id.clone(),
                position: mission.position(),
                phase: mission.phase(),
                recommended_agents: mission.call().recommended_agents,
                time_progress: mission.time_progress(at.now),
            })
            .collect();
        let available = coordinator
            .available()
            .iter()
            .filter_map(|id| coordinator.roster().get(*id))
            .map(|agent| PooledAgent {
                agent_id: agent.id(),
                idle: movement.is_idle(agent.id()),
                stats: *agent.current_stats(),
            })
            .collect();
        let call_types = coordinator
            .call_definitions()
            .map(|call| call.id.clone())
            .collect();
        Self {
            tick: at.tick,
            now: at.now,
            open_calls,
            available,
            call_types,
        }
    }

    /// Open calls still waiting for a team.
    pub fn unanswered(&self) -> impl Iterator<Item = &OpenCall> {
        self.open_calls
            .iter()
            .filter(|call| call.phase == MissionPhase::Created)
    }
}

/// An instruction from a director.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOrder {
    /// Open a new call.
    CreateCall {
        /// Which kind of call.
        call: CallDefinitionId,
        /// Where.
        position: Position,
    },
    /// Send a team to an open call.
    Dispatch {
        /// The call.
        mission_id: MissionId,
        /// The team.
        agents: Vec<AgentId>,
    },
    /// Manually activate an agent's ability.
    ActivateAbility {
        /// The agent.
        agent_id: AgentId,
        /// The ability.
        ability: AbilityId,
    },
}

/// A source of dispatch decisions.
pub trait DispatchDirector: Send {
    /// Decide what to do this tick.
    ///
    /// # Errors
    ///
    /// Returns [`DirectorError`] if the director fails entirely. Orders
    /// that turn out to be invalid are not errors; the engine rejects them
    /// one by one.
    fn plan(&mut self, snapshot: &DispatchSnapshot) -> Result<Vec<DispatchOrder>, DirectorError>;
}

/// A director that never does anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubDirector;

impl StubDirector {
    /// Create a new stub director.
    pub const fn new() -> Self {
        Self
    }
}

impl DispatchDirector for StubDirector {
    fn plan(&mut self, _snapshot: &DispatchSnapshot) -> Result<Vec<DispatchOrder>, DirectorError> {
        Ok(Vec::new())
    }
}

/// A director that replays orders keyed by tick.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDirector {
    script: BTreeMap<u64, Vec<DispatchOrder>>,
}

impl ScriptedDirector {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an order for a tick.
    #[must_use]
    pub fn at_tick(mut self, tick: u64, order: DispatchOrder) -> Self {
        self.script.entry(tick).or_default().push(order);
        self
    }
}

impl DispatchDirector for ScriptedDirector {
    fn plan(&mut self, snapshot: &DispatchSnapshot) -> Result<Vec<DispatchOrder>, DirectorError> {
        Ok(self.script.remove(&snapshot.tick).unwrap_or_default())
    }
}
