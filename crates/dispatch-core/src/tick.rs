//! Tick cycle: the single scheduling loop that drives every state change.
//!
//! Each tick runs through these phases in order:
//!
//! 1. **Wake** -- advance the clock, let movement catch up, expire ability
//!    modifiers, and expire calls whose time limit passed.
//!
//! 2. **Mission tick** -- fire `mission_tick` hooks for agents on pending
//!    missions.
//!
//! 3. **Resolution** -- resolve every open mission that is due (resolve
//!    time passed, or the whole team arrived), freeing its agents.
//!
//! 4. **Direction** -- show the [`DispatchDirector`] a snapshot and apply
//!    its orders. Invalid orders are rejected individually and counted.
//!
//! Only the tick loop mutates missions, so no mission can be resolved
//! twice concurrently. Given the same configuration, director, and random
//! source, a run is fully reproducible.

use std::sync::Arc;

use dispatch_agents::{AbilityCatalog, AgentError, AgentRoster};
use dispatch_types::MissionId;
use tracing::{debug, info, warn};

use crate::clock::{ClockError, Moment, SimClock};
use crate::config::DispatchConfig;
use crate::director::{DirectorError, DispatchDirector, DispatchOrder, DispatchSnapshot};
use crate::dispatch::{DispatchCoordinator, DispatchError, ResolveStatus};
use crate::resolution::{Resolution, ResolutionEngine};
use crate::services::Services;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The director failed.
    #[error("director error: {source}")]
    Director {
        /// The underlying director error.
        #[from]
        source: DirectorError,
    },

    /// A coordinator operation the tick itself issued failed.
    #[error("dispatch error: {source}")]
    Dispatch {
        /// The underlying dispatch error.
        #[from]
        source: DispatchError,
    },
}

/// Errors that can occur while building the initial state.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The clock configuration is invalid.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// An ability or agent definition is invalid.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Default)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Simulation time at this tick.
    pub sim_time: f64,
    /// Calls opened this tick.
    pub calls_created: Vec<MissionId>,
    /// Missions that received a team this tick.
    pub dispatched: Vec<MissionId>,
    /// Missions resolved this tick.
    pub resolutions: Vec<Resolution>,
    /// Calls whose time limit ran out this tick.
    pub expired_calls: Vec<MissionId>,
    /// Ability modifiers that ran out this tick.
    pub abilities_expired: usize,
    /// Director orders that were rejected.
    pub rejected_orders: usize,
    /// Open calls at the end of the tick.
    pub open_calls: usize,
    /// Pooled agents at the end of the tick.
    pub available_agents: usize,
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug)]
pub struct SimulationState {
    /// The simulation clock.
    pub clock: SimClock,
    /// Missions, agents, and the available pool.
    pub coordinator: DispatchCoordinator,
}

impl SimulationState {
    /// Build the initial state from configuration: catalog every ability,
    /// spawn one agent per agent definition, and pool them all.
    pub fn from_config(config: &DispatchConfig) -> Result<Self, SetupError> {
        let clock = SimClock::new(config.world.seconds_per_tick)?;
        let catalog = AbilityCatalog::from_definitions(config.abilities.iter().cloned())?;
        let mut roster = AgentRoster::new(catalog);
        for definition in &config.agents {
            roster.spawn(Arc::new(definition.clone()))?;
        }
        let mut coordinator = DispatchCoordinator::new(
            roster,
            ResolutionEngine::new(config.scoring.clone()),
            config.calls.iter().cloned(),
            config.resolution.trigger,
            config.resolution.base_location,
        )
        .with_retention(config.resolution.retained_missions);
        let pooled = coordinator.fill_pool_from_roster();
        info!(
            agents = pooled,
            calls = config.calls.len(),
            abilities = config.abilities.len(),
            trigger = ?config.resolution.trigger,
            "Simulation state assembled"
        );
        Ok(Self { clock, coordinator })
    }
}

/// Execute one complete tick of the simulation.
///
/// # Phases
///
/// 1. Wake
/// 2. Mission tick
/// 3. Resolution
/// 4. Direction (via the provided `DispatchDirector`)
pub fn run_tick(
    state: &mut SimulationState,
    director: &mut dyn DispatchDirector,
    services: &mut Services<'_>,
) -> Result<TickSummary, TickError> {
    // --- Phase 1: Wake ---
    state.clock.advance()?;
    let at = state.clock.moment();
    let dt = state.clock.seconds_per_tick();
    let mut summary = TickSummary {
        tick: at.tick,
        sim_time: at.now,
        ..TickSummary::default()
    };

    services.movement.advance(dt);
    summary.abilities_expired = state.coordinator.expire_abilities(at, &mut *services.events);
    summary.expired_calls = state.coordinator.expire_calls(at, &mut *services.events);
    debug!(
        tick = at.tick,
        abilities_expired = summary.abilities_expired,
        calls_expired = summary.expired_calls.len(),
        "Wake phase complete"
    );

    // --- Phase 2: Mission tick ---
    state
        .coordinator
        .tick_missions(at, dt, &mut *services.events);

    // --- Phase 3: Resolution ---
    for mission_id in state.coordinator.due_missions(at.now, &*services.movement) {
        if let ResolveStatus::Resolved(resolution) =
            state.coordinator.resolve_mission(mission_id, at, services)?
        {
            summary.resolutions.push(resolution);
        }
    }

    // --- Phase 4: Direction ---
    let snapshot = DispatchSnapshot::capture(&state.coordinator, at, &*services.movement);
    let orders = director.plan(&snapshot)?;
    for order in orders {
        if let Err(err) = apply_order(state, order, at, services, &mut summary) {
            debug!(tick = at.tick, error = %err, "Order rejected");
            summary.rejected_orders = summary.rejected_orders.saturating_add(1);
        }
    }

    summary.open_calls = state.coordinator.active_count();
    summary.available_agents = state.coordinator.available().len();

    if summary.resolutions.is_empty() && summary.calls_created.is_empty() {
        debug!(tick = at.tick, open_calls = summary.open_calls, "Tick complete");
    } else {
        info!(
            tick = at.tick,
            sim_time = at.now,
            created = summary.calls_created.len(),
            dispatched = summary.dispatched.len(),
            resolved = summary.resolutions.len(),
            open_calls = summary.open_calls,
            available_agents = summary.available_agents,
            "Tick complete"
        );
    }
    if summary.rejected_orders > 0 {
        warn!(tick = at.tick, rejected = summary.rejected_orders, "Director orders rejected");
    }

    Ok(summary)
}

/// Apply one director order.
fn apply_order(
    state: &mut SimulationState,
    order: DispatchOrder,
    at: Moment,
    services: &mut Services<'_>,
    summary: &mut TickSummary,
) -> Result<(), DispatchError> {
    match order {
        DispatchOrder::CreateCall { call, position } => {
            let id = state
                .coordinator
                .create_call(&call, position, at, services)?;
            summary.calls_created.push(id);
        }
        DispatchOrder::Dispatch { mission_id, agents } => {
            state
                .coordinator
                .dispatch(mission_id, &agents, at, services)?;
            summary.dispatched.push(mission_id);
        }
        DispatchOrder::ActivateAbility { agent_id, ability } => {
            state
                .coordinator
                .activate_ability(agent_id, &ability, at, &mut *services.events)?;
        }
    }
    Ok(())
}
