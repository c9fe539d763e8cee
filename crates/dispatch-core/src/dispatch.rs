//! The dispatch coordinator.
//!
//! The coordinator owns every call instance, the active set, and the pool
//! of available agents. It is the only code that moves an agent between
//! the pool and a mission, and it does so in one step: an agent is never
//! in the pool while it has a current mission.
//!
//! Invalid requests (empty teams, unknown or closed missions, agents that
//! are not available) are rejected with a [`DispatchError`] and a warning.
//! They never change state and are never fatal to the scheduler.
//!
//! Finished missions stay queryable until more than the retention limit
//! have finished after them; the resolution history has the same bound.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use dispatch_agents::{Activation, AgentError, AgentRoster, HookContext, ModifierChange};
use dispatch_types::{
    AbilityId, AgentId, CallDefinition, CallDefinitionId, DispatchEvent, EventKind, MissionId,
    MissionOutcome, MissionPhase, Position, ResolutionTrigger,
};
use tracing::{debug, info, warn};

use crate::clock::Moment;
use crate::events::EventSink;
use crate::mission::{Mission, ResolveAt, duration_bounds};
use crate::movement::MovementSource;
use crate::resolution::{Resolution, ResolutionEngine};
use crate::services::Services;

/// Finished missions kept when no retention limit is configured.
pub const DEFAULT_RETAINED_MISSIONS: usize = 256;

/// Errors returned by coordinator operations.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// A dispatch named no agents.
    #[error("dispatch to mission {mission_id} named no agents")]
    EmptyTeam {
        /// The target mission.
        mission_id: MissionId,
    },

    /// No mission with this id exists.
    #[error("mission {0} not found")]
    UnknownMission(MissionId),

    /// No call definition with this id exists.
    #[error("call definition {0} not found")]
    UnknownCall(CallDefinitionId),

    /// The mission already has a team or has ended.
    #[error("mission {mission_id} is {phase:?} and cannot take a team")]
    MissionClosed {
        /// The target mission.
        mission_id: MissionId,
        /// Its current phase.
        phase: MissionPhase,
    },

    /// An agent is not in the available pool.
    #[error("agent {0} is not available")]
    AgentUnavailable(AgentId),

    /// An agent-level operation failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// What happened when a mission was asked to resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveStatus {
    /// The mission resolved just now.
    Resolved(Resolution),
    /// The mission had already ended; nothing was done.
    AlreadyResolved(MissionOutcome),
}

impl ResolveStatus {
    /// The mission's outcome either way.
    pub const fn outcome(&self) -> MissionOutcome {
        match self {
            Self::Resolved(resolution) => resolution.outcome,
            Self::AlreadyResolved(outcome) => *outcome,
        }
    }
}

/// Owner of missions and the available pool.
#[derive(Debug)]
pub struct DispatchCoordinator {
    roster: AgentRoster,
    engine: ResolutionEngine,
    calls: BTreeMap<CallDefinitionId, Arc<CallDefinition>>,
    missions: BTreeMap<MissionId, Mission>,
    /// Open missions in creation order.
    active: Vec<MissionId>,
    /// Available agents in pool order.
    pool: Vec<AgentId>,
    trigger: ResolutionTrigger,
    base_location: Position,
    /// Finished missions, oldest first, awaiting eviction.
    finished: VecDeque<MissionId>,
    history: VecDeque<Resolution>,
    retained: usize,
}

impl DispatchCoordinator {
    /// Create a coordinator with an empty pool.
    ///
    /// Later call definitions replace earlier ones with the same id.
    pub fn new(
        roster: AgentRoster,
        engine: ResolutionEngine,
        calls: impl IntoIterator<Item = CallDefinition>,
        trigger: ResolutionTrigger,
        base_location: Position,
    ) -> Self {
        let mut table = BTreeMap::new();
        for call in calls {
            let id = call.id.clone();
            if table.insert(id.clone(), Arc::new(call)).is_some() {
                warn!(call = %id, "Duplicate call definition replaced");
            }
        }
        Self {
            roster,
            engine,
            calls: table,
            missions: BTreeMap::new(),
            active: Vec::new(),
            pool: Vec::new(),
            trigger,
            base_location,
            finished: VecDeque::new(),
            history: VecDeque::new(),
            retained: DEFAULT_RETAINED_MISSIONS,
        }
    }

    /// Set how many finished missions and resolutions are kept.
    #[must_use]
    pub const fn with_retention(mut self, retained: usize) -> Self {
        self.retained = retained;
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The agent roster.
    pub const fn roster(&self) -> &AgentRoster {
        &self.roster
    }

    /// The agent roster, mutably.
    pub const fn roster_mut(&mut self) -> &mut AgentRoster {
        &mut self.roster
    }

    /// The resolution engine.
    pub const fn engine(&self) -> &ResolutionEngine {
        &self.engine
    }

    /// Resolution trigger for new calls.
    pub const fn trigger(&self) -> ResolutionTrigger {
        self.trigger
    }

    /// Where agents return after a mission.
    pub const fn base_location(&self) -> Position {
        self.base_location
    }

    /// Look up a call definition.
    pub fn call_definition(&self, id: &CallDefinitionId) -> Option<&Arc<CallDefinition>> {
        self.calls.get(id)
    }

    /// All call definitions in id order.
    pub fn call_definitions(&self) -> impl Iterator<Item = &Arc<CallDefinition>> {
        self.calls.values()
    }

    /// Look up a mission, open or recently finished.
    pub fn mission(&self, id: MissionId) -> Option<&Mission> {
        self.missions.get(&id)
    }

    /// Open calls (neither resolved nor expired) in creation order.
    pub fn active_calls(&self) -> impl Iterator<Item = &Mission> {
        self.active.iter().filter_map(|id| self.missions.get(id))
    }

    /// Number of open calls.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Available agents in pool order.
    pub fn available(&self) -> &[AgentId] {
        &self.pool
    }

    /// Whether the agent is in the pool.
    pub fn is_available(&self, agent: AgentId) -> bool {
        self.pool.contains(&agent)
    }

    /// Recent resolutions, oldest first.
    pub const fn history(&self) -> &VecDeque<Resolution> {
        &self.history
    }

    /// Number of missions held, open and finished.
    pub fn mission_count(&self) -> usize {
        self.missions.len()
    }

    // -----------------------------------------------------------------------
    // Pool maintenance
    // -----------------------------------------------------------------------

    /// Add an agent to the pool.
    ///
    /// Returns `false` if the agent is unknown, on a mission, or already
    /// in the pool.
    pub fn add_available(&mut self, agent_id: AgentId) -> bool {
        let Some(agent) = self.roster.get(agent_id) else {
            return false;
        };
        if agent.is_assigned() || self.pool.contains(&agent_id) {
            return false;
        }
        self.pool.push(agent_id);
        true
    }

    /// Remove an agent from the pool. Returns whether it was there.
    pub fn remove_available(&mut self, agent_id: AgentId) -> bool {
        let before = self.pool.len();
        self.pool.retain(|id| *id != agent_id);
        self.pool.len() != before
    }

    /// Put every idle roster agent into the pool. Returns how many were
    /// added.
    pub fn fill_pool_from_roster(&mut self) -> usize {
        let ids: Vec<AgentId> = self.roster.iter().map(dispatch_agents::Agent::id).collect();
        ids.into_iter()
            .filter(|id| self.add_available(*id))
            .count()
    }

    /// First pooled agent the movement system reports idle.
    pub fn try_get_available(&self, movement: &dyn MovementSource) -> Option<AgentId> {
        self.pool
            .iter()
            .copied()
            .find(|agent| movement.is_idle(*agent))
    }

    // -----------------------------------------------------------------------
    // Call lifecycle
    // -----------------------------------------------------------------------

    /// Open a new call at `position`.
    ///
    /// Time-driven calls draw their resolve time now, uniformly within the
    /// definition's duration bounds. Arrival-driven calls wait for their
    /// team instead.
    pub fn create_call(
        &mut self,
        call: &CallDefinitionId,
        position: Position,
        at: Moment,
        services: &mut Services<'_>,
    ) -> Result<MissionId, DispatchError> {
        let definition = self
            .calls
            .get(call)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownCall(call.clone()))?;

        let resolve_at = match self.trigger {
            ResolutionTrigger::Time => {
                let (min, max) = duration_bounds(&definition);
                ResolveAt::At(at.now + services.random.range(min, max))
            }
            ResolutionTrigger::Arrival => ResolveAt::OnArrival,
        };

        let mission = Mission::new(MissionId::new(), definition, position, at.now, resolve_at);
        let mission_id = mission.id();
        info!(
            mission_id = %mission_id,
            call = %call,
            x = position.x,
            y = position.y,
            resolve_at = ?resolve_at,
            expires_at = ?mission.expires_at(),
            "Call created"
        );
        self.missions.insert(mission_id, mission);
        self.active.push(mission_id);

        services.events.emit(DispatchEvent::now(
            at.tick,
            at.now,
            EventKind::CallCreated {
                mission_id,
                call: call.clone(),
                position,
            },
        ));
        Ok(mission_id)
    }

    /// Send a team to an open call.
    ///
    /// Duplicate ids are ignored. The dispatch is all-or-nothing: if any
    /// named agent is not in the pool, nothing changes. On success the
    /// team leaves the pool, every member records the mission, their
    /// `mission_start` hooks fire, they are sent toward the call, and a
    /// time-driven resolve time is pushed back (never forward) to cover
    /// the slowest member's estimated travel time.
    ///
    /// Returns the success probability estimated with the team's stats
    /// right after dispatch.
    pub fn dispatch(
        &mut self,
        mission_id: MissionId,
        agents: &[AgentId],
        at: Moment,
        services: &mut Services<'_>,
    ) -> Result<f64, DispatchError> {
        if agents.is_empty() {
            warn!(mission_id = %mission_id, "Dispatch rejected: no agents");
            return Err(DispatchError::EmptyTeam { mission_id });
        }
        let Some(mission) = self.missions.get(&mission_id) else {
            warn!(mission_id = %mission_id, "Dispatch rejected: unknown mission");
            return Err(DispatchError::UnknownMission(mission_id));
        };
        if !mission.accepts_dispatch() {
            warn!(mission_id = %mission_id, phase = ?mission.phase(), "Dispatch rejected: mission closed");
            return Err(DispatchError::MissionClosed {
                mission_id,
                phase: mission.phase(),
            });
        }
        let position = mission.position();

        let mut team: Vec<AgentId> = Vec::with_capacity(agents.len());
        for agent in agents {
            if !team.contains(agent) {
                team.push(*agent);
            }
        }
        if let Some(missing) = team
            .iter()
            .copied()
            .find(|id| !self.pool.contains(id) || !self.roster.contains(*id))
        {
            warn!(mission_id = %mission_id, agent_id = %missing, "Dispatch rejected: agent unavailable");
            return Err(DispatchError::AgentUnavailable(missing));
        }

        self.pool.retain(|id| !team.contains(id));

        let ctx = HookContext {
            mission_id,
            tick: at.tick,
            now: at.now,
        };
        let mut slowest: f64 = 0.0;
        for agent_id in &team {
            if let Some(agent) = self.roster.get_mut(*agent_id) {
                agent.assign_mission(mission_id);
                agent.run_mission_start(&ctx);
                let distance = services.movement.distance_to(*agent_id, position);
                slowest = slowest.max(agent.estimated_travel_time(distance));
                services
                    .movement
                    .set_destination(*agent_id, position, agent.move_speed());
            }
        }

        let mission = self
            .missions
            .get_mut(&mission_id)
            .ok_or(DispatchError::UnknownMission(mission_id))?;
        mission.assign(&team);
        let extended = mission.extend_resolve_at(at.now + slowest);
        let estimate = self.engine.estimate(mission, &self.roster);
        mission.set_probability_estimate(estimate);

        info!(
            mission_id = %mission_id,
            call = %mission.call().id,
            team = team.len(),
            probability_estimate = estimate,
            travel_estimate = slowest,
            resolve_extended = extended,
            "Agents dispatched"
        );

        self.publish_modifier_changes(at, services.events);
        services.events.emit(DispatchEvent::now(
            at.tick,
            at.now,
            EventKind::AgentsDispatched {
                mission_id,
                agents: team,
                probability_estimate: estimate,
            },
        ));
        Ok(estimate)
    }

    /// Return a mission's team to the pool.
    ///
    /// Each member still attached to this mission is detached, reset to
    /// its base profile, sent back to base, and re-added to the pool.
    /// Members already back in the pool or since sent elsewhere are left
    /// alone, so calling this twice is harmless. Returns the number of
    /// agents re-added.
    pub fn return_agents(
        &mut self,
        mission_id: MissionId,
        at: Moment,
        services: &mut Services<'_>,
    ) -> Result<usize, DispatchError> {
        let team = self
            .missions
            .get(&mission_id)
            .ok_or(DispatchError::UnknownMission(mission_id))?
            .agents()
            .to_vec();

        let mut returned: usize = 0;
        for agent_id in team {
            let Some(agent) = self.roster.get_mut(agent_id) else {
                continue;
            };
            let attached = agent.current_mission() == Some(mission_id);
            let stranded = !agent.is_assigned() && !self.pool.contains(&agent_id);
            if !attached && !stranded {
                continue;
            }
            agent.clear_mission();
            agent.reset_to_base();
            services
                .movement
                .set_destination(agent_id, self.base_location, agent.move_speed());
            self.pool.push(agent_id);
            returned = returned.saturating_add(1);
            debug!(mission_id = %mission_id, agent_id = %agent_id, "Agent returned to pool");
        }

        self.publish_modifier_changes(at, services.events);
        Ok(returned)
    }

    /// Resolve a mission now.
    ///
    /// The first call rolls the outcome, records it, emits exactly one
    /// resolution notification, and returns the team. Later calls report
    /// the stored outcome and do nothing else, until the mission has been
    /// evicted, after which it is unknown.
    pub fn resolve_mission(
        &mut self,
        mission_id: MissionId,
        at: Moment,
        services: &mut Services<'_>,
    ) -> Result<ResolveStatus, DispatchError> {
        let mission = self
            .missions
            .get_mut(&mission_id)
            .ok_or(DispatchError::UnknownMission(mission_id))?;
        if !mission.is_open() {
            warn!(mission_id = %mission_id, outcome = %mission.outcome(), "Mission already resolved");
            return Ok(ResolveStatus::AlreadyResolved(mission.outcome()));
        }
        let Some(resolution) =
            self.engine
                .resolve(mission, &mut self.roster, &mut *services.random, at)
        else {
            return Ok(ResolveStatus::AlreadyResolved(mission.outcome()));
        };

        self.active.retain(|id| *id != mission_id);
        self.publish_modifier_changes(at, services.events);
        services.events.emit(DispatchEvent::now(
            at.tick,
            at.now,
            EventKind::MissionResolved {
                mission_id,
                outcome: resolution.outcome,
                probability: resolution.probability,
                roll: resolution.roll,
                call_cleared: resolution.call_cleared,
            },
        ));
        self.history.push_back(resolution.clone());
        self.return_agents(mission_id, at, services)?;
        self.retire(mission_id);
        Ok(ResolveStatus::Resolved(resolution))
    }

    /// Expire every live call whose time limit has passed.
    ///
    /// Each call expires once. An unanswered call closes. A dispatched
    /// call stays active, its team keeps going, and it resolves later
    /// without clearing the call. Returns every call that expired.
    pub fn expire_calls(&mut self, at: Moment, events: &mut dyn EventSink) -> Vec<MissionId> {
        let mut expired = Vec::new();
        let mut closed = Vec::new();
        for id in &self.active {
            let Some(mission) = self.missions.get_mut(id) else {
                continue;
            };
            if mission.is_expired_at(at.now) && mission.mark_expired(at.now) {
                warn!(
                    mission_id = %id,
                    call = %mission.call().id,
                    tick = at.tick,
                    phase = ?mission.phase(),
                    "Call expired"
                );
                events.emit(DispatchEvent::now(
                    at.tick,
                    at.now,
                    EventKind::CallExpired {
                        mission_id: *id,
                        call: mission.call().id.clone(),
                    },
                ));
                expired.push(*id);
                if !mission.is_open() {
                    closed.push(*id);
                }
            }
        }
        self.active.retain(|id| !closed.contains(id));
        for id in closed {
            self.retire(id);
        }
        expired
    }

    /// Queue a finished mission for eviction and drop the oldest finished
    /// missions and resolutions beyond the retention limit.
    fn retire(&mut self, mission_id: MissionId) {
        self.finished.push_back(mission_id);
        while self.finished.len() > self.retained {
            if let Some(oldest) = self.finished.pop_front() {
                self.missions.remove(&oldest);
                debug!(mission_id = %oldest, "Finished mission evicted");
            }
        }
        while self.history.len() > self.retained {
            self.history.pop_front();
        }
    }

    /// Open missions that should resolve at `now`, in creation order.
    pub fn due_missions(&self, now: f64, movement: &dyn MovementSource) -> Vec<MissionId> {
        self.active_calls()
            .filter(|mission| ResolutionEngine::is_due(mission, now, movement))
            .map(Mission::id)
            .collect()
    }

    /// Fire `mission_tick` hooks for every agent on a pending mission.
    pub fn tick_missions(&mut self, at: Moment, dt: f64, events: &mut dyn EventSink) {
        for id in &self.active {
            let Some(mission) = self.missions.get(id) else {
                continue;
            };
            if mission.phase() != MissionPhase::Pending {
                continue;
            }
            let ctx = HookContext {
                mission_id: *id,
                tick: at.tick,
                now: at.now,
            };
            for agent_id in mission.agents() {
                if let Some(agent) = self.roster.get_mut(*agent_id) {
                    agent.run_mission_tick(&ctx, dt);
                }
            }
        }
        self.publish_modifier_changes(at, events);
    }

    // -----------------------------------------------------------------------
    // Abilities
    // -----------------------------------------------------------------------

    /// Manually activate one of an agent's abilities.
    pub fn activate_ability(
        &mut self,
        agent_id: AgentId,
        ability: &AbilityId,
        at: Moment,
        events: &mut dyn EventSink,
    ) -> Result<Activation, DispatchError> {
        let activation = self.roster.activate_ability(agent_id, ability, at.now)?;
        self.publish_modifier_changes(at, events);
        Ok(activation)
    }

    /// Expire due ability modifiers on every agent. Returns how many
    /// expired.
    pub fn expire_abilities(&mut self, at: Moment, events: &mut dyn EventSink) -> usize {
        let expired = self.roster.expire_abilities(at.now).len();
        self.publish_modifier_changes(at, events);
        expired
    }

    /// Turn pending agent modifier changes into notifications.
    fn publish_modifier_changes(&mut self, at: Moment, events: &mut dyn EventSink) {
        for (agent_id, change) in self.roster.take_changes() {
            let kind = match change {
                ModifierChange::Activated {
                    ability,
                    expires_at,
                } => EventKind::AbilityActivated {
                    agent_id,
                    ability,
                    expires_at,
                },
                ModifierChange::Expired { ability } => {
                    EventKind::AbilityExpired { agent_id, ability }
                }
            };
            events.emit(DispatchEvent::now(at.tick, at.now, kind));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use dispatch_agents::AbilityCatalog;
    use dispatch_types::{AgentDefinition, AgentDefinitionId, CallRequirement, StatProfile};

    use super::*;
    use crate::events::EventLog;
    use crate::movement::ScriptedMovement;
    use crate::random::SequenceSource;

    struct Harness {
        coordinator: DispatchCoordinator,
        movement: ScriptedMovement,
        random: SequenceSource,
        events: EventLog,
        agents: Vec<AgentId>,
    }

    impl Harness {
        fn new(trigger: ResolutionTrigger, agent_count: usize) -> Self {
            let mut roster = AgentRoster::new(AbilityCatalog::new());
            let definition = Arc::new(AgentDefinition {
                id: AgentDefinitionId::new("medic"),
                display_name: String::from("Medic"),
                base_stats: StatProfile::splat(5.0),
                abilities: Vec::new(),
                base_move_speed: 3.5,
            });
            let agents: Vec<AgentId> = (0..agent_count)
                .map(|_| roster.spawn(Arc::clone(&definition)).unwrap())
                .collect();
            let call = CallDefinition {
                id: CallDefinitionId::new("fall"),
                title: String::from("Fall"),
                description: String::new(),
                requirement: CallRequirement::default(),
                base_difficulty: 2.0,
                recommended_agents: 1,
                min_duration_seconds: 10.0,
                max_duration_seconds: 20.0,
                time_limit_seconds: Some(60.0),
            };
            let mut coordinator = DispatchCoordinator::new(
                roster,
                ResolutionEngine::default(),
                [call],
                trigger,
                Position::ORIGIN,
            );
            coordinator.fill_pool_from_roster();
            let mut movement = ScriptedMovement::new();
            for id in &agents {
                movement.place(*id, Position::ORIGIN);
            }
            Self {
                coordinator,
                movement,
                random: SequenceSource::new([0.5]),
                events: EventLog::new(),
                agents,
            }
        }

        fn services(&mut self) -> (&mut DispatchCoordinator, Services<'_>) {
            (
                &mut self.coordinator,
                Services::new(&mut self.movement, &mut self.random, &mut self.events),
            )
        }

        fn create(&mut self, position: Position, at: Moment) -> MissionId {
            let (coordinator, mut services) = self.services();
            coordinator
                .create_call(&CallDefinitionId::new("fall"), position, at, &mut services)
                .unwrap()
        }
    }

    #[test]
    fn time_driven_calls_draw_resolve_time_in_bounds() {
        let mut h = Harness::new(ResolutionTrigger::Time, 1);
        let id = h.create(Position::ORIGIN, Moment::new(0, 100.0));
        let mission = h.coordinator.mission(id).unwrap();
        assert_eq!(mission.resolve_at(), ResolveAt::At(115.0));
        assert_eq!(h.coordinator.active_count(), 1);
        assert_eq!(h.events.len(), 1);
    }

    #[test]
    fn unknown_call_is_rejected() {
        let mut h = Harness::new(ResolutionTrigger::Time, 1);
        let (coordinator, mut services) = h.services();
        let result = coordinator.create_call(
            &CallDefinitionId::new("meteor"),
            Position::ORIGIN,
            Moment::new(0, 0.0),
            &mut services,
        );
        assert!(matches!(result, Err(DispatchError::UnknownCall(_))));
        assert_eq!(h.coordinator.active_count(), 0);
    }

    #[test]
    fn empty_dispatch_changes_nothing() {
        let mut h = Harness::new(ResolutionTrigger::Arrival, 2);
        let id = h.create(Position::ORIGIN, Moment::new(0, 0.0));
        let (coordinator, mut services) = h.services();
        let result = coordinator.dispatch(id, &[], Moment::new(0, 0.0), &mut services);
        assert!(matches!(result, Err(DispatchError::EmptyTeam { .. })));
        let mission = h.coordinator.mission(id).unwrap();
        assert_eq!(mission.phase(), MissionPhase::Created);
        assert_eq!(h.coordinator.available().len(), 2);
    }

    #[test]
    fn dispatch_is_all_or_nothing() {
        let mut h = Harness::new(ResolutionTrigger::Arrival, 2);
        let id = h.create(Position::ORIGIN, Moment::new(0, 0.0));
        let first = h.agents[0];
        let stranger = AgentId::new();
        let (coordinator, mut services) = h.services();
        let result = coordinator.dispatch(id, &[first, stranger], Moment::new(0, 0.0), &mut services);
        assert!(matches!(result, Err(DispatchError::AgentUnavailable(a)) if a == stranger));
        assert!(h.coordinator.is_available(first));
        assert!(!h.coordinator.roster().get(first).unwrap().is_assigned());
    }

    #[test]
    fn dispatch_moves_agents_out_of_the_pool_atomically() {
        let mut h = Harness::new(ResolutionTrigger::Arrival, 3);
        let id = h.create(Position::new(5.0, 0.0, 0.0), Moment::new(0, 0.0));
        let team = [h.agents[0], h.agents[1], h.agents[0]];
        let spare = h.agents[2];
        let (coordinator, mut services) = h.services();
        coordinator
            .dispatch(id, &team, Moment::new(0, 0.0), &mut services)
            .unwrap();

        let mission = h.coordinator.mission(id).unwrap();
        assert_eq!(mission.agents(), &[h.agents[0], h.agents[1]]);
        assert_eq!(mission.phase(), MissionPhase::Pending);
        assert!(mission.probability_estimate().is_some());
        for agent in &h.agents[..2] {
            assert!(!h.coordinator.is_available(*agent));
            assert_eq!(
                h.coordinator.roster().get(*agent).unwrap().current_mission(),
                Some(id)
            );
            assert_eq!(h.movement.destination(*agent), Some(Position::new(5.0, 0.0, 0.0)));
        }
        assert_eq!(h.coordinator.available(), &[spare]);

        let (coordinator, mut services) = h.services();
        let again = coordinator.dispatch(id, &[spare], Moment::new(0, 0.0), &mut services);
        assert!(matches!(again, Err(DispatchError::MissionClosed { .. })));
    }

    #[test]
    fn travel_time_only_extends_resolve_time() {
        let mut h = Harness::new(ResolutionTrigger::Time, 1);
        // Draw 0.5 in [10, 20) -> resolve at 15. Mobility 5 -> 600 / 6 = 100s travel.
        let far = h.create(Position::new(600.0, 0.0, 0.0), Moment::new(0, 0.0));
        let agent = h.agents[0];
        let (coordinator, mut services) = h.services();
        coordinator
            .dispatch(far, &[agent], Moment::new(1, 1.0), &mut services)
            .unwrap();
        assert_eq!(h.coordinator.mission(far).unwrap().resolve_at(), ResolveAt::At(101.0));

        let mut h = Harness::new(ResolutionTrigger::Time, 1);
        let near = h.create(Position::new(6.0, 0.0, 0.0), Moment::new(0, 0.0));
        let agent = h.agents[0];
        let (coordinator, mut services) = h.services();
        coordinator
            .dispatch(near, &[agent], Moment::new(1, 1.0), &mut services)
            .unwrap();
        assert_eq!(h.coordinator.mission(near).unwrap().resolve_at(), ResolveAt::At(15.0));
    }

    #[test]
    fn return_agents_is_idempotent() {
        let mut h = Harness::new(ResolutionTrigger::Arrival, 2);
        let id = h.create(Position::ORIGIN, Moment::new(0, 0.0));
        let team = [h.agents[0], h.agents[1]];
        let (coordinator, mut services) = h.services();
        coordinator
            .dispatch(id, &team, Moment::new(0, 0.0), &mut services)
            .unwrap();
        assert_eq!(
            coordinator
                .return_agents(id, Moment::new(1, 1.0), &mut services)
                .unwrap(),
            2
        );
        assert_eq!(
            coordinator
                .return_agents(id, Moment::new(1, 1.0), &mut services)
                .unwrap(),
            0
        );
        assert_eq!(h.coordinator.available().len(), 2);
        assert!(h.coordinator.roster().iter().all(|a| !a.is_assigned()));
    }

    #[test]
    fn first_fit_skips_busy_agents() {
        let mut h = Harness::new(ResolutionTrigger::Arrival, 2);
        let first = h.agents[0];
        let second = h.agents[1];
        assert_eq!(h.coordinator.try_get_available(&h.movement), Some(first));

        h.movement.set_destination(first, Position::new(9.0, 0.0, 0.0), 1.0);
        assert_eq!(h.coordinator.try_get_available(&h.movement), Some(second));

        h.movement.set_destination(second, Position::new(9.0, 0.0, 0.0), 1.0);
        assert_eq!(h.coordinator.try_get_available(&h.movement), None);
    }

    #[test]
    fn pool_maintenance_respects_assignments() {
        let mut h = Harness::new(ResolutionTrigger::Arrival, 2);
        let agent = h.agents[0];
        assert!(h.coordinator.remove_available(agent));
        assert!(!h.coordinator.remove_available(agent));
        assert!(h.coordinator.add_available(agent));
        assert!(!h.coordinator.add_available(agent));
        assert!(!h.coordinator.add_available(AgentId::new()));

        let id = h.create(Position::ORIGIN, Moment::new(0, 0.0));
        let (coordinator, mut services) = h.services();
        coordinator
            .dispatch(id, &[agent], Moment::new(0, 0.0), &mut services)
            .unwrap();
        assert!(!h.coordinator.add_available(agent));
    }

    #[test]
    fn unanswered_calls_expire_once() {
        let mut h = Harness::new(ResolutionTrigger::Arrival, 1);
        let id = h.create(Position::ORIGIN, Moment::new(0, 0.0));
        assert!(h.coordinator.expire_calls(Moment::new(59, 59.0), &mut h.events).is_empty());
        assert_eq!(
            h.coordinator.expire_calls(Moment::new(60, 60.0), &mut h.events),
            vec![id]
        );
        assert!(h.coordinator.expire_calls(Moment::new(61, 61.0), &mut h.events).is_empty());
        assert_eq!(h.coordinator.active_count(), 0);
        assert_eq!(
            h.events
                .count(|kind| matches!(kind, EventKind::CallExpired { .. })),
            1
        );
        assert_eq!(h.coordinator.mission(id).unwrap().phase(), MissionPhase::Expired);
    }

    #[test]
    fn dispatched_calls_expire_once_and_still_resolve() {
        let mut h = Harness::new(ResolutionTrigger::Arrival, 1);
        let id = h.create(Position::new(50.0, 0.0, 0.0), Moment::new(0, 0.0));
        let agent = h.agents[0];
        let (coordinator, mut services) = h.services();
        coordinator
            .dispatch(id, &[agent], Moment::new(1, 1.0), &mut services)
            .unwrap();

        assert_eq!(
            h.coordinator.expire_calls(Moment::new(60, 60.0), &mut h.events),
            vec![id]
        );
        assert!(h.coordinator.expire_calls(Moment::new(61, 61.0), &mut h.events).is_empty());
        let mission = h.coordinator.mission(id).unwrap();
        assert_eq!(mission.phase(), MissionPhase::Pending);
        assert!(mission.timed_out());
        assert_eq!(h.coordinator.active_count(), 1);
        assert!(!h.coordinator.is_available(agent));

        let (coordinator, mut services) = h.services();
        let status = coordinator
            .resolve_mission(id, Moment::new(70, 70.0), &mut services)
            .unwrap();
        assert!(matches!(status, ResolveStatus::Resolved(ref r) if !r.call_cleared));
        assert!(h.coordinator.is_available(agent));
        assert_eq!(
            h.events
                .count(|kind| matches!(kind, EventKind::CallExpired { .. })),
            1
        );
    }

    #[test]
    fn finished_missions_are_evicted_past_retention() {
        let mut h = Harness::new(ResolutionTrigger::Arrival, 1);
        h.coordinator = h.coordinator.with_retention(2);
        let ids: Vec<MissionId> = (0..3)
            .map(|_| h.create(Position::ORIGIN, Moment::new(0, 0.0)))
            .collect();
        for (step, id) in (1_u64..).zip(&ids) {
            let (coordinator, mut services) = h.services();
            coordinator
                .resolve_mission(*id, Moment::new(step, 1.0), &mut services)
                .unwrap();
        }

        assert_eq!(h.coordinator.history().len(), 2);
        assert_eq!(h.coordinator.history()[0].mission_id, ids[1]);
        assert!(h.coordinator.mission(ids[0]).is_none());
        assert!(h.coordinator.mission(ids[1]).is_some());
        assert_eq!(h.coordinator.mission_count(), 2);

        let (coordinator, mut services) = h.services();
        let evicted = coordinator.resolve_mission(ids[0], Moment::new(9, 9.0), &mut services);
        assert!(matches!(evicted, Err(DispatchError::UnknownMission(_))));
        let kept = coordinator
            .resolve_mission(ids[2], Moment::new(9, 9.0), &mut services)
            .unwrap();
        assert!(matches!(kept, ResolveStatus::AlreadyResolved(MissionOutcome::Failure)));
    }

    #[test]
    fn expired_calls_count_toward_retention() {
        let mut h = Harness::new(ResolutionTrigger::Arrival, 1);
        h.coordinator = h.coordinator.with_retention(1);
        let first = h.create(Position::ORIGIN, Moment::new(0, 0.0));
        let second = h.create(Position::ORIGIN, Moment::new(0, 0.0));
        let expired = h.coordinator.expire_calls(Moment::new(60, 60.0), &mut h.events);
        assert_eq!(expired, vec![first, second]);
        assert!(h.coordinator.mission(first).is_none());
        assert_eq!(h.coordinator.mission(second).unwrap().phase(), MissionPhase::Expired);
    }
}
