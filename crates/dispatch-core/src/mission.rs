//! Call instances and their mission state.
//!
//! A [`Mission`] pairs an immutable [`CallDefinition`] with everything
//! that changes while the call is live: where it is, when it resolves,
//! which agents were sent, and how it ended.
//!
//! Phases run `Created -> Pending -> Resolved`, with `Created -> Expired`
//! when a time-limited call is never answered. The time limit keeps
//! running after dispatch: a pending mission that runs out of time is
//! flagged as timed out, still resolves, and never clears its call.
//! Terminal phases are sticky: every transition method checks the current
//! phase and reports whether it actually changed anything.

use std::sync::Arc;

use dispatch_types::{AgentId, CallDefinition, MissionId, MissionOutcome, MissionPhase, Position};

use crate::scoring::clamp01;

/// Shortest resolve duration a call can draw, in seconds.
pub const MIN_CALL_DURATION: f64 = 1.0;

/// When a mission resolves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolveAt {
    /// At an absolute simulation time.
    At(f64),
    /// Once every assigned agent has arrived.
    OnArrival,
}

/// Sanitized `[min, max]` duration bounds for a call definition.
pub fn duration_bounds(call: &CallDefinition) -> (f64, f64) {
    let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
    let min = finite_or(call.min_duration_seconds, MIN_CALL_DURATION).max(MIN_CALL_DURATION);
    let max = finite_or(call.max_duration_seconds, min).max(min);
    (min, max)
}

/// A live call and the team assigned to it.
#[derive(Debug, Clone)]
pub struct Mission {
    id: MissionId,
    call: Arc<CallDefinition>,
    position: Position,
    created_at: f64,
    expires_at: Option<f64>,
    resolve_at: ResolveAt,
    agents: Vec<AgentId>,
    phase: MissionPhase,
    outcome: MissionOutcome,
    probability_estimate: Option<f64>,
    probability: Option<f64>,
    roll: Option<f64>,
    resolved_at: Option<f64>,
    timed_out: bool,
}

impl Mission {
    /// Create a call instance in the `Created` phase.
    ///
    /// A positive, finite time limit on the definition sets the expiry;
    /// anything else means the call never expires.
    pub fn new(
        id: MissionId,
        call: Arc<CallDefinition>,
        position: Position,
        created_at: f64,
        resolve_at: ResolveAt,
    ) -> Self {
        let expires_at = call
            .time_limit_seconds
            .filter(|limit| limit.is_finite() && *limit > 0.0)
            .map(|limit| created_at + limit);
        Self {
            id,
            call,
            position,
            created_at,
            expires_at,
            resolve_at,
            agents: Vec::new(),
            phase: MissionPhase::Created,
            outcome: MissionOutcome::Pending,
            probability_estimate: None,
            probability: None,
            roll: None,
            resolved_at: None,
            timed_out: false,
        }
    }

    /// Instance id.
    pub const fn id(&self) -> MissionId {
        self.id
    }

    /// The call definition.
    pub const fn call(&self) -> &Arc<CallDefinition> {
        &self.call
    }

    /// World location of the call.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Creation time.
    pub const fn created_at(&self) -> f64 {
        self.created_at
    }

    /// Expiry time, if the call is time-limited.
    pub const fn expires_at(&self) -> Option<f64> {
        self.expires_at
    }

    /// Resolve trigger.
    pub const fn resolve_at(&self) -> ResolveAt {
        self.resolve_at
    }

    /// Assigned agents in dispatch order.
    pub fn agents(&self) -> &[AgentId] {
        &self.agents
    }

    /// Current phase.
    pub const fn phase(&self) -> MissionPhase {
        self.phase
    }

    /// Current outcome (`Pending` until resolved).
    pub const fn outcome(&self) -> MissionOutcome {
        self.outcome
    }

    /// Probability computed at dispatch.
    pub const fn probability_estimate(&self) -> Option<f64> {
        self.probability_estimate
    }

    /// Probability used for the final roll.
    pub const fn probability(&self) -> Option<f64> {
        self.probability
    }

    /// The final roll, if one was drawn.
    pub const fn roll(&self) -> Option<f64> {
        self.roll
    }

    /// Resolution time.
    pub const fn resolved_at(&self) -> Option<f64> {
        self.resolved_at
    }

    /// Whether the call is still live (neither resolved nor expired).
    pub const fn is_open(&self) -> bool {
        !self.phase.is_terminal()
    }

    /// Whether the call can still take a team.
    pub const fn accepts_dispatch(&self) -> bool {
        matches!(self.phase, MissionPhase::Created)
    }

    /// Whether the time limit ran out, before or after dispatch.
    pub const fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Whether the outcome cleared the call. A timed-out call is never
    /// cleared.
    pub const fn call_cleared(&self) -> bool {
        !self.timed_out && self.outcome.clears_call()
    }

    /// Fraction of the time limit remaining, in `[0, 1]`. Calls without a
    /// limit report 1.
    pub fn time_progress(&self, now: f64) -> f64 {
        match self.expires_at {
            Some(expires_at) => {
                let limit = expires_at - self.created_at;
                clamp01((expires_at - now) / limit)
            }
            None => 1.0,
        }
    }

    /// Whether a live call reaches its time limit at `now` and has not
    /// been flagged yet.
    pub fn is_expired_at(&self, now: f64) -> bool {
        self.is_open() && !self.timed_out && self.expires_at.is_some_and(|t| now >= t)
    }

    /// Record the team and move to `Pending`. Duplicate ids are dropped,
    /// keeping the first occurrence.
    ///
    /// Returns `false` (and changes nothing) unless the mission is
    /// `Created`.
    pub(crate) fn assign(&mut self, agents: &[AgentId]) -> bool {
        if !self.accepts_dispatch() {
            return false;
        }
        for agent in agents {
            if !self.agents.contains(agent) {
                self.agents.push(*agent);
            }
        }
        self.phase = MissionPhase::Pending;
        true
    }

    /// Push a time-driven resolve time later. Never moves it earlier and
    /// never touches arrival-driven missions.
    pub(crate) fn extend_resolve_at(&mut self, at: f64) -> bool {
        match self.resolve_at {
            ResolveAt::At(current) if at.is_finite() && at > current => {
                self.resolve_at = ResolveAt::At(at);
                true
            }
            ResolveAt::At(_) | ResolveAt::OnArrival => false,
        }
    }

    pub(crate) const fn set_probability_estimate(&mut self, estimate: f64) {
        self.probability_estimate = Some(estimate);
    }

    /// Store the outcome and move to `Resolved`.
    ///
    /// Returns `false` (and changes nothing) if the mission is already
    /// terminal.
    pub(crate) fn record_outcome(
        &mut self,
        outcome: MissionOutcome,
        probability: f64,
        roll: Option<f64>,
        now: f64,
    ) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.phase = MissionPhase::Resolved;
        self.outcome = outcome;
        self.probability = Some(probability);
        self.roll = roll;
        self.resolved_at = Some(now);
        true
    }

    /// Flag the call as timed out.
    ///
    /// An unanswered call moves to `Expired`. A pending mission keeps its
    /// phase and team and resolves later as usual. Returns `false` if the
    /// call is terminal or was already flagged.
    pub(crate) fn mark_expired(&mut self, now: f64) -> bool {
        if !self.is_open() || self.timed_out {
            return false;
        }
        self.timed_out = true;
        if self.phase == MissionPhase::Created {
            self.phase = MissionPhase::Expired;
            self.outcome = MissionOutcome::Failure;
            self.resolved_at = Some(now);
        }
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use dispatch_types::{CallDefinitionId, CallRequirement};

    use super::*;

    fn call(time_limit_seconds: Option<f64>) -> Arc<CallDefinition> {
        Arc::new(CallDefinition {
            id: CallDefinitionId::new("fire"),
            title: String::from("Fire"),
            description: String::new(),
            requirement: CallRequirement::default(),
            base_difficulty: 5.0,
            recommended_agents: 2,
            min_duration_seconds: 10.0,
            max_duration_seconds: 20.0,
            time_limit_seconds,
        })
    }

    fn mission(resolve_at: ResolveAt, limit: Option<f64>) -> Mission {
        Mission::new(MissionId::new(), call(limit), Position::ORIGIN, 100.0, resolve_at)
    }

    #[test]
    fn resolve_time_only_extends() {
        let mut m = mission(ResolveAt::At(120.0), None);
        assert!(!m.extend_resolve_at(110.0));
        assert_eq!(m.resolve_at(), ResolveAt::At(120.0));
        assert!(m.extend_resolve_at(130.0));
        assert_eq!(m.resolve_at(), ResolveAt::At(130.0));

        let mut arrival = mission(ResolveAt::OnArrival, None);
        assert!(!arrival.extend_resolve_at(500.0));
        assert_eq!(arrival.resolve_at(), ResolveAt::OnArrival);
    }

    #[test]
    fn outcome_is_recorded_once() {
        let mut m = mission(ResolveAt::At(120.0), None);
        let agent = AgentId::new();
        assert!(m.assign(&[agent, agent]));
        assert_eq!(m.agents(), &[agent]);
        assert_eq!(m.phase(), MissionPhase::Pending);

        assert!(m.record_outcome(MissionOutcome::Success, 0.95, Some(0.1), 121.0));
        assert!(!m.record_outcome(MissionOutcome::Failure, 0.0, None, 122.0));
        assert_eq!(m.outcome(), MissionOutcome::Success);
        assert_eq!(m.resolved_at(), Some(121.0));
        assert!(m.call_cleared());
        assert!(!m.is_open());
    }

    #[test]
    fn only_created_missions_accept_teams() {
        let mut m = mission(ResolveAt::At(120.0), None);
        assert!(m.assign(&[AgentId::new()]));
        assert!(!m.assign(&[AgentId::new()]));
        assert_eq!(m.agents().len(), 1);
    }

    #[test]
    fn unanswered_call_expires_and_closes() {
        let mut m = mission(ResolveAt::At(500.0), Some(30.0));
        assert_eq!(m.expires_at(), Some(130.0));
        assert!(!m.is_expired_at(129.9));
        assert!(m.is_expired_at(130.0));

        assert!(m.mark_expired(130.0));
        assert_eq!(m.phase(), MissionPhase::Expired);
        assert!(m.timed_out());
        assert!(!m.is_expired_at(131.0));
        assert!(!m.mark_expired(131.0));
        assert!(!m.call_cleared());
    }

    #[test]
    fn dispatched_call_times_out_but_stays_pending() {
        let mut m = mission(ResolveAt::At(500.0), Some(30.0));
        m.assign(&[AgentId::new()]);
        assert!(m.is_expired_at(200.0));
        assert!(m.mark_expired(200.0));
        assert_eq!(m.phase(), MissionPhase::Pending);
        assert!(m.is_open());
        assert!(!m.is_expired_at(201.0));
        assert!(!m.mark_expired(201.0));

        assert!(m.record_outcome(MissionOutcome::Success, 0.9, Some(0.1), 500.0));
        assert_eq!(m.outcome(), MissionOutcome::Success);
        assert!(!m.call_cleared());
    }

    #[test]
    fn time_progress_counts_down() {
        let m = mission(ResolveAt::OnArrival, Some(40.0));
        assert_eq!(m.time_progress(100.0), 1.0);
        assert_eq!(m.time_progress(120.0), 0.5);
        assert_eq!(m.time_progress(200.0), 0.0);

        let unlimited = mission(ResolveAt::OnArrival, None);
        assert_eq!(unlimited.time_progress(1e9), 1.0);
    }

    #[test]
    fn non_positive_limits_never_expire() {
        assert_eq!(mission(ResolveAt::OnArrival, Some(0.0)).expires_at(), None);
        assert_eq!(mission(ResolveAt::OnArrival, Some(-5.0)).expires_at(), None);
    }

    #[test]
    fn duration_bounds_are_floored_and_ordered() {
        let mut definition = (*call(None)).clone();
        definition.min_duration_seconds = -4.0;
        definition.max_duration_seconds = 0.5;
        assert_eq!(duration_bounds(&definition), (1.0, 1.0));

        definition.min_duration_seconds = 30.0;
        definition.max_duration_seconds = 10.0;
        assert_eq!(duration_bounds(&definition), (30.0, 30.0));
    }
}
