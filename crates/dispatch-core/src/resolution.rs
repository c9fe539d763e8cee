//! The resolution engine.
//!
//! Resolution runs in a fixed order: `before_resolve` hooks on every
//! assigned agent, probability from the team's current stats, one outcome
//! roll, then the terminal transition on the mission. A mission with no
//! team fails outright without consuming a roll. A mission that is
//! already terminal is left untouched.

use dispatch_agents::{AgentRoster, HookContext};
use dispatch_types::{AgentId, CallDefinition, MissionId, MissionOutcome, MissionPhase, StatProfile};
use tracing::info;

use crate::clock::Moment;
use crate::mission::{Mission, ResolveAt};
use crate::movement::MovementSource;
use crate::outcome;
use crate::random::RandomSource;
use crate::scoring::ScoringConfig;

/// The result of resolving a mission.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The mission.
    pub mission_id: MissionId,
    /// The outcome.
    pub outcome: MissionOutcome,
    /// Probability used for the roll.
    pub probability: f64,
    /// The roll, if one was drawn.
    pub roll: Option<f64>,
    /// Whether the outcome cleared the call.
    pub call_cleared: bool,
    /// Simulation time of resolution.
    pub resolved_at: f64,
    /// The team that was sent.
    pub agents: Vec<AgentId>,
}

/// Computes probabilities and resolves missions.
#[derive(Debug, Clone, Default)]
pub struct ResolutionEngine {
    scoring: ScoringConfig,
}

impl ResolutionEngine {
    /// Create an engine with the given scoring configuration.
    pub const fn new(scoring: ScoringConfig) -> Self {
        Self { scoring }
    }

    /// Scoring configuration.
    pub const fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Current stats of every listed agent the roster knows.
    pub fn team_stats(roster: &AgentRoster, agents: &[AgentId]) -> Vec<StatProfile> {
        agents
            .iter()
            .filter_map(|id| roster.get(*id))
            .map(|agent| *agent.current_stats())
            .collect()
    }

    /// Success probability of `team` against `call`.
    pub fn probability(&self, call: &CallDefinition, team: &[StatProfile]) -> f64 {
        self.scoring.probability(call, team)
    }

    /// Success probability of a mission's current team.
    pub fn estimate(&self, mission: &Mission, roster: &AgentRoster) -> f64 {
        let team = Self::team_stats(roster, mission.agents());
        self.probability(mission.call(), &team)
    }

    /// Whether a mission should resolve at `now`.
    ///
    /// Time-driven missions are due once their resolve time has passed,
    /// dispatched or not. Arrival-driven missions are due once they have a
    /// team and every member reports arrival.
    pub fn is_due(mission: &Mission, now: f64, movement: &dyn MovementSource) -> bool {
        match (mission.phase(), mission.resolve_at()) {
            (MissionPhase::Created | MissionPhase::Pending, ResolveAt::At(at)) => now >= at,
            (MissionPhase::Pending, ResolveAt::OnArrival) => {
                !mission.agents().is_empty()
                    && mission
                        .agents()
                        .iter()
                        .all(|agent| movement.is_at_destination(*agent))
            }
            (MissionPhase::Created, ResolveAt::OnArrival)
            | (MissionPhase::Resolved | MissionPhase::Expired, _) => false,
        }
    }

    /// Resolve a mission.
    ///
    /// Returns `None` if the mission was already terminal.
    pub fn resolve(
        &self,
        mission: &mut Mission,
        roster: &mut AgentRoster,
        random: &mut dyn RandomSource,
        at: Moment,
    ) -> Option<Resolution> {
        if !mission.is_open() {
            return None;
        }

        let ctx = HookContext {
            mission_id: mission.id(),
            tick: at.tick,
            now: at.now,
        };
        for agent_id in mission.agents() {
            if let Some(agent) = roster.get_mut(*agent_id) {
                agent.run_before_resolve(&ctx);
            }
        }

        let team = Self::team_stats(roster, mission.agents());
        let (outcome, probability, roll) = if team.is_empty() {
            (MissionOutcome::Failure, 0.0, None)
        } else {
            let probability = self.probability(mission.call(), &team);
            let drawn = outcome::roll(probability, random);
            (drawn.outcome, probability, Some(drawn.value))
        };

        if !mission.record_outcome(outcome, probability, roll, at.now) {
            return None;
        }

        info!(
            mission_id = %mission.id(),
            call = %mission.call().id,
            outcome = %outcome,
            probability,
            roll = ?roll,
            team = team.len(),
            tick = at.tick,
            "Mission resolved"
        );

        Some(Resolution {
            mission_id: mission.id(),
            outcome,
            probability,
            roll,
            call_cleared: mission.call_cleared(),
            resolved_at: at.now,
            agents: mission.agents().to_vec(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::sync::Arc;

    use dispatch_agents::AbilityCatalog;
    use dispatch_types::{
        AbilityDefinition, AbilityId, AbilityTrigger, AgentDefinition, AgentDefinitionId,
        CallDefinitionId, CallRequirement, Position,
    };

    use super::*;
    use crate::movement::ScriptedMovement;
    use crate::random::SequenceSource;

    fn required_call() -> Arc<CallDefinition> {
        Arc::new(CallDefinition {
            id: CallDefinitionId::new("brawl"),
            title: String::from("Brawl"),
            description: String::new(),
            requirement: CallRequirement::Required(StatProfile {
                fighting: 40.0,
                ..StatProfile::ZERO
            }),
            base_difficulty: 1.0,
            recommended_agents: 1,
            min_duration_seconds: 10.0,
            max_duration_seconds: 10.0,
            time_limit_seconds: None,
        })
    }

    fn roster_with(fighting: f64, abilities: Vec<AbilityDefinition>) -> (AgentRoster, AgentId) {
        let ids = abilities.iter().map(|a| a.id.clone()).collect();
        let mut roster = AgentRoster::new(AbilityCatalog::from_definitions(abilities).unwrap());
        let id = roster
            .spawn(Arc::new(AgentDefinition {
                id: AgentDefinitionId::new("bruiser"),
                display_name: String::from("Bruiser"),
                base_stats: StatProfile {
                    fighting,
                    ..StatProfile::ZERO
                },
                abilities: ids,
                base_move_speed: 3.5,
            }))
            .unwrap();
        (roster, id)
    }

    fn pending_mission(agent: AgentId, resolve_at: ResolveAt) -> Mission {
        let mut mission = Mission::new(
            MissionId::new(),
            required_call(),
            Position::ORIGIN,
            0.0,
            resolve_at,
        );
        mission.assign(&[agent]);
        mission
    }

    #[test]
    fn empty_team_fails_without_rolling() {
        let (mut roster, _) = roster_with(10.0, Vec::new());
        let mut mission = Mission::new(
            MissionId::new(),
            required_call(),
            Position::ORIGIN,
            0.0,
            ResolveAt::At(10.0),
        );
        let mut random = SequenceSource::new([0.0]);
        let engine = ResolutionEngine::default();
        let resolution = engine
            .resolve(&mut mission, &mut roster, &mut random, Moment::new(1, 10.0))
            .unwrap();
        assert_eq!(resolution.outcome, MissionOutcome::Failure);
        assert_eq!(resolution.probability, 0.0);
        assert_eq!(resolution.roll, None);
        assert_eq!(random.draws(), 0);
    }

    #[test]
    fn second_resolve_is_a_no_op() {
        let (mut roster, agent) = roster_with(80.0, Vec::new());
        let mut mission = pending_mission(agent, ResolveAt::At(10.0));
        let mut random = SequenceSource::new([0.5, 0.99]);
        let engine = ResolutionEngine::default();

        let first = engine
            .resolve(&mut mission, &mut roster, &mut random, Moment::new(1, 10.0))
            .unwrap();
        assert_eq!(first.outcome, MissionOutcome::Success);
        assert!(
            engine
                .resolve(&mut mission, &mut roster, &mut random, Moment::new(2, 11.0))
                .is_none()
        );
        assert_eq!(mission.outcome(), MissionOutcome::Success);
        assert_eq!(random.draws(), 1);
    }

    #[test]
    fn before_resolve_abilities_count_toward_the_roll() {
        let surge = AbilityDefinition {
            id: AbilityId::new("surge"),
            display_name: String::from("Surge"),
            description: String::new(),
            duration_seconds: 5.0,
            cooldown_seconds: 0.0,
            trigger: AbilityTrigger::BeforeResolve,
            flat: StatProfile {
                fighting: 20.0,
                ..StatProfile::ZERO
            },
            percent: StatProfile::ZERO,
        };
        let (mut roster, agent) = roster_with(20.0, vec![surge]);
        let mut mission = pending_mission(agent, ResolveAt::At(10.0));
        let engine = ResolutionEngine::default();

        // 20 / 40 -> (0.5 + 6) / 7 before the hook; 40 / 40 -> 1.0 after.
        let before = engine.estimate(&mission, &roster);
        assert!((before - 6.5 / 7.0).abs() < 1e-9);

        let mut random = SequenceSource::new([0.95]);
        let resolution = engine
            .resolve(&mut mission, &mut roster, &mut random, Moment::new(1, 10.0))
            .unwrap();
        assert_eq!(resolution.probability, 1.0);
        assert_eq!(resolution.outcome, MissionOutcome::Success);
    }

    #[test]
    fn due_checks_follow_the_trigger() {
        let (_, agent) = roster_with(10.0, Vec::new());
        let mut movement = ScriptedMovement::new();

        let timed = pending_mission(agent, ResolveAt::At(10.0));
        assert!(!ResolutionEngine::is_due(&timed, 9.9, &movement));
        assert!(ResolutionEngine::is_due(&timed, 10.0, &movement));

        let arrival = pending_mission(agent, ResolveAt::OnArrival);
        assert!(!ResolutionEngine::is_due(&arrival, 1e6, &movement));
        movement.set_destination(agent, Position::ORIGIN, 1.0);
        movement.mark_arrived(agent);
        assert!(ResolutionEngine::is_due(&arrival, 0.0, &movement));

        let unanswered = Mission::new(
            MissionId::new(),
            required_call(),
            Position::ORIGIN,
            0.0,
            ResolveAt::OnArrival,
        );
        assert!(!ResolutionEngine::is_due(&unanswered, 1e6, &movement));
    }
}
