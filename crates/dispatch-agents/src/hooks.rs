//! Mission hooks: the three callback points an ability can react to.
//!
//! A hook is a capability, not a class hierarchy. Every agent carries an
//! ordered list of `Arc<dyn MissionHook>`; the mission layer invokes the
//! matching callback on each hook in registration order. All three
//! callbacks default to doing nothing, so an implementation only writes
//! the points it cares about.
//!
//! [`TriggeredAbility`] is the stock hook built from configuration: it
//! activates its ability's modifier at the point named by the ability's
//! [`AbilityTrigger`].

use std::sync::Arc;

use dispatch_types::{AbilityDefinition, AbilityTrigger, MissionId};

use crate::agent::Agent;

/// Where in the mission a hook is being invoked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HookContext {
    /// The mission the agent is on.
    pub mission_id: MissionId,
    /// Tick number.
    pub tick: u64,
    /// Simulation time in seconds.
    pub now: f64,
}

/// Callbacks fired while an agent is on a mission.
pub trait MissionHook: core::fmt::Debug + Send + Sync {
    /// The agent has just been dispatched.
    fn on_mission_start(&self, _agent: &mut Agent, _ctx: &HookContext) {}

    /// One scheduler tick of `dt` seconds has passed while on the mission.
    fn on_mission_tick(&self, _agent: &mut Agent, _ctx: &HookContext, _dt: f64) {}

    /// The mission is about to roll its outcome.
    fn on_before_resolve(&self, _agent: &mut Agent, _ctx: &HookContext) {}
}

/// Activates an ability at the hook point its definition names.
#[derive(Debug, Clone)]
pub struct TriggeredAbility {
    ability: Arc<AbilityDefinition>,
}

impl TriggeredAbility {
    /// Wrap an ability definition.
    ///
    /// Returns `None` for [`AbilityTrigger::Manual`] abilities, which
    /// never fire on their own.
    pub fn new(ability: Arc<AbilityDefinition>) -> Option<Self> {
        match ability.trigger {
            AbilityTrigger::Manual => None,
            AbilityTrigger::MissionStart
            | AbilityTrigger::MissionTick
            | AbilityTrigger::BeforeResolve => Some(Self { ability }),
        }
    }

    /// The wrapped ability.
    pub const fn ability(&self) -> &Arc<AbilityDefinition> {
        &self.ability
    }

    fn fire(&self, agent: &mut Agent, ctx: &HookContext, point: AbilityTrigger) {
        if self.ability.trigger == point {
            agent.activate_ability(Arc::clone(&self.ability), ctx.now);
        }
    }
}

impl MissionHook for TriggeredAbility {
    fn on_mission_start(&self, agent: &mut Agent, ctx: &HookContext) {
        self.fire(agent, ctx, AbilityTrigger::MissionStart);
    }

    fn on_mission_tick(&self, agent: &mut Agent, ctx: &HookContext, _dt: f64) {
        self.fire(agent, ctx, AbilityTrigger::MissionTick);
    }

    fn on_before_resolve(&self, agent: &mut Agent, ctx: &HookContext) {
        self.fire(agent, ctx, AbilityTrigger::BeforeResolve);
    }
}
