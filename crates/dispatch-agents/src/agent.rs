//! A single dispatchable agent.
//!
//! An [`Agent`] owns its base profile (from its definition), the set of
//! active modifiers, and the current profile derived from the two. The
//! current profile is recomputed every time the modifier set changes and
//! snaps back to the base profile when the agent is reset after a mission.
//!
//! Modifier changes are also journaled so the tick cycle can turn them
//! into notifications without the agent knowing about event sinks.

use std::sync::Arc;

use dispatch_types::{AbilityDefinition, AbilityId, AgentDefinition, AgentId, MissionId, StatProfile};
use tracing::debug;

use crate::hooks::{HookContext, MissionHook};
use crate::modifier::{Activation, ModifierSet};

/// Lowest movement speed (and lowest mobility used for travel estimates).
pub const MIN_SPEED: f64 = 0.1;

/// Movement speed gained per point of mobility.
pub const SPEED_PER_MOBILITY: f64 = 0.1;

/// A modifier set change waiting to be reported.
#[derive(Debug, Clone, PartialEq)]
pub enum ModifierChange {
    /// An ability was activated or refreshed.
    Activated {
        /// The ability.
        ability: AbilityId,
        /// New expiry time.
        expires_at: f64,
    },
    /// An ability ran out.
    Expired {
        /// The ability.
        ability: AbilityId,
    },
}

/// A spawned agent.
#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    definition: Arc<AgentDefinition>,
    current: StatProfile,
    modifiers: ModifierSet,
    hooks: Vec<Arc<dyn MissionHook>>,
    current_mission: Option<MissionId>,
    changes: Vec<ModifierChange>,
}

impl Agent {
    /// Spawn an agent from its definition with an empty hook list.
    pub fn new(id: AgentId, definition: Arc<AgentDefinition>) -> Self {
        let current = definition.base_stats;
        Self {
            id,
            definition,
            current,
            modifiers: ModifierSet::new(),
            hooks: Vec::new(),
            current_mission: None,
            changes: Vec::new(),
        }
    }

    /// The agent's id.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// The definition the agent was spawned from.
    pub const fn definition(&self) -> &Arc<AgentDefinition> {
        &self.definition
    }

    /// Display name from the definition.
    pub fn name(&self) -> &str {
        &self.definition.display_name
    }

    /// Base stats, before modifiers.
    pub fn base_stats(&self) -> &StatProfile {
        &self.definition.base_stats
    }

    /// Current stats, after modifiers. Unclamped.
    pub const fn current_stats(&self) -> &StatProfile {
        &self.current
    }

    /// Current stats clamped to the displayable range.
    pub fn display_stats(&self) -> StatProfile {
        self.current.clamped()
    }

    /// The active modifier set.
    pub const fn modifiers(&self) -> &ModifierSet {
        &self.modifiers
    }

    /// Whether the ability is currently active on this agent.
    pub fn has_active(&self, ability: &AbilityId) -> bool {
        self.modifiers.contains(ability)
    }

    /// Whether the agent's definition lists the ability.
    pub fn owns_ability(&self, ability: &AbilityId) -> bool {
        self.definition.abilities.contains(ability)
    }

    /// The mission the agent is assigned to, if any.
    pub const fn current_mission(&self) -> Option<MissionId> {
        self.current_mission
    }

    /// Whether the agent is on a mission.
    pub const fn is_assigned(&self) -> bool {
        self.current_mission.is_some()
    }

    /// Record the mission the agent was dispatched to.
    pub const fn assign_mission(&mut self, mission_id: MissionId) {
        self.current_mission = Some(mission_id);
    }

    /// Forget the current mission.
    pub const fn clear_mission(&mut self) {
        self.current_mission = None;
    }

    /// Append a hook. Hooks fire in registration order.
    pub fn register_hook(&mut self, hook: Arc<dyn MissionHook>) {
        self.hooks.push(hook);
    }

    /// Number of registered hooks.
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Activate (or refresh) an ability modifier and recompute stats.
    pub fn activate_ability(&mut self, ability: Arc<AbilityDefinition>, now: f64) -> Activation {
        let id = ability.id.clone();
        let activation = self.modifiers.activate(ability, now);
        self.recompute();
        debug!(
            agent_id = %self.id,
            ability = %id,
            expires_at = activation.expires_at(),
            refreshed = matches!(activation, Activation::Refreshed { .. }),
            "Ability activated"
        );
        self.changes.push(ModifierChange::Activated {
            ability: id,
            expires_at: activation.expires_at(),
        });
        activation
    }

    /// Drop every modifier that has expired at `now`.
    ///
    /// Stats are recomputed only when something actually expired.
    pub fn expire_abilities(&mut self, now: f64) -> Vec<AbilityId> {
        let expired = self.modifiers.expire(now);
        if !expired.is_empty() {
            self.recompute();
            for ability in &expired {
                debug!(agent_id = %self.id, ability = %ability, "Ability expired");
                self.changes.push(ModifierChange::Expired {
                    ability: ability.clone(),
                });
            }
        }
        expired
    }

    /// Clear every modifier and restore the base profile.
    ///
    /// Each cleared modifier is journaled as expired.
    pub fn reset_to_base(&mut self) {
        for modifier in self.modifiers.iter() {
            self.changes.push(ModifierChange::Expired {
                ability: modifier.ability.id.clone(),
            });
        }
        self.modifiers.clear();
        self.current = self.definition.base_stats;
    }

    /// Drain the journal of modifier changes since the last call.
    pub fn take_changes(&mut self) -> Vec<ModifierChange> {
        core::mem::take(&mut self.changes)
    }

    /// Movement speed: `max(MIN_SPEED, base_move_speed + mobility * 0.1)`.
    pub fn move_speed(&self) -> f64 {
        self.current
            .mobility
            .mul_add(SPEED_PER_MOBILITY, self.definition.base_move_speed)
            .max(MIN_SPEED)
    }

    /// Estimated seconds to cover `distance`: `distance / (mobility + 1)`,
    /// with mobility floored at [`MIN_SPEED`].
    pub fn estimated_travel_time(&self, distance: f64) -> f64 {
        let mobility = self.current.mobility.max(MIN_SPEED);
        distance.max(0.0) / (mobility + 1.0)
    }

    /// Fire `on_mission_start` on every hook in order.
    pub fn run_mission_start(&mut self, ctx: &HookContext) {
        for hook in self.hooks.clone() {
            hook.on_mission_start(self, ctx);
        }
    }

    /// Fire `on_mission_tick` on every hook in order.
    pub fn run_mission_tick(&mut self, ctx: &HookContext, dt: f64) {
        for hook in self.hooks.clone() {
            hook.on_mission_tick(self, ctx, dt);
        }
    }

    /// Fire `on_before_resolve` on every hook in order.
    pub fn run_before_resolve(&mut self, ctx: &HookContext) {
        for hook in self.hooks.clone() {
            hook.on_before_resolve(self, ctx);
        }
    }

    fn recompute(&mut self) {
        self.current = self.modifiers.apply(&self.definition.base_stats);
    }
}
