//! The roster owns every spawned agent.
//!
//! Missions and the available pool refer to agents by [`AgentId`]; the
//! roster is the one place that holds the [`Agent`] values themselves.
//! Spawning wires each agent's triggered abilities into its hook list in
//! the order the definition lists them.

use std::collections::BTreeMap;
use std::sync::Arc;

use dispatch_types::{AbilityId, AgentDefinition, AgentId};
use tracing::info;

use crate::agent::{Agent, ModifierChange};
use crate::catalog::AbilityCatalog;
use crate::error::AgentError;
use crate::hooks::TriggeredAbility;
use crate::modifier::Activation;

/// Owner of every spawned agent.
#[derive(Debug, Default)]
pub struct AgentRoster {
    catalog: AbilityCatalog,
    agents: BTreeMap<AgentId, Agent>,
}

impl AgentRoster {
    /// Create an empty roster backed by `catalog`.
    pub const fn new(catalog: AbilityCatalog) -> Self {
        Self {
            catalog,
            agents: BTreeMap::new(),
        }
    }

    /// The ability catalog.
    pub const fn catalog(&self) -> &AbilityCatalog {
        &self.catalog
    }

    /// Spawn an agent from a definition.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownAbility`] if the definition lists an
    /// ability the catalog does not contain.
    pub fn spawn(&mut self, definition: Arc<AgentDefinition>) -> Result<AgentId, AgentError> {
        let mut hooks = Vec::new();
        for ability_id in &definition.abilities {
            let ability = self.catalog.get(ability_id).ok_or_else(|| AgentError::UnknownAbility {
                definition: definition.id.clone(),
                ability: ability_id.clone(),
            })?;
            if let Some(hook) = TriggeredAbility::new(Arc::clone(ability)) {
                hooks.push(hook);
            }
        }

        let id = AgentId::new();
        let mut agent = Agent::new(id, Arc::clone(&definition));
        for hook in hooks {
            agent.register_hook(Arc::new(hook));
        }
        info!(
            agent_id = %id,
            definition = %definition.id,
            name = agent.name(),
            hooks = agent.hook_count(),
            "Agent spawned"
        );
        self.agents.insert(id, agent);
        Ok(id)
    }

    /// Look up an agent.
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Look up an agent mutably.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// Whether the roster holds the agent.
    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    /// Iterate agents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Iterate agents mutably in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.values_mut()
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Manually activate one of an agent's abilities.
    ///
    /// Cooldowns are not enforced; an active ability is simply refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an unknown agent and
    /// [`AgentError::AbilityNotOwned`] if the agent's definition does not
    /// list the ability.
    pub fn activate_ability(
        &mut self,
        agent_id: AgentId,
        ability: &AbilityId,
        now: f64,
    ) -> Result<Activation, AgentError> {
        let agent = self
            .agents
            .get_mut(&agent_id)
            .ok_or(AgentError::AgentNotFound(agent_id))?;
        if !agent.owns_ability(ability) {
            return Err(AgentError::AbilityNotOwned {
                agent_id,
                ability: ability.clone(),
            });
        }
        let definition = self
            .catalog
            .get(ability)
            .ok_or_else(|| AgentError::AbilityNotOwned {
                agent_id,
                ability: ability.clone(),
            })?;
        Ok(agent.activate_ability(Arc::clone(definition), now))
    }

    /// Expire due modifiers on every agent.
    ///
    /// Returns `(agent, ability)` pairs for everything that expired.
    pub fn expire_abilities(&mut self, now: f64) -> Vec<(AgentId, AbilityId)> {
        let mut expired = Vec::new();
        for agent in self.agents.values_mut() {
            let id = agent.id();
            expired.extend(agent.expire_abilities(now).into_iter().map(|a| (id, a)));
        }
        expired
    }

    /// Drain every agent's modifier journal.
    pub fn take_changes(&mut self) -> Vec<(AgentId, ModifierChange)> {
        let mut changes = Vec::new();
        for agent in self.agents.values_mut() {
            let id = agent.id();
            changes.extend(agent.take_changes().into_iter().map(|c| (id, c)));
        }
        changes
    }
}
