//! Error types for the dispatch-agents crate.
//!
//! Agent operations that can fail return typed errors rather than
//! panicking. Most runtime paths in the agent layer are total; errors
//! are reserved for lookups against ids that do not exist.

use dispatch_types::{AbilityId, AgentDefinitionId, AgentId};

/// Errors that can occur during agent operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Agent with the given ID was not found in the roster.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// An agent definition references an ability the catalog does not know.
    #[error("agent definition {definition} references unknown ability {ability}")]
    UnknownAbility {
        /// The definition with the dangling reference.
        definition: AgentDefinitionId,
        /// The missing ability id.
        ability: AbilityId,
    },

    /// The agent tried to activate an ability it does not have.
    #[error("agent {agent_id} does not have ability {ability}")]
    AbilityNotOwned {
        /// The agent.
        agent_id: AgentId,
        /// The ability that was requested.
        ability: AbilityId,
    },

    /// Two abilities in the catalog share an id.
    #[error("duplicate ability id: {0}")]
    DuplicateAbility(AbilityId),
}
