//! Read-only lookup of ability definitions by id.

use std::collections::BTreeMap;
use std::sync::Arc;

use dispatch_types::{AbilityDefinition, AbilityId};

use crate::error::AgentError;

/// Every ability the simulation knows about.
#[derive(Debug, Clone, Default)]
pub struct AbilityCatalog {
    abilities: BTreeMap<AbilityId, Arc<AbilityDefinition>>,
}

impl AbilityCatalog {
    /// Create an empty catalog.
    pub const fn new() -> Self {
        Self {
            abilities: BTreeMap::new(),
        }
    }

    /// Build a catalog from a list of definitions.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateAbility`] if two definitions share an id.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = AbilityDefinition>,
    ) -> Result<Self, AgentError> {
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.insert(definition)?;
        }
        Ok(catalog)
    }

    /// Add a definition.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateAbility`] if the id is already present.
    pub fn insert(&mut self, definition: AbilityDefinition) -> Result<(), AgentError> {
        if self.abilities.contains_key(&definition.id) {
            return Err(AgentError::DuplicateAbility(definition.id));
        }
        self.abilities
            .insert(definition.id.clone(), Arc::new(definition));
        Ok(())
    }

    /// Look up a definition.
    pub fn get(&self, id: &AbilityId) -> Option<&Arc<AbilityDefinition>> {
        self.abilities.get(id)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}
