//! Identifier types.
//!
//! Runtime entities (agents and missions) get strongly-typed UUID v7
//! identifiers so they can never be mixed up at compile time. Definitions
//! loaded from configuration are keyed by the human-authored string id
//! they carry in the YAML file.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

/// Generates a string-backed key for a configuration definition.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a key from anything string-like.
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Borrow the key as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_owned())
            }
        }
    };
}

define_id! {
    /// Unique identifier for a spawned agent.
    AgentId
}

define_id! {
    /// Unique identifier for a call instance and the mission that
    /// answers it. One id covers both halves of the pairing.
    MissionId
}

define_key! {
    /// Key of an [`AbilityDefinition`](crate::AbilityDefinition); also the
    /// identity under which an active modifier is tracked on an agent.
    AbilityId
}

define_key! {
    /// Key of an [`AgentDefinition`](crate::AgentDefinition).
    AgentDefinitionId
}

define_key! {
    /// Key of a [`CallDefinition`](crate::CallDefinition).
    CallDefinitionId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_ids_are_unique() {
        assert_ne!(AgentId::new(), AgentId::new());
        assert_ne!(MissionId::new(), MissionId::new());
    }

    #[test]
    fn keys_serialize_as_plain_strings() {
        let key = AbilityId::new("adrenaline");
        let json = serde_json::to_string(&key).unwrap_or_default();
        assert_eq!(json, "\"adrenaline\"");
        assert_eq!(key.to_string(), "adrenaline");
    }
}
