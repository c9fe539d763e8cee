//! Agent state, timed ability modifiers, and mission hooks for the
//! dispatch engine.
//!
//! This crate is the logic layer for agents: everything that operates on
//! an agent's stats without knowing about missions, randomness, or the
//! scheduler. It sits between `dispatch-types` (plain data) and
//! `dispatch-core` (resolution and orchestration).
//!
//! # Modules
//!
//! - [`agent`] -- A single agent: base and current stats, modifiers, hooks
//! - [`catalog`] -- Read-only ability lookup ([`AbilityCatalog`])
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`hooks`] -- The mission-start / mission-tick / before-resolve hook seam
//! - [`modifier`] -- Modifier activation state machine and stat application
//! - [`roster`] -- Owner of every spawned agent ([`AgentRoster`])

pub mod agent;
pub mod catalog;
pub mod error;
pub mod hooks;
pub mod modifier;
pub mod roster;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, MIN_SPEED, ModifierChange};
pub use catalog::AbilityCatalog;
pub use error::AgentError;
pub use hooks::{HookContext, MissionHook, TriggeredAbility};
pub use modifier::{Activation, ActiveModifier, MIN_ABILITY_DURATION, ModifierSet, effective_duration};
pub use roster::AgentRoster;
