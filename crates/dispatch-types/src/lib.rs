//! Shared type definitions for the dispatch resolution engine.
//!
//! This crate is the single source of truth for the plain data that flows
//! between the agent layer, the resolution core, and the host binary.
//! Nothing here owns behaviour beyond pure arithmetic on values.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for runtime entities and string
//!   newtypes for configuration-level definition ids
//! - [`stats`] -- The seven-component [`StatProfile`] and its arithmetic
//! - [`enums`] -- Outcome, mission phase, trigger, and hook-point enums
//! - [`definitions`] -- Immutable agent, ability, and call definitions
//! - [`position`] -- World positions and distances
//! - [`events`] -- Fire-and-forget notifications emitted by the core

pub mod definitions;
pub mod enums;
pub mod events;
pub mod ids;
pub mod position;
pub mod stats;

// Re-export all public types at crate root for convenience.
pub use definitions::{AbilityDefinition, AgentDefinition, CallDefinition, CallRequirement};
pub use enums::{AbilityTrigger, MissionOutcome, MissionPhase, ResolutionTrigger};
pub use events::{DispatchEvent, EventKind};
pub use ids::{AbilityId, AgentDefinitionId, AgentId, CallDefinitionId, MissionId};
pub use position::Position;
pub use stats::{STAT_MAX, STAT_MIN, Stat, StatProfile};
