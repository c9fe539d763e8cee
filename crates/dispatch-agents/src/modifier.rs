//! Timed ability modifiers and the per-agent active set.
//!
//! # State machine
//!
//! ```text
//! Inactive --activate(now)--> Active --now >= expires_at--> Expired (removed)
//!                               |  ^
//!                               +--+ activate(now) again: expiry overwritten
//! ```
//!
//! Activation records `expires_at = now + max(MIN_ABILITY_DURATION, duration)`.
//! The floor keeps a zero or negative duration from expiring before the
//! first recompute sees it. Re-activating an active modifier overwrites its
//! expiry and keeps its original slot, so repeated activations never stack.
//!
//! # Application order
//!
//! [`ModifierSet::apply`] runs a flat pass over every active modifier, then
//! a percent pass over every active modifier, both in activation order.
//! Percent deltas therefore compound on stats already bumped by flat
//! deltas. The result is not clamped.

use std::sync::Arc;

use dispatch_types::{AbilityDefinition, AbilityId, StatProfile};

/// Shortest duration an activated modifier can have, in seconds.
pub const MIN_ABILITY_DURATION: f64 = 0.01;

/// Floor a configured duration at [`MIN_ABILITY_DURATION`].
///
/// NaN durations are treated as zero.
pub fn effective_duration(duration_seconds: f64) -> f64 {
    if duration_seconds.is_nan() {
        MIN_ABILITY_DURATION
    } else {
        duration_seconds.max(MIN_ABILITY_DURATION)
    }
}

/// A modifier currently applied to an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveModifier {
    /// The ability this modifier came from.
    pub ability: Arc<AbilityDefinition>,
    /// Time of the most recent activation.
    pub activated_at: f64,
    /// Absolute time at which the modifier stops applying.
    pub expires_at: f64,
}

impl ActiveModifier {
    /// Whether the modifier has run out at `now`.
    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.expires_at
    }

    /// Seconds left before expiry, floored at zero.
    pub fn remaining(&self, now: f64) -> f64 {
        (self.expires_at - now).max(0.0)
    }
}

/// What an activation did to the set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    /// The modifier was inactive and is now active.
    Activated {
        /// New expiry time.
        expires_at: f64,
    },
    /// The modifier was already active; only its expiry moved.
    Refreshed {
        /// Expiry before the refresh.
        previous_expiry: f64,
        /// New expiry time.
        expires_at: f64,
    },
}

impl Activation {
    /// The expiry time after the activation.
    pub const fn expires_at(&self) -> f64 {
        match self {
            Self::Activated { expires_at } | Self::Refreshed { expires_at, .. } => *expires_at,
        }
    }
}

/// The modifiers active on one agent, in activation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierSet {
    active: Vec<ActiveModifier>,
}

impl ModifierSet {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self { active: Vec::new() }
    }

    /// Number of active modifiers.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no modifier is active.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Iterate active modifiers in activation order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveModifier> {
        self.active.iter()
    }

    /// Look up an active modifier by ability id.
    pub fn get(&self, ability: &AbilityId) -> Option<&ActiveModifier> {
        self.active.iter().find(|m| &m.ability.id == ability)
    }

    /// Whether the ability is in the active set.
    pub fn contains(&self, ability: &AbilityId) -> bool {
        self.get(ability).is_some()
    }

    /// Activate `ability` at `now`, or refresh it if it is already active.
    pub fn activate(&mut self, ability: Arc<AbilityDefinition>, now: f64) -> Activation {
        let expires_at = now + effective_duration(ability.duration_seconds);
        if let Some(existing) = self.active.iter_mut().find(|m| m.ability.id == ability.id) {
            let previous_expiry = existing.expires_at;
            existing.activated_at = now;
            existing.expires_at = expires_at;
            return Activation::Refreshed {
                previous_expiry,
                expires_at,
            };
        }
        self.active.push(ActiveModifier {
            ability,
            activated_at: now,
            expires_at,
        });
        Activation::Activated { expires_at }
    }

    /// Remove every modifier that has expired at `now`.
    ///
    /// Returns the ids of the removed modifiers in activation order.
    pub fn expire(&mut self, now: f64) -> Vec<AbilityId> {
        let mut expired = Vec::new();
        self.active.retain(|m| {
            if m.is_expired(now) {
                expired.push(m.ability.id.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    /// Drop every modifier.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Derive a current profile from `base`: flat pass, then percent pass.
    pub fn apply(&self, base: &StatProfile) -> StatProfile {
        let mut current = *base;
        for modifier in &self.active {
            current += modifier.ability.flat;
        }
        for modifier in &self.active {
            current.apply_percent(&modifier.ability.percent);
        }
        current
    }
}
