//! Collaborators injected into the engine.
//!
//! The composition root owns the movement system, the random generator,
//! and the notification sink, and lends them to the engine for the
//! duration of each call. Nothing in the engine looks them up globally.

use crate::events::EventSink;
use crate::movement::MovementSource;
use crate::random::RandomSource;

/// Borrowed collaborators.
pub struct Services<'a> {
    /// Movement and arrival.
    pub movement: &'a mut dyn MovementSource,
    /// Outcome rolls and duration draws.
    pub random: &'a mut dyn RandomSource,
    /// Notification output.
    pub events: &'a mut dyn EventSink,
}

impl<'a> Services<'a> {
    /// Bundle collaborators.
    pub const fn new(
        movement: &'a mut dyn MovementSource,
        random: &'a mut dyn RandomSource,
        events: &'a mut dyn EventSink,
    ) -> Self {
        Self {
            movement,
            random,
            events,
        }
    }
}

impl core::fmt::Debug for Services<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
