//! Notification output.
//!
//! The engine reports call creation, dispatch, resolution, call expiry,
//! and ability changes as [`DispatchEvent`]s. Presentation layers plug in
//! through [`EventSink`]; each notification is emitted at most once per
//! instance.

use dispatch_types::{DispatchEvent, EventKind, MissionId};

/// Fire-and-forget receiver of notifications.
pub trait EventSink: Send {
    /// Accept one event.
    fn emit(&mut self, event: DispatchEvent);
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: DispatchEvent) {}
}

/// In-memory event collector.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<DispatchEvent>,
}

impl EventLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// All collected events in emission order.
    pub fn events(&self) -> &[DispatchEvent] {
        &self.events
    }

    /// Drain the collected events.
    pub fn take(&mut self) -> Vec<DispatchEvent> {
        core::mem::take(&mut self.events)
    }

    /// Number of collected events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Count events matching a predicate.
    pub fn count(&self, predicate: impl Fn(&EventKind) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(&e.kind)).count()
    }

    /// Number of resolution notifications for one mission.
    pub fn resolutions_of(&self, mission_id: MissionId) -> usize {
        self.count(|kind| {
            matches!(kind, EventKind::MissionResolved { mission_id: id, .. } if *id == mission_id)
        })
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: DispatchEvent) {
        self.events.push(event);
    }
}
