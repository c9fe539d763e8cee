//! Event sink that writes notifications to the log.

use dispatch_core::events::EventSink;
use dispatch_types::{DispatchEvent, EventKind};
use tracing::{info, warn};

/// Logs every event as a JSON payload and counts what it saw.
#[derive(Debug, Default)]
pub struct LoggingSink {
    emitted: u64,
    resolved: u64,
    expired: u64,
}

impl LoggingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events seen so far.
    pub const fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Resolution notifications seen so far.
    pub const fn resolved(&self) -> u64 {
        self.resolved
    }

    /// Expiry notifications seen so far.
    pub const fn expired(&self) -> u64 {
        self.expired
    }
}

impl EventSink for LoggingSink {
    fn emit(&mut self, event: DispatchEvent) {
        self.emitted = self.emitted.saturating_add(1);
        match event.kind {
            EventKind::MissionResolved { .. } => self.resolved = self.resolved.saturating_add(1),
            EventKind::CallExpired { .. } => self.expired = self.expired.saturating_add(1),
            _ => {}
        }
        match serde_json::to_string(&event.kind) {
            Ok(payload) => info!(
                tick = event.tick,
                sim_time = event.sim_time,
                mission_id = ?event.mission_id(),
                event = %payload,
                "Dispatch event"
            ),
            Err(err) => warn!(tick = event.tick, error = %err, "Failed to serialize event"),
        }
    }
}
