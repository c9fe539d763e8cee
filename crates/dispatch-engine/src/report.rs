//! Tick callback that keeps running outcome totals.

use dispatch_core::runner::TickCallback;
use dispatch_core::tick::{SimulationState, TickSummary};
use dispatch_types::MissionOutcome;
use tracing::info;

/// Ticks between progress lines.
const REPORT_EVERY: u64 = 20;

/// Outcome totals across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    /// Successful missions.
    pub success: u64,
    /// Partial successes.
    pub partial: u64,
    /// Failed missions.
    pub failure: u64,
    /// Calls that ran out of time. A team already on its way still
    /// resolves the mission, so these overlap with the outcome counts.
    pub expired: u64,
}

impl OutcomeTally {
    fn record(&mut self, outcome: MissionOutcome) {
        let slot = match outcome {
            MissionOutcome::Success => &mut self.success,
            MissionOutcome::PartialSuccess => &mut self.partial,
            MissionOutcome::Failure => &mut self.failure,
            MissionOutcome::Pending => return,
        };
        *slot = slot.saturating_add(1);
    }

    /// Missions that reached an outcome.
    pub const fn resolved(&self) -> u64 {
        self.success
            .saturating_add(self.partial)
            .saturating_add(self.failure)
    }
}

/// Tallies outcomes and logs progress periodically.
#[derive(Debug, Default)]
pub struct ProgressReport {
    tally: OutcomeTally,
}

impl ProgressReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Totals so far.
    pub const fn tally(&self) -> OutcomeTally {
        self.tally
    }
}

impl TickCallback for ProgressReport {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        for resolution in &summary.resolutions {
            self.tally.record(resolution.outcome);
        }
        let expired = u64::try_from(summary.expired_calls.len()).unwrap_or(u64::MAX);
        self.tally.expired = self.tally.expired.saturating_add(expired);

        if summary.tick % REPORT_EVERY == 0 {
            info!(
                tick = summary.tick,
                sim_time = summary.sim_time,
                success = self.tally.success,
                partial = self.tally.partial,
                failure = self.tally.failure,
                expired = self.tally.expired,
                open_calls = summary.open_calls,
                agents = state.coordinator.roster().len(),
                available_agents = summary.available_agents,
                "Progress"
            );
        }
    }
}
