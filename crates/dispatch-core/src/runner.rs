//! Simulation loop runner.
//!
//! [`run_simulation`] wraps the single-tick [`run_tick`] in the control
//! plane: tick bounds, pause and resume, a runtime-adjustable tick
//! interval, and a clean stop requested through [`RunControl`].
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::Arc;

use tracing::{info, warn};

use crate::control::{RunControl, SimulationEndReason};
use crate::director::DispatchDirector;
use crate::services::Services;
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
    /// Missions resolved over the whole run.
    pub total_resolved: usize,
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run the tick loop until the tick limit is reached or a stop is
/// requested.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails unrecoverably.
pub async fn run_simulation(
    state: &mut SimulationState,
    director: &mut dyn DispatchDirector,
    services: &mut Services<'_>,
    control: &Arc<RunControl>,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut total_resolved: usize = 0;

    info!(
        max_ticks = control.max_ticks(),
        tick_interval_ms = control.tick_interval_ms(),
        seconds_per_tick = state.clock.seconds_per_tick(),
        "Simulation starting"
    );

    loop {
        // --- Check pause ---
        if control.is_paused() {
            info!("Simulation paused, waiting for resume...");
            control.wait_if_paused().await;
            info!("Simulation resumed");
        }

        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            info!("Stop requested");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::Stopped,
                final_summary: last_summary,
                total_ticks,
                total_resolved,
            });
        }

        // --- Execute tick ---
        let summary = tick::run_tick(state, director, services)?;
        total_ticks = total_ticks.saturating_add(1);
        total_resolved = total_resolved.saturating_add(summary.resolutions.len());

        callback.on_tick(&summary, state);

        // --- Check tick limit (after tick) ---
        if control.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = control.max_ticks(),
                "Tick limit reached"
            );
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
                total_resolved,
            });
        }

        last_summary = Some(summary);

        // --- Sleep for tick interval ---
        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult, state: &SimulationState) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        total_resolved = result.total_resolved,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            sim_time = summary.sim_time,
            open_calls = summary.open_calls,
            available_agents = summary.available_agents,
            retained_history = state.coordinator.history().len(),
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use dispatch_types::{CallDefinitionId, Position};

    use super::*;
    use crate::config::{DispatchConfig, SimulationBoundsConfig};
    use crate::director::{DispatchOrder, ScriptedDirector, StubDirector};
    use crate::events::EventLog;
    use crate::movement::ScriptedMovement;
    use crate::random::SequenceSource;

    fn state() -> SimulationState {
        let config = DispatchConfig::parse(
            r"
world:
  seconds_per_tick: 1.0
agents:
  - id: rookie
calls:
  - id: noise
    min_duration_seconds: 2
    max_duration_seconds: 2
",
        )
        .unwrap();
        SimulationState::from_config(&config).unwrap()
    }

    fn control(max_ticks: u64) -> Arc<RunControl> {
        Arc::new(RunControl::new(0, &SimulationBoundsConfig { max_ticks }))
    }

    struct Counter(u64);

    impl TickCallback for Counter {
        fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {
            self.0 = self.0.saturating_add(1);
        }
    }

    #[tokio::test]
    async fn stops_at_tick_limit() {
        let mut state = state();
        let mut movement = ScriptedMovement::instant();
        let mut random = SequenceSource::new([0.5]);
        let mut events = EventLog::new();
        let mut services = Services::new(&mut movement, &mut random, &mut events);
        let ctl = control(5);
        let mut counter = Counter(0);

        let result = run_simulation(
            &mut state,
            &mut StubDirector::new(),
            &mut services,
            &ctl,
            &mut counter,
        )
        .await
        .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(counter.0, 5);
        assert_eq!(result.final_summary.unwrap().tick, 5);
    }

    struct SharedCounter(Arc<AtomicU64>);

    impl TickCallback for SharedCounter {
        fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {
            self.0.fetch_add(1, Ordering::AcqRel);
        }
    }

    #[tokio::test]
    async fn paused_loop_runs_no_ticks_until_resumed() {
        let mut state = state();
        let mut movement = ScriptedMovement::instant();
        let mut random = SequenceSource::new([0.5]);
        let mut events = EventLog::new();
        let mut services = Services::new(&mut movement, &mut random, &mut events);
        let ctl = control(3);
        let ticks = Arc::new(AtomicU64::new(0));
        let mut counter = SharedCounter(Arc::clone(&ticks));
        ctl.pause();

        let mut director = StubDirector::new();
        let run = run_simulation(&mut state, &mut director, &mut services, &ctl, &mut counter);
        let host = async {
            tokio::time::sleep(tokio::time::Duration::from_millis(30)).await;
            let seen = ticks.load(Ordering::Acquire);
            ctl.resume();
            seen
        };
        let (result, ticks_while_paused) = tokio::join!(run, host);

        assert_eq!(ticks_while_paused, 0);
        let result = result.unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 3);
    }

    #[tokio::test]
    async fn stop_before_first_tick_runs_nothing() {
        let mut state = state();
        let mut movement = ScriptedMovement::instant();
        let mut random = SequenceSource::new([0.5]);
        let mut events = EventLog::new();
        let mut services = Services::new(&mut movement, &mut random, &mut events);
        let ctl = control(0);
        ctl.request_stop();

        let result = run_simulation(
            &mut state,
            &mut StubDirector::new(),
            &mut services,
            &ctl,
            &mut NoOpCallback,
        )
        .await
        .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::Stopped);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
        assert_eq!(state.clock.tick(), 0);
    }

    #[tokio::test]
    async fn counts_resolutions_across_ticks() {
        let mut state = state();
        let mut movement = ScriptedMovement::instant();
        let mut random = SequenceSource::new([0.0]);
        let mut events = EventLog::new();
        let mut services = Services::new(&mut movement, &mut random, &mut events);
        let mut director = ScriptedDirector::new().at_tick(
            1,
            DispatchOrder::CreateCall {
                call: CallDefinitionId::new("noise"),
                position: Position::ORIGIN,
            },
        );

        let result = run_simulation(
            &mut state,
            &mut director,
            &mut services,
            &control(4),
            &mut NoOpCallback,
        )
        .await
        .unwrap();

        assert_eq!(result.total_resolved, 1);
        assert_eq!(state.coordinator.history().len(), 1);
        log_simulation_end(&result, &state);
    }
}
