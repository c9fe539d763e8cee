//! Host-side handle on a running simulation.
//!
//! A [`RunControl`] is shared (behind an `Arc`) between the tick loop and
//! whatever drives it: a console, a signal handler, a test. The loop reads
//! it once per tick without locking; the host holds or releases the loop,
//! retunes the tick interval and asks for a stop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use crate::config::SimulationBoundsConfig;

/// Fastest tick interval a host may request, in milliseconds.
pub const MIN_TICK_INTERVAL_MS: u64 = 10;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// The tick limit was hit.
    MaxTicksReached,
    /// The host asked for a stop.
    Stopped,
}

/// Shared run state for one simulation.
#[derive(Debug)]
pub struct RunControl {
    held: AtomicBool,
    released: Notify,
    stopping: AtomicBool,
    interval_ms: AtomicU64,
    max_ticks: u64,
    started_at: DateTime<Utc>,
}

impl RunControl {
    /// Start with the configured interval and tick limit.
    pub fn new(tick_interval_ms: u64, bounds: &SimulationBoundsConfig) -> Self {
        Self {
            held: AtomicBool::new(false),
            released: Notify::new(),
            stopping: AtomicBool::new(false),
            interval_ms: AtomicU64::new(tick_interval_ms),
            max_ticks: bounds.max_ticks,
            started_at: Utc::now(),
        }
    }

    /// Whether the loop is held before its next tick.
    pub fn is_paused(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// Hold the loop before its next tick.
    pub fn pause(&self) {
        self.held.store(true, Ordering::Release);
    }

    /// Release a held loop.
    pub fn resume(&self) {
        self.release();
    }

    /// Return once the loop is not held.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() {
            self.released.notified().await;
        }
    }

    /// Ask the loop to stop before its next tick. Also releases a held
    /// loop so it can see the request.
    pub fn request_stop(&self) {
        self.stopping.store(true, Ordering::Release);
        self.release();
    }

    /// Whether a stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    /// Sleep between ticks, in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.interval_ms.load(Ordering::Acquire)
    }

    /// Change the sleep between ticks and return the old value. Intervals
    /// under [`MIN_TICK_INTERVAL_MS`] are refused with `None`.
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        (ms >= MIN_TICK_INTERVAL_MS).then(|| self.interval_ms.swap(ms, Ordering::AcqRel))
    }

    /// Configured tick limit; 0 means none.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Whether `tick` has reached a non-zero tick limit.
    pub const fn tick_limit_reached(&self, tick: u64) -> bool {
        self.max_ticks != 0 && tick >= self.max_ticks
    }

    /// Whole wall-clock seconds since the control was created.
    pub fn elapsed_seconds(&self) -> u64 {
        let seconds = (Utc::now() - self.started_at).num_seconds();
        u64::try_from(seconds).unwrap_or(0)
    }

    fn release(&self) {
        self.held.store(false, Ordering::Release);
        self.released.notify_one();
    }
}
