//! Simulation clock.
//!
//! The tick counter is the source of truth. Simulation time in seconds is
//! derived from it (`tick * seconds_per_tick`) and never stored on its
//! own, so two runs with the same tick count agree on the time exactly.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid time configuration (e.g. zero seconds per tick).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// A point in simulation time: the tick and the seconds it maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moment {
    /// Tick number.
    pub tick: u64,
    /// Simulation seconds at this tick.
    pub now: f64,
}

impl Moment {
    /// Build a moment from explicit values.
    pub const fn new(tick: u64, now: f64) -> Self {
        Self { tick, now }
    }
}

/// Clock driving the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    /// Current tick number (0 before the first tick runs).
    tick: u64,

    /// Simulated seconds that pass per tick.
    seconds_per_tick: f64,
}

impl SimClock {
    /// Create a clock at tick 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] unless `seconds_per_tick` is
    /// finite and positive.
    pub fn new(seconds_per_tick: f64) -> Result<Self, ClockError> {
        Self::from_parts(0, seconds_per_tick)
    }

    /// Create a clock at an arbitrary tick (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] unless `seconds_per_tick` is
    /// finite and positive.
    pub fn from_parts(tick: u64, seconds_per_tick: f64) -> Result<Self, ClockError> {
        if !seconds_per_tick.is_finite() || seconds_per_tick <= 0.0 {
            return Err(ClockError::InvalidConfig {
                reason: format!("seconds_per_tick must be positive, got {seconds_per_tick}"),
            });
        }
        Ok(Self {
            tick,
            seconds_per_tick,
        })
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds per tick.
    pub const fn seconds_per_tick(&self) -> f64 {
        self.seconds_per_tick
    }

    /// Current simulation time in seconds.
    pub fn now(&self) -> f64 {
        self.tick as f64 * self.seconds_per_tick
    }

    /// Current tick and time together.
    pub fn moment(&self) -> Moment {
        Moment::new(self.tick, self.now())
    }
}
