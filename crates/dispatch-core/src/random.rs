//! Injectable randomness.
//!
//! Outcome rolls and duration draws go through [`RandomSource`] so tests
//! can replace the generator with a fixed script. Every value handed to
//! the engine is sanitized into `[0, 1)`; a misbehaving source can skew
//! results but never stall the scheduler.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Largest `f64` strictly below 1.0.
pub const UNIT_MAX: f64 = 1.0 - f64::EPSILON / 2.0;

/// Clamp a raw draw into `[0, 1)`. NaN becomes 0.
pub fn sanitize_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, UNIT_MAX)
    }
}

/// A source of uniform random values.
pub trait RandomSource: Send {
    /// Next value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform value in `[min, max)`.
    ///
    /// A degenerate or inverted range yields `min`.
    fn range(&mut self, min: f64, max: f64) -> f64 {
        let unit = sanitize_unit(self.next_unit());
        if max > min {
            (max - min).mul_add(unit, min)
        } else {
            min
        }
    }
}

/// [`RandomSource`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    /// Wrap a generator.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<SmallRng> {
    /// Deterministic source for a seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        sanitize_unit(self.rng.random::<f64>())
    }
}

/// Replays a fixed list of values, cycling when it runs out.
///
/// An empty script always yields 0.0.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceSource {
    /// Create a source from a script.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Number of values drawn so far.
    pub const fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let index = self.cursor.checked_rem(self.values.len()).unwrap_or(0);
        self.cursor = self.cursor.saturating_add(1);
        sanitize_unit(self.values.get(index).copied().unwrap_or(0.0))
    }
}
