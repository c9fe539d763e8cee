//! World positions.
//!
//! The core never moves anything; positions exist so the movement
//! collaborator can be told where to go and so travel time can be
//! estimated from distance.

use serde::{Deserialize, Serialize};

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    /// East-west coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// North-south coordinate.
    pub z: f64,
}

impl Position {
    /// The world origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a position.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Straight-line distance to `other`.
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy)).sqrt()
    }

    /// Move from `self` toward `target` by at most `step`, stopping on it.
    pub fn step_toward(&self, target: &Self, step: f64) -> Self {
        let remaining = self.distance(target);
        if remaining <= step || remaining <= f64::EPSILON {
            return *target;
        }
        let t = step / remaining;
        Self::new(
            (target.x - self.x).mul_add(t, self.x),
            (target.y - self.y).mul_add(t, self.y),
            (target.z - self.z).mul_add(t, self.z),
        )
    }
}
