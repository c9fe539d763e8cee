//! Outcome roll and thresholding.
//!
//! One uniform roll decides the outcome:
//!
//! | roll        | p >= 0.9       | 0.5 <= p < 0.9 | p < 0.5        |
//! |-------------|----------------|----------------|----------------|
//! | `roll <= p` | Success        | PartialSuccess | PartialSuccess |
//! | `roll > p`  | PartialSuccess | PartialSuccess | Failure        |
//!
//! A lucky low-probability success and an unlucky high-probability
//! failure both land in `PartialSuccess`.

use dispatch_types::MissionOutcome;

use crate::random::{RandomSource, sanitize_unit};

/// Probability at or above which a won roll is a full success.
pub const SUCCESS_THRESHOLD: f64 = 0.9;

/// Probability at or above which a lost roll is still a partial success.
pub const PARTIAL_THRESHOLD: f64 = 0.5;

/// A drawn roll and the outcome it produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roll {
    /// The uniform value in `[0, 1)`.
    pub value: f64,
    /// The classified outcome.
    pub outcome: MissionOutcome,
}

/// Classify a roll against a probability.
pub fn classify(probability: f64, roll: f64) -> MissionOutcome {
    if roll <= probability {
        if probability >= SUCCESS_THRESHOLD {
            MissionOutcome::Success
        } else {
            MissionOutcome::PartialSuccess
        }
    } else if probability >= PARTIAL_THRESHOLD {
        MissionOutcome::PartialSuccess
    } else {
        MissionOutcome::Failure
    }
}

/// Draw one value from `random` and classify it.
pub fn roll(probability: f64, random: &mut dyn RandomSource) -> Roll {
    let value = sanitize_unit(random.next_unit());
    Roll {
        value,
        outcome: classify(probability, value),
    }
}
