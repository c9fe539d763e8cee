//! Success-probability scoring.
//!
//! Two formulations are supported, selected per call by its
//! [`CallRequirement`]:
//!
//! - **Weighted score**: each agent's current stats are scored against
//!   per-stat weights, averaged across the team, blended with a luck boost
//!   and a mental-stability factor, scaled by a difficulty factor, and
//!   finally passed through a monotonic [`ShapingCurve`].
//! - **Required profile**: the team's combined stats are compared
//!   component-wise against a required profile. Ratios are averaged and
//!   divided by the call's base difficulty.
//!
//! Everything here is pure. The only randomness in resolution is the
//! single outcome roll in [`crate::outcome`].

use dispatch_types::{CallDefinition, CallRequirement, Stat, StatProfile};
use serde::Deserialize;

/// Lowest base difficulty used as a divisor in the required-profile variant.
pub const MIN_REQUIRED_DIFFICULTY: f64 = 0.1;

/// Clamp to `[0, 1]`. NaN becomes 0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Where `value` sits between `a` and `b`, clamped to `[0, 1]`.
///
/// `a` may be greater than `b`, in which case the result decreases as
/// `value` grows. A zero-width range yields 0.
pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    let span = b - a;
    if span.abs() < f64::EPSILON {
        return 0.0;
    }
    clamp01((value - a) / span)
}

/// A monotonic non-decreasing map from `[0, 1]` to `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapingCurve {
    /// Identity.
    #[default]
    Linear,
    /// `x^exponent`. Non-positive or non-finite exponents behave as 1.
    Power {
        /// Curve exponent.
        exponent: f64,
    },
    /// Hermite smoothstep `3x^2 - 2x^3`.
    SmoothStep,
    /// Linear interpolation through control points.
    ///
    /// Points are sorted by `x` and `y` is forced non-decreasing, so a
    /// badly written table still yields a monotonic curve. Inputs outside
    /// the table take the nearest endpoint's value; an empty table is the
    /// identity.
    Piecewise {
        /// Control points.
        points: Vec<CurvePoint>,
    },
}

/// One control point of a [`ShapingCurve::Piecewise`] curve.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CurvePoint {
    /// Input.
    pub x: f64,
    /// Output.
    pub y: f64,
}

impl ShapingCurve {
    /// Evaluate the curve. Input and output are clamped to `[0, 1]`.
    pub fn evaluate(&self, input: f64) -> f64 {
        let x = clamp01(input);
        let y = match self {
            Self::Linear => x,
            Self::Power { exponent } => {
                if exponent.is_finite() && *exponent > 0.0 {
                    x.powf(*exponent)
                } else {
                    x
                }
            }
            Self::SmoothStep => x * x * 2.0f64.mul_add(-x, 3.0),
            Self::Piecewise { points } => piecewise(points, x),
        };
        clamp01(y)
    }
}

fn piecewise(points: &[CurvePoint], x: f64) -> f64 {
    let mut table: Vec<CurvePoint> = points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    if table.is_empty() {
        return x;
    }
    table.sort_by(|a, b| a.x.total_cmp(&b.x));
    let mut floor = f64::NEG_INFINITY;
    for point in &mut table {
        floor = floor.max(point.y);
        point.y = floor;
    }

    let mut previous: Option<CurvePoint> = None;
    for point in &table {
        if x <= point.x {
            return match previous {
                None => point.y,
                Some(prev) => {
                    let t = inverse_lerp(prev.x, point.x, x);
                    (point.y - prev.y).mul_add(t, prev.y)
                }
            };
        }
        previous = Some(*point);
    }
    previous.map_or(x, |last| last.y)
}

/// Coefficients of the weighted-score formulation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeightedScoring {
    /// Share of the average agent score in the raw probability.
    #[serde(default = "default_score_weight")]
    pub score_weight: f64,

    /// Share of the luck boost in the raw probability.
    #[serde(default = "default_luck_weight")]
    pub luck_weight: f64,

    /// Share of the stability factor in the raw probability.
    #[serde(default = "default_stability_weight")]
    pub stability_weight: f64,

    /// Luck boost per point of luck, summed over the team.
    #[serde(default = "default_luck_per_point")]
    pub luck_per_point: f64,

    /// Stat value that counts as "fully meeting" a weight.
    #[serde(default = "default_stat_scale")]
    pub stat_scale: f64,

    /// Mental stability at or below which the stability factor is 0.
    #[serde(default = "default_stability_low")]
    pub stability_low: f64,

    /// Mental stability at or above which the stability factor is 1.
    #[serde(default = "default_stability_high")]
    pub stability_high: f64,

    /// Difficulty at which the difficulty factor reaches 0.
    #[serde(default = "default_max_difficulty")]
    pub max_difficulty: f64,
}

impl Default for WeightedScoring {
    fn default() -> Self {
        Self {
            score_weight: default_score_weight(),
            luck_weight: default_luck_weight(),
            stability_weight: default_stability_weight(),
            luck_per_point: default_luck_per_point(),
            stat_scale: default_stat_scale(),
            stability_low: default_stability_low(),
            stability_high: default_stability_high(),
            max_difficulty: default_max_difficulty(),
        }
    }
}

/// Whether required-profile ratios may exceed 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioMode {
    /// Surplus in one stat can offset deficits elsewhere.
    #[default]
    Uncapped,
    /// Each ratio is capped at 1.
    Capped,
}

/// Scoring configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScoringConfig {
    /// Weighted-score coefficients.
    #[serde(default)]
    pub weighted: WeightedScoring,

    /// Shaping curve applied to weighted-score probabilities.
    #[serde(default)]
    pub curve: ShapingCurve,

    /// Ratio handling in the required-profile variant.
    #[serde(default)]
    pub ratio_mode: RatioMode,
}

impl ScoringConfig {
    /// Success probability for `team` (current stats, one entry per
    /// agent) against `call`. An empty team scores 0.
    pub fn probability(&self, call: &CallDefinition, team: &[StatProfile]) -> f64 {
        match &call.requirement {
            CallRequirement::Weighted(weights) => weighted_probability(
                weights,
                call.base_difficulty,
                team,
                &self.weighted,
                &self.curve,
            ),
            CallRequirement::Required(required) => {
                required_probability(required, call.base_difficulty, team, self.ratio_mode)
            }
        }
    }
}

/// One agent's weighted score in `[0, 1]`.
///
/// Negative weights count as 0. When no weight is positive the score is 0.
pub fn agent_score(weights: &StatProfile, stats: &StatProfile, stat_scale: f64) -> f64 {
    let weights = weights.map(|w| if w.is_finite() { w.max(0.0) } else { 0.0 });
    let weight_sum = weights.total();
    let weight_sum = if weight_sum > 0.0 { weight_sum } else { 1.0 };
    let scale = if stat_scale > 0.0 { stat_scale } else { 1.0 };
    let weighted: f64 = Stat::ALL
        .iter()
        .map(|&stat| weights.get(stat) * stats.get(stat))
        .sum();
    clamp01(weighted / (weight_sum * scale))
}

/// Weighted-score probability.
pub fn weighted_probability(
    weights: &StatProfile,
    base_difficulty: f64,
    team: &[StatProfile],
    coefficients: &WeightedScoring,
    curve: &ShapingCurve,
) -> f64 {
    if team.is_empty() {
        return 0.0;
    }
    let count = team.len() as f64;
    let avg_score = team
        .iter()
        .map(|stats| agent_score(weights, stats, coefficients.stat_scale))
        .sum::<f64>()
        / count;
    let luck_boost: f64 = team
        .iter()
        .map(|stats| stats.luck * coefficients.luck_per_point)
        .sum();
    let min_stability = team
        .iter()
        .map(|stats| stats.mental_stability)
        .fold(f64::INFINITY, f64::min);
    let stability_factor = inverse_lerp(
        coefficients.stability_low,
        coefficients.stability_high,
        min_stability,
    );
    let diff_factor = inverse_lerp(coefficients.max_difficulty, 0.0, base_difficulty);

    let raw = clamp01(
        coefficients.stability_weight.mul_add(
            stability_factor,
            avg_score.mul_add(coefficients.score_weight, luck_boost * coefficients.luck_weight),
        ),
    );
    curve.evaluate(raw * diff_factor)
}

/// Required-profile probability.
///
/// Components whose requirement is `<= 0` count as satisfied (ratio 1).
pub fn required_probability(
    required: &StatProfile,
    base_difficulty: f64,
    team: &[StatProfile],
    mode: RatioMode,
) -> f64 {
    if team.is_empty() {
        return 0.0;
    }
    let combined: StatProfile = team.iter().sum();
    let ratio_sum: f64 = Stat::ALL
        .iter()
        .map(|&stat| {
            let need = required.get(stat);
            let ratio = if need > 0.0 {
                combined.get(stat) / need
            } else {
                1.0
            };
            match mode {
                RatioMode::Uncapped => ratio,
                RatioMode::Capped => ratio.min(1.0),
            }
        })
        .sum();
    let average = ratio_sum / Stat::COUNT as f64;
    let difficulty = if base_difficulty.is_nan() {
        1.0
    } else {
        base_difficulty.max(MIN_REQUIRED_DIFFICULTY)
    };
    clamp01(average / difficulty)
}

const fn default_score_weight() -> f64 {
    0.7
}

const fn default_luck_weight() -> f64 {
    0.2
}

const fn default_stability_weight() -> f64 {
    0.1
}

const fn default_luck_per_point() -> f64 {
    0.02
}

const fn default_stat_scale() -> f64 {
    10.0
}

const fn default_stability_low() -> f64 {
    2.0
}

const fn default_stability_high() -> f64 {
    10.0
}

const fn default_max_difficulty() -> f64 {
    10.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use dispatch_types::CallDefinitionId;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    const TOLERANCE: f64 = 1e-4;

    fn call(requirement: CallRequirement, base_difficulty: f64) -> CallDefinition {
        CallDefinition {
            id: CallDefinitionId::new("test"),
            title: String::from("Test"),
            description: String::new(),
            requirement,
            base_difficulty,
            recommended_agents: 1,
            min_duration_seconds: 10.0,
            max_duration_seconds: 30.0,
            time_limit_seconds: None,
        }
    }

    #[test]
    fn inverse_lerp_clamps_and_handles_reversed_ranges() {
        assert_eq!(inverse_lerp(2.0, 10.0, 6.0), 0.5);
        assert_eq!(inverse_lerp(2.0, 10.0, -4.0), 0.0);
        assert_eq!(inverse_lerp(2.0, 10.0, 40.0), 1.0);
        assert_eq!(inverse_lerp(10.0, 0.0, 5.0), 0.5);
        assert_eq!(inverse_lerp(10.0, 0.0, 12.0), 0.0);
        assert_eq!(inverse_lerp(10.0, 0.0, -1.0), 1.0);
        assert_eq!(inverse_lerp(3.0, 3.0, 3.0), 0.0);
    }

    #[test]
    fn required_profile_surplus_offsets_missing_requirements() {
        let required = StatProfile {
            fighting: 40.0,
            defense: 40.0,
            ..StatProfile::ZERO
        };
        let a = StatProfile {
            fighting: 50.0,
            defense: 30.0,
            ..StatProfile::ZERO
        };
        let b = StatProfile {
            fighting: 30.0,
            defense: 30.0,
            ..StatProfile::ZERO
        };
        let team = [a, b];
        let cfg = ScoringConfig::default();
        let p = cfg.probability(&call(CallRequirement::Required(required), 1.0), &team);
        assert_eq!(p, 1.0);

        // Average before clamping: (2.0 + 1.5 + 5 * 1.0) / 7.
        let unclamped = required_probability(&required, 10.0, &team, RatioMode::Uncapped);
        assert!((unclamped - (8.5 / 7.0) / 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn capped_ratios_never_exceed_one() {
        let required = StatProfile {
            fighting: 40.0,
            defense: 40.0,
            ..StatProfile::ZERO
        };
        let team = [StatProfile {
            fighting: 80.0,
            defense: 20.0,
            ..StatProfile::ZERO
        }];
        let uncapped = required_probability(&required, 1.0, &team, RatioMode::Uncapped);
        let capped = required_probability(&required, 1.0, &team, RatioMode::Capped);
        assert_eq!(uncapped, 1.0);
        assert!((capped - 6.5 / 7.0).abs() < TOLERANCE);
    }

    #[test]
    fn weighted_uniform_agent_at_mid_difficulty() {
        let team = [StatProfile::splat(50.0)];
        let cfg = ScoringConfig::default();
        let p = cfg.probability(
            &call(CallRequirement::Weighted(StatProfile::splat(1.0 / 7.0)), 5.0),
            &team,
        );
        assert!((p - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn weighted_reference_values() {
        // score = (0.2*6 + 0.2*4 + 0.2*5 + 0.1*3 + 0.15*5 + 0.1*5 + 0.05*6) / 10
        //       = 0.485
        // luck = 3 * 0.02 = 0.06; stability = (6 - 2) / 8 = 0.5
        // raw = 0.485*0.7 + 0.06*0.2 + 0.5*0.1 = 0.4015; diff = 0.7
        let stats = StatProfile::new(6.0, 4.0, 5.0, 3.0, 5.0, 5.0, 6.0);
        let cfg = ScoringConfig::default();
        let p = cfg.probability(&call(CallRequirement::default(), 3.0), &[stats]);
        assert!((p - 0.4015 * 0.7).abs() < TOLERANCE);
    }

    #[test]
    fn negative_weights_count_as_zero() {
        let weights = StatProfile {
            fighting: 1.0,
            defense: -5.0,
            ..StatProfile::ZERO
        };
        let stats = StatProfile {
            fighting: 10.0,
            defense: 100.0,
            ..StatProfile::ZERO
        };
        assert_eq!(agent_score(&weights, &stats, 10.0), 1.0);
        assert_eq!(agent_score(&StatProfile::ZERO, &stats, 10.0), 0.0);
    }

    #[test]
    fn empty_team_scores_zero() {
        let cfg = ScoringConfig::default();
        assert_eq!(cfg.probability(&call(CallRequirement::default(), 0.0), &[]), 0.0);
        let required = CallRequirement::Required(StatProfile::ZERO);
        assert_eq!(cfg.probability(&call(required, 1.0), &[]), 0.0);
    }

    #[test]
    fn curves_are_monotonic_and_bounded() {
        let curves = [
            ShapingCurve::Linear,
            ShapingCurve::Power { exponent: 2.0 },
            ShapingCurve::Power { exponent: -1.0 },
            ShapingCurve::SmoothStep,
            ShapingCurve::Piecewise {
                points: vec![
                    CurvePoint { x: 0.8, y: 0.6 },
                    CurvePoint { x: 0.2, y: 0.3 },
                    CurvePoint { x: 0.5, y: 0.1 },
                ],
            },
        ];
        for curve in &curves {
            let mut last = curve.evaluate(-1.0);
            for step in 0..=100 {
                let y = curve.evaluate(f64::from(step) / 100.0);
                assert!((0.0..=1.0).contains(&y));
                assert!(y >= last, "{curve:?} decreased at step {step}");
                last = y;
            }
        }
    }

    #[test]
    fn piecewise_interpolates_between_points() {
        let curve = ShapingCurve::Piecewise {
            points: vec![CurvePoint { x: 0.0, y: 0.0 }, CurvePoint { x: 1.0, y: 0.5 }],
        };
        assert!((curve.evaluate(0.5) - 0.25).abs() < TOLERANCE);
        assert_eq!(curve.evaluate(2.0), 0.5);
    }

    #[test]
    fn weighted_probability_is_monotonic_in_each_stat() {
        let cfg = ScoringConfig::default();
        let definition = call(CallRequirement::default(), 4.0);
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..200 {
            let base = StatProfile::from_fn(|_| rng.random_range(0.0..20.0));
            let p = cfg.probability(&definition, &[base]);
            for stat in Stat::ALL {
                let mut bumped = base;
                bumped.set(stat, base.get(stat) + rng.random_range(0.0..10.0));
                let q = cfg.probability(&definition, &[bumped]);
                assert!(q + 1e-12 >= p, "{stat} bump lowered probability");
            }
        }
    }

    #[test]
    fn required_probability_is_monotonic_in_each_stat() {
        let required = StatProfile::splat(20.0);
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..200 {
            let base = StatProfile::from_fn(|_| rng.random_range(0.0..40.0));
            let p = required_probability(&required, 2.0, &[base], RatioMode::Uncapped);
            for stat in Stat::ALL {
                let mut bumped = base;
                bumped.set(stat, base.get(stat) + 1.0);
                let q = required_probability(&required, 2.0, &[bumped], RatioMode::Uncapped);
                assert!(q + 1e-12 >= p);
            }
        }
    }
}
