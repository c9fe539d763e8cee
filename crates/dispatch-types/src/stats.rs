//! Stat profiles: the seven-component numeric vector every agent carries.
//!
//! A [`StatProfile`] is deliberately unbounded. Ability modifiers and
//! multi-agent aggregation routinely push components past 100 (or below
//! 0), and the resolution math consumes those raw values so over-specced
//! teams can compensate for difficulty. Only [`StatProfile::clamped`]
//! produces the bounded [`STAT_MIN`]..=[`STAT_MAX`] view used for display.
//!
//! All operations here are pure and total: any float input yields a
//! defined output, and nothing returns an error.

use core::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Lower bound of a clamped stat component.
pub const STAT_MIN: f64 = 0.0;

/// Upper bound of a clamped stat component.
pub const STAT_MAX: f64 = 100.0;

/// One of the seven stat components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    /// Close-quarters combat ability.
    Fighting,
    /// Ability to absorb or avoid harm.
    Defense,
    /// Movement speed; also drives travel-time estimates.
    Mobility,
    /// Raw fortune; feeds the luck boost in weighted scoring.
    Luck,
    /// Problem solving.
    Intelligence,
    /// Persuasion and de-escalation.
    Charisma,
    /// Composure under pressure; the team minimum gates weighted scoring.
    MentalStability,
}

impl Stat {
    /// Every stat, in canonical order.
    pub const ALL: [Self; 7] = [
        Self::Fighting,
        Self::Defense,
        Self::Mobility,
        Self::Luck,
        Self::Intelligence,
        Self::Charisma,
        Self::MentalStability,
    ];

    /// Number of stat components.
    pub const COUNT: usize = 7;
}

impl core::fmt::Display for Stat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Fighting => "fighting",
            Self::Defense => "defense",
            Self::Mobility => "mobility",
            Self::Luck => "luck",
            Self::Intelligence => "intelligence",
            Self::Charisma => "charisma",
            Self::MentalStability => "mental_stability",
        };
        f.write_str(name)
    }
}

/// A seven-component stat vector.
///
/// Missing components deserialize as `0.0`, so configuration files only
/// need to list the stats they care about.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatProfile {
    /// Close-quarters combat ability.
    pub fighting: f64,
    /// Ability to absorb or avoid harm.
    pub defense: f64,
    /// Movement speed.
    pub mobility: f64,
    /// Raw fortune.
    pub luck: f64,
    /// Problem solving.
    pub intelligence: f64,
    /// Persuasion and de-escalation.
    pub charisma: f64,
    /// Composure under pressure.
    pub mental_stability: f64,
}

impl StatProfile {
    /// The all-zero profile.
    pub const ZERO: Self = Self::splat(0.0);

    /// Build a profile from its seven components in canonical order.
    pub const fn new(
        fighting: f64,
        defense: f64,
        mobility: f64,
        luck: f64,
        intelligence: f64,
        charisma: f64,
        mental_stability: f64,
    ) -> Self {
        Self {
            fighting,
            defense,
            mobility,
            luck,
            intelligence,
            charisma,
            mental_stability,
        }
    }

    /// Build a profile with every component set to `value`.
    pub const fn splat(value: f64) -> Self {
        Self::new(value, value, value, value, value, value, value)
    }

    /// Build a profile by evaluating `f` for each stat.
    pub fn from_fn(mut f: impl FnMut(Stat) -> f64) -> Self {
        Self::new(
            f(Stat::Fighting),
            f(Stat::Defense),
            f(Stat::Mobility),
            f(Stat::Luck),
            f(Stat::Intelligence),
            f(Stat::Charisma),
            f(Stat::MentalStability),
        )
    }

    /// Read a single component.
    pub const fn get(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Fighting => self.fighting,
            Stat::Defense => self.defense,
            Stat::Mobility => self.mobility,
            Stat::Luck => self.luck,
            Stat::Intelligence => self.intelligence,
            Stat::Charisma => self.charisma,
            Stat::MentalStability => self.mental_stability,
        }
    }

    /// Overwrite a single component.
    pub const fn set(&mut self, stat: Stat, value: f64) {
        match stat {
            Stat::Fighting => self.fighting = value,
            Stat::Defense => self.defense = value,
            Stat::Mobility => self.mobility = value,
            Stat::Luck => self.luck = value,
            Stat::Intelligence => self.intelligence = value,
            Stat::Charisma => self.charisma = value,
            Stat::MentalStability => self.mental_stability = value,
        }
    }

    /// Apply `f` to every component pairwise with `other`.
    pub fn zip_with(&self, other: &Self, mut f: impl FnMut(f64, f64) -> f64) -> Self {
        Self::from_fn(|stat| f(self.get(stat), other.get(stat)))
    }

    /// Apply `f` to every component.
    pub fn map(&self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self::from_fn(|stat| f(self.get(stat)))
    }

    /// Iterate `(stat, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Stat, f64)> + '_ {
        Stat::ALL.iter().map(move |&stat| (stat, self.get(stat)))
    }

    /// Return a copy with every component multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    /// Sum of all seven components.
    ///
    /// Diagnostic only; the resolution math never consumes it.
    pub fn total(&self) -> f64 {
        Stat::ALL.iter().map(|&stat| self.get(stat)).sum()
    }

    /// Return a copy with every component clamped to
    /// [`STAT_MIN`]..=[`STAT_MAX`].
    ///
    /// NaN components clamp to [`STAT_MIN`], so the result is always in
    /// range.
    pub fn clamped(&self) -> Self {
        self.map(clamp_stat)
    }

    /// Component-wise percent bump: `self[i] += self[i] * percent[i]`.
    ///
    /// A percent of `1.0` doubles the component.
    pub fn apply_percent(&mut self, percent: &Self) {
        *self = self.zip_with(percent, |value, pct| value + value * pct);
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.iter().all(|(_, v)| v.is_finite())
    }
}

/// Clamp a single component, mapping NaN to the lower bound.
fn clamp_stat(value: f64) -> f64 {
    if value.is_nan() {
        STAT_MIN
    } else {
        value.clamp(STAT_MIN, STAT_MAX)
    }
}

impl Add for StatProfile {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip_with(&rhs, |a, b| a + b)
    }
}

impl AddAssign for StatProfile {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for StatProfile {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip_with(&rhs, |a, b| a - b)
    }
}

impl Mul<f64> for StatProfile {
    type Output = Self;

    fn mul(self, factor: f64) -> Self {
        self.scaled(factor)
    }
}

impl core::iter::Sum for StatProfile {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| acc + p)
    }
}

impl<'a> core::iter::Sum<&'a Self> for StatProfile {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| acc + *p)
    }
}
