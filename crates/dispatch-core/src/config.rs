//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `dispatch-config.yaml` at the
//! project root. Every section and field has a default, so an empty file
//! is a valid (if uneventful) simulation: no agents, no calls.
//!
//! Definition records (abilities, agents, calls) are plain data. The
//! engine reads them once at startup and never mutates them.

use std::path::Path;

use dispatch_types::{AbilityDefinition, AgentDefinition, CallDefinition, Position, ResolutionTrigger};
use serde::Deserialize;
use tracing::warn;

use crate::dispatch::DEFAULT_RETAINED_MISSIONS;
use crate::scoring::ScoringConfig;

/// Environment variable that overrides `world.seed`.
pub const SEED_ENV_VAR: &str = "DISPATCH_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration. Mirrors `dispatch-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DispatchConfig {
    /// World-level settings (name, seed, timing).
    #[serde(default)]
    pub world: WorldConfig,

    /// How missions resolve.
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Success-probability scoring.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Simulation boundaries.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Automatic call spawning.
    #[serde(default)]
    pub spawning: SpawningConfig,

    /// Ability definitions.
    #[serde(default)]
    pub abilities: Vec<AbilityDefinition>,

    /// Agent definitions. Each entry spawns one agent.
    #[serde(default)]
    pub agents: Vec<AgentDefinition>,

    /// Call definitions.
    #[serde(default)]
    pub calls: Vec<CallDefinition>,
}

impl DispatchConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `DISPATCH_SEED` overrides `world.seed` when set to a valid `u64`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.world
            .apply_seed_override(std::env::var(SEED_ENV_VAR).ok().as_deref());
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds between ticks (0 = as fast as possible).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Simulated seconds per tick.
    #[serde(default = "default_seconds_per_tick")]
    pub seconds_per_tick: f64,
}

impl WorldConfig {
    /// Replace the seed with `value` if it parses as a `u64`.
    pub fn apply_seed_override(&mut self, value: Option<&str>) {
        let Some(raw) = value else {
            return;
        };
        match raw.trim().parse::<u64>() {
            Ok(seed) => self.seed = seed,
            Err(err) => warn!(value = raw, error = %err, "Ignoring invalid DISPATCH_SEED"),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            seconds_per_tick: default_seconds_per_tick(),
        }
    }
}

/// Resolution configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResolutionConfig {
    /// Time-driven or arrival-driven resolution.
    #[serde(default)]
    pub trigger: ResolutionTrigger,

    /// Where agents return after a mission.
    #[serde(default)]
    pub base_location: Position,

    /// How many finished missions (and resolution records) are kept for
    /// lookup before the oldest are dropped.
    #[serde(default = "default_retained_missions")]
    pub retained_missions: usize,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            trigger: ResolutionTrigger::default(),
            base_location: Position::default(),
            retained_missions: default_retained_missions(),
        }
    }
}

/// Simulation boundary configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Maximum number of ticks before the simulation ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Automatic call spawning, used by hosts that generate calls on their
/// own.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpawningConfig {
    /// Simulated seconds between new calls.
    #[serde(default = "default_call_interval_seconds")]
    pub call_interval_seconds: f64,

    /// No new calls while this many are open.
    #[serde(default = "default_max_open_calls")]
    pub max_open_calls: u32,

    /// One corner of the spawn rectangle.
    #[serde(default = "default_area_min")]
    pub area_min: Position,

    /// The opposite corner of the spawn rectangle.
    #[serde(default = "default_area_max")]
    pub area_max: Position,
}

impl Default for SpawningConfig {
    fn default() -> Self {
        Self {
            call_interval_seconds: default_call_interval_seconds(),
            max_open_calls: default_max_open_calls(),
            area_min: default_area_min(),
            area_max: default_area_max(),
        }
    }
}

fn default_world_name() -> String {
    "Dispatch".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    250
}

const fn default_seconds_per_tick() -> f64 {
    0.5
}

const fn default_retained_missions() -> usize {
    DEFAULT_RETAINED_MISSIONS
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_call_interval_seconds() -> f64 {
    15.0
}

const fn default_max_open_calls() -> u32 {
    3
}

const fn default_area_min() -> Position {
    Position::new(-50.0, -50.0, 0.0)
}

const fn default_area_max() -> Position {
    Position::new(50.0, 50.0, 0.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use dispatch_types::{AbilityTrigger, CallRequirement, StatProfile};

    use super::*;
    use crate::scoring::{RatioMode, ShapingCurve};

    #[test]
    fn default_config_is_valid() {
        let config = DispatchConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.seconds_per_tick, 0.5);
        assert_eq!(config.resolution.trigger, ResolutionTrigger::Time);
        assert_eq!(config.resolution.retained_missions, 256);
        assert_eq!(config.scoring.ratio_mode, RatioMode::Uncapped);
        assert_eq!(config.simulation.max_ticks, 0);
        assert!(config.agents.is_empty());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  name: Harbor District
  seed: 9
  tick_interval_ms: 100
  seconds_per_tick: 1.0
resolution:
  trigger: arrival
  base_location: { x: 1.0, y: 2.0 }
  retained_missions: 16
scoring:
  weighted:
    luck_per_point: 0.01
  curve:
    kind: power
    exponent: 2.0
  ratio_mode: capped
simulation:
  max_ticks: 500
logging:
  level: debug
  format: json
spawning:
  call_interval_seconds: 20
  max_open_calls: 5
abilities:
  - id: adrenaline
    display_name: Adrenaline
    duration_seconds: 8
    trigger: mission_start
    flat: { fighting: 10 }
    percent: { mobility: 0.5 }
agents:
  - id: rookie
    display_name: Rookie
    base_stats: { fighting: 6, defense: 4, mobility: 5, luck: 3, intelligence: 5, charisma: 5, mental_stability: 6 }
    abilities: [adrenaline]
calls:
  - id: bar_fight
    title: Bar fight
    requirement:
      required: { fighting: 40, defense: 40 }
    base_difficulty: 1.0
    time_limit_seconds: 45
  - id: lost_cat
    title: Lost cat
";
        let config = DispatchConfig::parse(yaml).unwrap();
        assert_eq!(config.world.name, "Harbor District");
        assert_eq!(config.resolution.trigger, ResolutionTrigger::Arrival);
        assert_eq!(config.resolution.base_location, Position::new(1.0, 2.0, 0.0));
        assert_eq!(config.resolution.retained_missions, 16);
        assert_eq!(config.scoring.weighted.luck_per_point, 0.01);
        assert_eq!(config.scoring.weighted.score_weight, 0.7);
        assert_eq!(config.scoring.curve, ShapingCurve::Power { exponent: 2.0 });
        assert_eq!(config.scoring.ratio_mode, RatioMode::Capped);
        assert_eq!(config.simulation.max_ticks, 500);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.spawning.max_open_calls, 5);

        let ability = config.abilities.first().unwrap();
        assert_eq!(ability.trigger, AbilityTrigger::MissionStart);
        assert_eq!(ability.flat.fighting, 10.0);
        assert_eq!(ability.percent.mobility, 0.5);

        let agent = config.agents.first().unwrap();
        assert_eq!(agent.base_stats.mental_stability, 6.0);
        assert_eq!(agent.abilities.len(), 1);

        let bar_fight = config.calls.first().unwrap();
        assert_eq!(
            bar_fight.requirement,
            CallRequirement::Required(StatProfile {
                fighting: 40.0,
                defense: 40.0,
                ..StatProfile::ZERO
            })
        );
        assert_eq!(bar_fight.time_limit_seconds, Some(45.0));
        let lost_cat = config.calls.get(1).unwrap();
        assert_eq!(lost_cat.requirement, CallRequirement::default());
    }

    #[test]
    fn parse_empty_yaml() {
        let config = DispatchConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn seed_override_accepts_only_numbers() {
        let mut world = WorldConfig::default();
        world.apply_seed_override(None);
        assert_eq!(world.seed, 42);
        world.apply_seed_override(Some(" 77 "));
        assert_eq!(world.seed, 77);
        world.apply_seed_override(Some("not-a-seed"));
        assert_eq!(world.seed, 77);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("dispatch-config.yaml");
        if path.exists() {
            let config = DispatchConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
