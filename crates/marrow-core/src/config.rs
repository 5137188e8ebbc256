//! Configuration loading and typed config structures for Marrow Grow.
//!
//! The canonical configuration lives in `marrow-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//! Every field has a default, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use marrow_sim::EventChances;
use marrow_types::{DefenseKind, LightSource, MAX_SEED_LIVES};
use serde::Deserialize;

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

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `marrow-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Tick timing and RNG seeding.
    #[serde(default)]
    pub session: SessionConfig,

    /// Event probabilities.
    #[serde(default)]
    pub events: EventChances,

    /// Lives cap and daily spin tuning.
    #[serde(default)]
    pub lives: LivesConfig,

    /// Backend harvest sync.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Observer HTTP server.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Local profile persistence.
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Default grow selection used by the headless engine.
    #[serde(default)]
    pub selection: SelectionConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `MARROW_BACKEND_URL` overrides `sync.backend_url`
    /// - `MARROW_OBSERVER_PORT` overrides `observer.port`
    /// - `MARROW_LOG_LEVEL` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override selected values with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MARROW_BACKEND_URL") {
            self.sync.backend_url = Some(val);
        }
        if let Ok(val) = std::env::var("MARROW_OBSERVER_PORT")
            && let Ok(port) = val.parse::<u16>()
        {
            self.observer.port = port;
        }
        if let Ok(val) = std::env::var("MARROW_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.events.validate().map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })?;
        if !(0.0..=1.0).contains(&self.lives.spin_win_chance) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "lives.spin_win_chance must be within [0, 1], got {}",
                    self.lives.spin_win_chance
                ),
            });
        }
        if self.lives.daily_cap == 0 {
            return Err(ConfigError::Invalid {
                reason: String::from("lives.daily_cap must be at least 1"),
            });
        }
        Ok(())
    }
}

/// Tick timing and RNG seeding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Milliseconds between ticks (default: 1000).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Fixed RNG seed for reproducible sessions. Random when unset.
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// How long a harvested session waits for a seed search request
    /// from the observer (default: 15000). Zero skips the wait.
    #[serde(default = "default_harvest_window_ms")]
    pub harvest_window_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            rng_seed: None,
            harvest_window_ms: default_harvest_window_ms(),
        }
    }
}

/// Lives cap and daily spin tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LivesConfig {
    /// Lives restored at the first visit of each calendar day (default: 3).
    #[serde(default = "default_daily_cap")]
    pub daily_cap: u32,

    /// Chance a daily spin wins (default: 0.25).
    #[serde(default = "default_spin_win_chance")]
    pub spin_win_chance: f64,

    /// Lives awarded by a winning spin (default: 1).
    #[serde(default = "default_spin_award")]
    pub spin_award: u32,

    /// Hours between spins (default: 24).
    #[serde(default = "default_spin_cooldown_hours")]
    pub spin_cooldown_hours: u32,
}

impl Default for LivesConfig {
    fn default() -> Self {
        Self {
            daily_cap: default_daily_cap(),
            spin_win_chance: default_spin_win_chance(),
            spin_award: default_spin_award(),
            spin_cooldown_hours: default_spin_cooldown_hours(),
        }
    }
}

/// Backend harvest sync.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the player backend. Sync is disabled when unset.
    #[serde(default)]
    pub backend_url: Option<String>,

    /// Request timeout in milliseconds (default: 5000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Observer HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Whether to serve the observer API (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Port to bind (default: 8080).
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_observer_port(),
        }
    }
}

/// Local profile persistence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileConfig {
    /// JSON file holding lives, reset date, and spin timestamp.
    #[serde(default = "default_profile_path")]
    pub path: PathBuf,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            path: default_profile_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Default grow selection used by the headless engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectionConfig {
    /// Strain name.
    #[serde(default = "default_seed_name")]
    pub seed_name: String,

    /// Seed water drain rate.
    #[serde(default)]
    pub seed_water_drain_rate: Option<f64>,

    /// Seed nutrient drain rate.
    #[serde(default)]
    pub seed_nutrient_drain_rate: Option<f64>,

    /// Soil catalog id (default: `bone-dust`).
    #[serde(default = "default_soil_id")]
    pub soil: String,

    /// Defense kind (default: `pest-defense`).
    #[serde(default = "default_defense")]
    pub defense: DefenseKind,

    /// Light to install if the player has unlocked it.
    #[serde(default)]
    pub light: LightSource,

    /// Spin the daily wheel before planting when available.
    #[serde(default = "default_true")]
    pub auto_spin: bool,

    /// Fix failed lights automatically.
    #[serde(default = "default_true")]
    pub auto_fix_lights: bool,

    /// Search a harvested plant for seeds without waiting for a request.
    #[serde(default)]
    pub auto_search_seeds: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            seed_name: default_seed_name(),
            seed_water_drain_rate: None,
            seed_nutrient_drain_rate: None,
            soil: default_soil_id(),
            defense: default_defense(),
            light: LightSource::default(),
            auto_spin: true,
            auto_fix_lights: true,
            auto_search_seeds: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_harvest_window_ms() -> u64 {
    15_000
}

const fn default_daily_cap() -> u32 {
    MAX_SEED_LIVES
}

const fn default_spin_win_chance() -> f64 {
    0.25
}

const fn default_spin_award() -> u32 {
    1
}

const fn default_spin_cooldown_hours() -> u32 {
    24
}

const fn default_request_timeout_ms() -> u64 {
    5000
}

const fn default_true() -> bool {
    true
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_profile_path() -> PathBuf {
    PathBuf::from("marrow-profile.json")
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_seed_name() -> String {
    String::from("Marrow Kush")
}

fn default_soil_id() -> String {
    String::from("bone-dust")
}

const fn default_defense() -> DefenseKind {
    DefenseKind::PestDefense
}
