//! Configuration file support for rplan.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/rplan/config.toml`.
//! Every section is optional and falls back to the built-in defaults.

use crate::{Error, ExerciseRecord, Result, UserPreferences};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub builder: BuilderConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub profile: UserPreferences,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Tolerances used by the constraint validator
///
/// Durations are in minutes; fractions are of the user's session length.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ValidationConfig {
    #[serde(default = "default_min_name_len")]
    pub min_name_len: usize,

    #[serde(default = "default_beginner_max_sets")]
    pub beginner_max_sets: u32,

    #[serde(default = "default_fifteen")]
    pub duration_tolerance_floor_minutes: f64,

    #[serde(default = "default_duration_tolerance_fraction")]
    pub duration_tolerance_fraction: f64,

    #[serde(default = "default_fifteen")]
    pub budget_overrun_floor_minutes: f64,

    #[serde(default = "default_budget_overrun_fraction")]
    pub budget_overrun_fraction: f64,

    #[serde(default = "default_min_duration_floor")]
    pub min_duration_floor_minutes: f64,

    #[serde(default = "default_min_duration_fraction")]
    pub min_duration_fraction: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_name_len: default_min_name_len(),
            beginner_max_sets: default_beginner_max_sets(),
            duration_tolerance_floor_minutes: default_fifteen(),
            duration_tolerance_fraction: default_duration_tolerance_fraction(),
            budget_overrun_floor_minutes: default_fifteen(),
            budget_overrun_fraction: default_budget_overrun_fraction(),
            min_duration_floor_minutes: default_min_duration_floor(),
            min_duration_fraction: default_min_duration_fraction(),
        }
    }
}

impl ValidationConfig {
    /// Allowed gap between stated and computed duration
    pub fn duration_tolerance(&self, session_minutes: u32) -> f64 {
        self.duration_tolerance_floor_minutes
            .max(self.duration_tolerance_fraction * f64::from(session_minutes))
    }

    /// Longest acceptable workout for the session length
    pub fn max_duration(&self, session_minutes: u32) -> f64 {
        let session = f64::from(session_minutes);
        session
            + self
                .budget_overrun_floor_minutes
                .max(self.budget_overrun_fraction * session)
    }

    /// Shortest acceptable workout for the session length
    pub fn min_duration(&self, session_minutes: u32) -> f64 {
        self.min_duration_floor_minutes
            .max(self.min_duration_fraction * f64::from(session_minutes))
    }
}

/// Fallbacks applied when the model leaves out sets, reps or rest
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BuilderConfig {
    #[serde(default = "default_sets")]
    pub default_sets: u32,

    #[serde(default = "default_reps")]
    pub default_reps: u32,

    #[serde(default = "default_rest_seconds")]
    pub default_rest_seconds: u32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            default_sets: default_sets(),
            default_reps: default_reps(),
            default_rest_seconds: default_rest_seconds(),
        }
    }
}

/// Completion backend limits
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_max_usage")]
    pub max_usage: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            max_usage: default_max_usage(),
        }
    }
}

/// Extra exercises appended to the built-in catalog
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub custom: Vec<ExerciseRecord>,
}

// Default value functions
fn default_min_name_len() -> usize {
    3
}

fn default_beginner_max_sets() -> u32 {
    24
}

fn default_fifteen() -> f64 {
    15.0
}

fn default_duration_tolerance_fraction() -> f64 {
    0.6
}

fn default_budget_overrun_fraction() -> f64 {
    0.5
}

fn default_min_duration_floor() -> f64 {
    10.0
}

fn default_min_duration_fraction() -> f64 {
    0.25
}

fn default_sets() -> u32 {
    3
}

fn default_reps() -> u32 {
    8
}

fn default_rest_seconds() -> u32 {
    crate::duration::DEFAULT_REST_SECONDS
}

fn default_max_usage() -> u32 {
    1000
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.check()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values that would make every template fail or pass trivially
    pub fn check(&self) -> Result<()> {
        let v = &self.validation;
        let fractions = [
            ("duration_tolerance_fraction", v.duration_tolerance_fraction),
            ("budget_overrun_fraction", v.budget_overrun_fraction),
            ("min_duration_fraction", v.min_duration_fraction),
        ];
        for (name, value) in fractions {
            if !(0.0..=10.0).contains(&value) {
                return Err(Error::Config(format!(
                    "validation.{} must be between 0 and 10, got {}",
                    name, value
                )));
            }
        }

        let b = &self.builder;
        if b.default_sets == 0 || b.default_reps == 0 {
            return Err(Error::Config(
                "builder.default_sets and builder.default_reps must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME")
                .expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("rplan").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
