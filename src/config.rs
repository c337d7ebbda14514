//! Engine configuration.
//!
//! Everything deployment-specific lives here: sentinel names and their
//! exemptions, the lunch window, the school days, annealing parameters and
//! the substitution threshold. Every section has defaults, so an empty file
//! is a valid configuration.
//!
//! # Examples
//!
//! ```
//! use u_timetable::config::EngineConfig;
//! use u_timetable::scheduler::annealing::AnnealingPreset;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     lunch_periods = [5, 6]
//!
//!     [exemptions]
//!     intern_teachers = ["N.N."]
//!
//!     [annealing]
//!     preset = "fast"
//!     seed = 42
//! "#).unwrap();
//!
//! assert_eq!(config.lunch_periods, vec![5, 6]);
//! assert_eq!(config.annealing.preset, AnnealingPreset::Fast);
//! assert_eq!(config.annealing.resolve().seed, Some(42));
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constraints::{ExemptionPolicy, DEFAULT_LUNCH_PERIODS};
use crate::error::ConfigError;
use crate::models::{school_days, Weekday};
use crate::scheduler::annealing::{AnnealingConfig, AnnealingPreset};
use crate::substitution::SubstitutionConfig;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sentinel names and exempt codes.
    pub exemptions: ExemptionPolicy,
    /// Period numbers treated as the lunch window by SC-5 / SC-6.
    pub lunch_periods: Vec<u32>,
    /// Days to schedule on. Weekend days are always dropped.
    pub school_days: Vec<Weekday>,
    pub annealing: AnnealingSection,
    pub substitution: SubstitutionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exemptions: ExemptionPolicy::default(),
            lunch_periods: DEFAULT_LUNCH_PERIODS.to_vec(),
            school_days: Weekday::SCHOOL_WEEK.to_vec(),
            annealing: AnnealingSection::default(),
            substitution: SubstitutionConfig::default(),
        }
    }
}

/// Annealing preset or custom parameters, plus an optional seed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingSection {
    pub preset: AnnealingPreset,
    /// Replaces the preset when set.
    pub custom: Option<AnnealingConfig>,
    pub seed: Option<u64>,
}

impl AnnealingSection {
    /// Effective annealing parameters.
    pub fn resolve(&self) -> AnnealingConfig {
        let config = self
            .custom
            .clone()
            .unwrap_or_else(|| self.preset.config());
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::from_toml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// School days with weekend days and duplicates removed.
    pub fn effective_school_days(&self) -> Vec<Weekday> {
        school_days(&self.school_days)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.effective_school_days().is_empty() {
            return Err(ConfigError::Invalid(
                "school_days must contain at least one weekday".into(),
            ));
        }
        self.annealing.resolve().validate()
    }
}
