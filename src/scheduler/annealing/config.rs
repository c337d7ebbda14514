//! Annealing parameters and energy weights.
//!
//! # Presets
//!
//! | Preset | T₀ | Cooling | Floor | Iter/T | No-improve cap |
//! |--------|----|---------|-------|--------|----------------|
//! | Fast | 100 | 0.95 | 0.1 | 50 | 2 000 |
//! | Balanced | 1 000 | 0.97 | 0.01 | 100 | 5 000 |
//! | Thorough | 5 000 | 0.99 | 0.001 | 200 | 20 000 |

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fixed weight of one hard conflict.
pub const HARD_CONFLICT_WEIGHT: f64 = 10_000.0;

/// Fixed weight of one period over a class's same-subject run limit.
pub const CONSECUTIVE_SUBJECT_WEIGHT: f64 = 100.0;

/// Weights of the soft energy terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyWeights {
    /// Per teacher non-teaching period.
    pub teacher_gaps: f64,
    /// Per class non-teaching period.
    pub student_gaps: f64,
    /// Per unit of lessons-per-day variance of a class.
    pub day_unevenness: f64,
    /// Per placement on a disliked slot.
    pub non_preferred_slots: f64,
    /// Per room change between a class's successive lessons.
    pub room_changes: f64,
    /// Per unit of lessons-per-day variance of a teacher.
    pub workload_imbalance: f64,
    /// Per point of preference; subtracted.
    pub availability: f64,
}

impl EnergyWeights {
    fn fast() -> Self {
        Self {
            teacher_gaps: 5.0,
            student_gaps: 10.0,
            day_unevenness: 2.0,
            non_preferred_slots: 3.0,
            room_changes: 1.0,
            workload_imbalance: 2.0,
            availability: 1.0,
        }
    }

    fn balanced() -> Self {
        Self {
            teacher_gaps: 10.0,
            student_gaps: 20.0,
            day_unevenness: 5.0,
            non_preferred_slots: 5.0,
            room_changes: 2.0,
            workload_imbalance: 5.0,
            availability: 2.0,
        }
    }

    fn thorough() -> Self {
        Self {
            teacher_gaps: 15.0,
            student_gaps: 30.0,
            day_unevenness: 8.0,
            non_preferred_slots: 8.0,
            room_changes: 3.0,
            workload_imbalance: 8.0,
            availability: 3.0,
        }
    }
}

impl Default for EnergyWeights {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Named parameter sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnealingPreset {
    Fast,
    #[default]
    Balanced,
    Thorough,
}

impl AnnealingPreset {
    /// Parameters of the preset, without a seed.
    pub fn config(self) -> AnnealingConfig {
        match self {
            AnnealingPreset::Fast => AnnealingConfig {
                initial_temperature: 100.0,
                cooling_rate: 0.95,
                min_temperature: 0.1,
                iterations_per_temperature: 50,
                max_iterations_without_improvement: 2_000,
                weights: EnergyWeights::fast(),
                seed: None,
            },
            AnnealingPreset::Balanced => AnnealingConfig {
                initial_temperature: 1_000.0,
                cooling_rate: 0.97,
                min_temperature: 0.01,
                iterations_per_temperature: 100,
                max_iterations_without_improvement: 5_000,
                weights: EnergyWeights::balanced(),
                seed: None,
            },
            AnnealingPreset::Thorough => AnnealingConfig {
                initial_temperature: 5_000.0,
                cooling_rate: 0.99,
                min_temperature: 0.001,
                iterations_per_temperature: 200,
                max_iterations_without_improvement: 20_000,
                weights: EnergyWeights::thorough(),
                seed: None,
            },
        }
    }
}

/// Simulated annealing parameters.
///
/// Missing fields in a config file fall back to [`AnnealingPreset::Balanced`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingConfig {
    pub initial_temperature: f64,
    /// Multiplier applied after each temperature pass, in (0, 1).
    pub cooling_rate: f64,
    /// The search stops below this temperature.
    pub min_temperature: f64,
    pub iterations_per_temperature: usize,
    /// The search stops after this many iterations without a new best.
    pub max_iterations_without_improvement: usize,
    pub weights: EnergyWeights,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        AnnealingPreset::Balanced.config()
    }
}

impl AnnealingConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_weights(mut self, weights: EnergyWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return invalid("annealing.cooling_rate must be in (0, 1)");
        }
        if !(self.initial_temperature > 0.0 && self.min_temperature > 0.0) {
            return invalid("annealing temperatures must be positive");
        }
        if self.min_temperature >= self.initial_temperature {
            return invalid("annealing.min_temperature must be below initial_temperature");
        }
        if self.iterations_per_temperature == 0 {
            return invalid("annealing.iterations_per_temperature must be positive");
        }
        Ok(())
    }

    /// Number of temperature passes until the floor is reached.
    pub fn temperature_passes(&self) -> usize {
        if self.validate().is_err() {
            return 0;
        }
        let ratio = self.min_temperature / self.initial_temperature;
        (ratio.ln() / self.cooling_rate.ln()).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for preset in [AnnealingPreset::Fast, AnnealingPreset::Balanced, AnnealingPreset::Thorough] {
            assert!(preset.config().validate().is_ok(), "{preset:?}");
        }
        assert_eq!(AnnealingConfig::default(), AnnealingPreset::Balanced.config());
    }

    #[test]
    fn test_presets_grow_more_thorough() {
        let fast = AnnealingPreset::Fast.config();
        let thorough = AnnealingPreset::Thorough.config();
        assert!(fast.temperature_passes() < thorough.temperature_passes());
        assert!(fast.weights.student_gaps < thorough.weights.student_gaps);
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let base = AnnealingPreset::Fast.config();
        let cases = [
            AnnealingConfig { cooling_rate: 1.0, ..base.clone() },
            AnnealingConfig { cooling_rate: 0.0, ..base.clone() },
            AnnealingConfig { initial_temperature: -1.0, ..base.clone() },
            AnnealingConfig { min_temperature: 0.0, ..base.clone() },
            AnnealingConfig { min_temperature: 200.0, ..base.clone() },
            AnnealingConfig { iterations_per_temperature: 0, ..base.clone() },
        ];
        for case in cases {
            assert!(matches!(case.validate(), Err(ConfigError::Invalid(_))), "{case:?}");
        }
        assert_eq!(AnnealingConfig { cooling_rate: 2.0, ..base }.temperature_passes(), 0);
    }

    #[test]
    fn test_preset_serde_names() {
        let json = serde_json::to_string(&AnnealingPreset::Thorough).unwrap();
        assert_eq!(json, "\"thorough\"");
        let partial: AnnealingConfig = serde_json::from_str(r#"{"cooling_rate": 0.9}"#).unwrap();
        assert_eq!(partial.cooling_rate, 0.9);
        assert_eq!(partial.initial_temperature, 1_000.0);
    }

    #[test]
    fn test_temperature_passes() {
        let config = AnnealingConfig {
            initial_temperature: 100.0,
            cooling_rate: 0.5,
            min_temperature: 10.0,
            ..AnnealingConfig::default()
        };
        // 100, 50, 25, 12.5, 6.25
        assert_eq!(config.temperature_passes(), 4);
    }
}
