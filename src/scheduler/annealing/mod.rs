//! Simulated annealing timetable optimization.
//!
//! Starts from a first-fit timetable and improves it with random moves
//! under a Metropolis acceptance rule. Hard conflicts are not rejected but
//! priced so high that the search leaves them quickly.
//!
//! # Submodules
//!
//! - `config`: [`AnnealingConfig`], presets and [`EnergyWeights`]
//! - `energy`: [`EnergyModel`] and its [`EnergyBreakdown`]
//! - `engine`: [`AnnealingScheduler`]
//!
//! # Reference
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Abramson (1991), "Constructing school timetables using simulated annealing"

mod config;
mod energy;
mod engine;
mod initial;
mod moves;

pub use config::{
    AnnealingConfig, AnnealingPreset, EnergyWeights, CONSECUTIVE_SUBJECT_WEIGHT,
    HARD_CONFLICT_WEIGHT,
};
pub use energy::{EnergyBreakdown, EnergyModel};
pub use engine::{AnnealingOutcome, AnnealingReport, AnnealingScheduler, StopReason};
pub use moves::MoveKind;
