//! School timetabling core.
//!
//! Validates lesson placements against a registry of hard and soft
//! constraints, generates weekly timetables, and ranks substitute teachers
//! for absences. Everything runs over an in-memory [`models::SchoolData`]
//! snapshot; loading and persisting records is left to the caller.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Teacher`, `SchoolClass`, `Room`, `Lesson`,
//!   `Period`, `ScheduledLesson`, availability tables, `SchoolData`
//! - **`constraints`**: Constraint catalog (12 hard, 11 soft), rule table and
//!   `ConstraintValidator`
//! - **`scheduler`**: Greedy, priority and simulated annealing engines
//! - **`substitution`**: Absences, substitutions and `SubstituteRanker`
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling references)
//! - **`config`**: TOML-backed engine configuration
//!
//! # Architecture
//!
//! Constraint checks are pure functions of a candidate and the placements
//! around it. Engines only call the validator (or the annealing energy
//! model) and never mutate the snapshot, so independent runs may share one
//! `SchoolData`.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod config;
pub mod constraints;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod substitution;
pub mod validation;

#[cfg(test)]
mod fixtures;

pub use config::EngineConfig;
pub use error::{ConfigError, TimetableError, TimetableResult};
