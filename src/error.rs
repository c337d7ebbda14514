//! Error types.
//!
//! Constraint violations are not errors; they are returned as values by the
//! validator. These types cover input problems only.

use thiserror::Error;

use crate::models::{LessonId, PeriodId, TimetableId};

/// Input errors of the timetable core.
#[derive(Debug, Error)]
pub enum TimetableError {
    #[error("No active lessons to schedule")]
    NoActiveLessons,

    #[error("No teaching periods configured")]
    NoPeriods,

    #[error("Lesson {0} not found")]
    LessonNotFound(LessonId),

    #[error("Period {0} not found")]
    PeriodNotFound(PeriodId),

    #[error("Timetable {0} not found")]
    TimetableNotFound(TimetableId),

    #[error("Lesson {0} is locked and cannot be moved or deleted")]
    LessonLocked(LessonId),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type TimetableResult<T> = Result<T, TimetableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(TimetableError::LessonNotFound(7).to_string(), "Lesson 7 not found");
        assert_eq!(
            TimetableError::from(ConfigError::Invalid("cooling_rate".into())).to_string(),
            "Invalid configuration: cooling_rate"
        );
    }
}
