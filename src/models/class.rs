//! School class model.

use serde::{Deserialize, Serialize};

use super::ClassId;

/// A class (group of students taught together).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolClass {
    /// Unique class identifier.
    pub id: ClassId,
    /// Class name (e.g., "1A").
    pub name: String,
    /// Number of students, used for room capacity checks.
    pub student_count: Option<u32>,
    /// Maximum run of consecutive periods of the same subject (HC-9).
    pub max_consecutive_same_subject: Option<u32>,
    /// Maximum periods per day (HC-12).
    pub max_periods_per_day: Option<u32>,
    /// Minimum periods on any school day with lessons (SC-11).
    pub min_periods_per_day: Option<u32>,
    /// Minimum lunch break in minutes (SC-6). `None` disables the check.
    pub min_lunch_break_minutes: Option<u32>,
}

impl SchoolClass {
    /// Creates a class with no limits.
    pub fn new(id: ClassId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            student_count: None,
            max_consecutive_same_subject: None,
            max_periods_per_day: None,
            min_periods_per_day: None,
            min_lunch_break_minutes: None,
        }
    }

    /// Sets the student count.
    pub fn with_students(mut self, count: u32) -> Self {
        self.student_count = Some(count);
        self
    }

    /// Sets the maximum consecutive same-subject periods.
    pub fn with_max_consecutive_same_subject(mut self, max: u32) -> Self {
        self.max_consecutive_same_subject = Some(max);
        self
    }

    /// Sets the per-day period bounds.
    pub fn with_daily_bounds(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_periods_per_day = min;
        self.max_periods_per_day = max;
        self
    }

    /// Sets the minimum lunch break.
    pub fn with_min_lunch_break(mut self, minutes: u32) -> Self {
        self.min_lunch_break_minutes = Some(minutes);
        self
    }
}
