//! Teacher model.
//!
//! Teachers carry their per-day workload limits, the subjects they are
//! formally qualified for, and substitution settings used by the
//! substitute ranking.

use serde::{Deserialize, Serialize};

use super::{SubjectId, TeacherId};

/// A teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: TeacherId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Short code shown in timetables (e.g., "SMI").
    pub abbreviation: String,
    /// Department, used by substitute ranking.
    pub department: Option<String>,
    /// Inactive teachers are never ranked as substitutes.
    pub is_active: bool,
    /// Maximum run of consecutive periods per day (HC-8).
    pub max_consecutive_periods: Option<u32>,
    /// Maximum periods per day (HC-11).
    pub max_periods_per_day: Option<u32>,
    /// Minimum periods on any day the teacher works (SC-10).
    pub min_periods_per_day: Option<u32>,
    /// Minimum lunch break in minutes (SC-5). `None` disables the check.
    pub min_lunch_break_minutes: Option<u32>,
    /// Subjects the teacher is formally qualified to teach.
    pub qualified_subject_ids: Vec<SubjectId>,
    /// Free-text notes on informal qualifications.
    pub qualification_notes: Option<String>,
    /// Maximum substitutions per week. `None` = unlimited.
    pub max_substitutions_per_week: Option<u32>,
}

impl Teacher {
    /// Creates an active teacher with no limits.
    pub fn new(id: TeacherId, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            abbreviation: String::new(),
            department: None,
            is_active: true,
            max_consecutive_periods: None,
            max_periods_per_day: None,
            min_periods_per_day: None,
            min_lunch_break_minutes: None,
            qualified_subject_ids: Vec::new(),
            qualification_notes: None,
            max_substitutions_per_week: None,
        }
    }

    /// Sets the abbreviation.
    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviation = abbreviation.into();
        self
    }

    /// Sets the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Marks the teacher inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Sets the maximum consecutive periods.
    pub fn with_max_consecutive(mut self, max: u32) -> Self {
        self.max_consecutive_periods = Some(max);
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

    /// Adds a formal subject qualification.
    pub fn with_qualification(mut self, subject_id: SubjectId) -> Self {
        self.qualified_subject_ids.push(subject_id);
        self
    }

    /// Sets informal qualification notes.
    pub fn with_qualification_notes(mut self, notes: impl Into<String>) -> Self {
        self.qualification_notes = Some(notes.into());
        self
    }

    /// Sets the weekly substitution cap.
    pub fn with_max_substitutions(mut self, max: u32) -> Self {
        self.max_substitutions_per_week = Some(max);
        self
    }

    /// "First Last", or whichever part is present.
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            _ => self.last_name.clone(),
        }
    }

    /// Whether the teacher is formally qualified for any of `subject_ids`.
    pub fn is_qualified_for(&self, subject_ids: &[SubjectId]) -> bool {
        subject_ids
            .iter()
            .any(|s| self.qualified_subject_ids.contains(s))
    }

    /// Whether informal qualification notes are on file.
    pub fn has_qualification_notes(&self) -> bool {
        self.qualification_notes
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty())
    }

    /// Case-insensitive department comparison.
    pub fn same_department(&self, other: &Teacher) -> bool {
        match (&self.department, &other.department) {
            (Some(a), Some(b)) => !a.trim().is_empty() && a.trim().eq_ignore_ascii_case(b.trim()),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teacher_builder() {
        let t = Teacher::new(1, "J.", "Smith")
            .with_abbreviation("SMI")
            .with_department("Science")
            .with_max_consecutive(4)
            .with_daily_bounds(Some(2), Some(6))
            .with_qualification(10)
            .with_max_substitutions(3);

        assert_eq!(t.full_name(), "J. Smith");
        assert_eq!(t.max_consecutive_periods, Some(4));
        assert_eq!(t.min_periods_per_day, Some(2));
        assert_eq!(t.max_periods_per_day, Some(6));
        assert!(t.is_qualified_for(&[3, 10]));
        assert!(!t.is_qualified_for(&[3]));
        assert!(t.is_active);
    }

    #[test]
    fn test_full_name_partial() {
        assert_eq!(Teacher::new(1, "xy", "").full_name(), "xy");
        assert_eq!(Teacher::new(1, "", "Meier").full_name(), "Meier");
    }

    #[test]
    fn test_same_department_case_insensitive() {
        let a = Teacher::new(1, "A", "A").with_department("Maths");
        let b = Teacher::new(2, "B", "B").with_department(" maths ");
        let c = Teacher::new(3, "C", "C");
        assert!(a.same_department(&b));
        assert!(!a.same_department(&c));
        assert!(!c.same_department(&c));
    }

    #[test]
    fn test_qualification_notes() {
        let t = Teacher::new(1, "A", "B").with_qualification_notes("  ");
        assert!(!t.has_qualification_notes());
        let t = t.with_qualification_notes("taught chemistry abroad");
        assert!(t.has_qualification_notes());
    }
}
