//! Substitute teachers.
//!
//! Records of absences and substitutions, and the [`SubstituteRanker`] that
//! scores who should cover a lesson of an absent teacher.
//!
//! # Scoring
//!
//! | Signal | Points |
//! |--------|--------|
//! | Co-teacher of the lesson | +250 |
//! | On reserve duty at the slot | +200 |
//! | Qualified for the subject (else: qualification notes) | +100 (+50) |
//! | Same department as the absent teacher | +50 |
//! | Weekly substitution load n | max(0, 40 − 4n) |
//! | Available at the slot | +30 |
//! | Earlier substitutions in the subject | +5 each, at most +20 |

mod ranker;

use serde::{Deserialize, Serialize};

use crate::models::{LessonId, PeriodId, ScheduledLessonId, TeacherId, Weekday};

pub use ranker::{ExcludedCandidate, ExclusionReason, RankedCandidate, Ranking, SubstituteRanker};

pub type AbsenceId = u32;
pub type SubstitutionId = u32;

/// A teacher's absence on one day of a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    pub id: AbsenceId,
    pub teacher_id: TeacherId,
    pub week_number: u32,
    pub day: Weekday,
    /// Affected periods; `None` = the whole day.
    pub period_ids: Option<Vec<PeriodId>>,
    pub reason: Option<String>,
}

impl Absence {
    /// A whole-day absence.
    pub fn new(id: AbsenceId, teacher_id: TeacherId, week_number: u32, day: Weekday) -> Self {
        Self {
            id,
            teacher_id,
            week_number,
            day,
            period_ids: None,
            reason: None,
        }
    }

    /// Restricts the absence to some periods.
    pub fn with_periods(mut self, period_ids: Vec<PeriodId>) -> Self {
        self.period_ids = Some(period_ids);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Whether the absence covers the slot.
    pub fn covers(&self, week_number: u32, day: Weekday, period_id: PeriodId) -> bool {
        self.week_number == week_number
            && self.day == day
            && self
                .period_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&period_id))
    }
}

/// A substitute assigned to one lesson slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    /// `None` until stored.
    pub id: Option<SubstitutionId>,
    pub absence_id: AbsenceId,
    pub scheduled_lesson_id: Option<ScheduledLessonId>,
    pub lesson_id: LessonId,
    pub substitute_teacher_id: TeacherId,
    pub week_number: u32,
    pub day: Weekday,
    pub period_id: PeriodId,
    /// Ranking score at assignment time.
    pub score: i64,
}

impl Substitution {
    /// Whether this substitution occupies `teacher_id` at the slot.
    pub fn occupies(&self, teacher_id: TeacherId, week_number: u32, day: Weekday, period_id: PeriodId) -> bool {
        self.substitute_teacher_id == teacher_id
            && self.week_number == week_number
            && self.day == day
            && self.period_id == period_id
    }
}

/// Substitution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstitutionConfig {
    /// Auto-assignment needs at least this score.
    pub min_auto_assign_score: i64,
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        Self {
            min_auto_assign_score: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absence_covers() {
        let whole = Absence::new(1, 3, 12, Weekday::Monday);
        assert!(whole.covers(12, Weekday::Monday, 5));
        assert!(!whole.covers(13, Weekday::Monday, 5));
        assert!(!whole.covers(12, Weekday::Tuesday, 5));

        let partial = whole.with_periods(vec![1, 2]).with_reason("doctor");
        assert!(partial.covers(12, Weekday::Monday, 2));
        assert!(!partial.covers(12, Weekday::Monday, 3));
    }
}
