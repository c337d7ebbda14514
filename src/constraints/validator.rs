//! Constraint validator.
//!
//! Checks a candidate placement against the existing schedule by running
//! the rules registered for the catalog's codes. The validator borrows a
//! read-only [`SchoolData`] snapshot and holds no mutable state of its own,
//! so repeated calls with the same inputs give identical results.
//!
//! # Usage
//!
//! ```
//! use u_timetable::constraints::{ConstraintValidator, ValidationContext};
//! use u_timetable::models::{Lesson, Period, SchoolData, ScheduledLesson, Teacher, Weekday};
//!
//! let data = SchoolData::new()
//!     .with_teacher(Teacher::new(1, "J.", "Smith"))
//!     .with_period(Period::new(2, 2))
//!     .with_lesson(Lesson::new(10).with_teacher(1))
//!     .with_lesson(Lesson::new(11).with_teacher(1));
//! let existing = vec![ScheduledLesson::candidate(10, 1, Weekday::Monday, 2).with_id(1)];
//! let candidate = ScheduledLesson::candidate(11, 1, Weekday::Monday, 2);
//!
//! let validator = ConstraintValidator::new(&data);
//! let result = validator.validate_hard(&candidate, &existing, &ValidationContext::new());
//! assert_eq!(result.codes(), vec!["HC-1"]);
//! ```

use tracing::{debug, info, trace};

use super::catalog::ConstraintCatalog;
use super::context::ValidationContext;
use super::definition::ConstraintDefinition;
use super::result::{
    ConstraintResult, ConstraintViolation, PlacementValidation, RuleVerdict,
    TimetableValidationResult, ValidationResult,
};
use super::rules::{RuleInput, RuleSet};
use crate::config::EngineConfig;
use crate::error::{TimetableError, TimetableResult};
use crate::models::{
    LessonId, PeriodId, RoomId, ScheduledLesson, SchoolData, TimetableId, Weekday,
};

/// Default lunch window (period numbers).
pub const DEFAULT_LUNCH_PERIODS: [u32; 3] = [4, 5, 6];

/// Which existing placement, if any, is the candidate itself.
#[derive(Debug, Clone, Copy)]
enum SelfRef {
    /// Match by persisted id.
    Record,
    /// Match by position in the schedule.
    Position(usize),
}

/// Validates placements against hard and soft rules.
#[derive(Debug, Clone)]
pub struct ConstraintValidator<'d> {
    data: &'d SchoolData,
    catalog: ConstraintCatalog,
    rules: RuleSet,
    lunch_periods: Vec<u32>,
}

impl<'d> ConstraintValidator<'d> {
    /// Standard catalog, standard rules, default exemptions and lunch window.
    pub fn new(data: &'d SchoolData) -> Self {
        Self {
            data,
            catalog: ConstraintCatalog::default(),
            rules: RuleSet::standard(),
            lunch_periods: DEFAULT_LUNCH_PERIODS.to_vec(),
        }
    }

    /// Standard rules with the exemptions and lunch window of `config`.
    pub fn from_config(data: &'d SchoolData, config: &EngineConfig) -> Self {
        Self {
            catalog: ConstraintCatalog::standard(&config.exemptions),
            lunch_periods: config.lunch_periods.clone(),
            ..Self::new(data)
        }
    }

    pub fn with_catalog(mut self, catalog: ConstraintCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_lunch_periods(mut self, periods: Vec<u32>) -> Self {
        self.lunch_periods = periods;
        self
    }

    pub fn data(&self) -> &'d SchoolData {
        self.data
    }

    pub fn catalog(&self) -> &ConstraintCatalog {
        &self.catalog
    }

    /// Runs the hard rules.
    pub fn validate_hard(
        &self,
        candidate: &ScheduledLesson,
        existing: &[ScheduledLesson],
        ctx: &ValidationContext,
    ) -> ValidationResult {
        self.run(&self.catalog.hard(), candidate, existing, SelfRef::Record, ctx)
    }

    /// Runs the soft rules.
    pub fn validate_soft(
        &self,
        candidate: &ScheduledLesson,
        existing: &[ScheduledLesson],
        ctx: &ValidationContext,
    ) -> ValidationResult {
        self.run(&self.catalog.soft(), candidate, existing, SelfRef::Record, ctx)
    }

    /// Hard rules, then soft rules unless disabled or an early exit fired.
    pub fn validate_all(
        &self,
        candidate: &ScheduledLesson,
        existing: &[ScheduledLesson],
        ctx: &ValidationContext,
    ) -> ValidationResult {
        self.validate_all_with(candidate, existing, SelfRef::Record, ctx)
    }

    fn validate_all_with(
        &self,
        candidate: &ScheduledLesson,
        existing: &[ScheduledLesson],
        self_ref: SelfRef,
        ctx: &ValidationContext,
    ) -> ValidationResult {
        let mut result = self.run(&self.catalog.hard(), candidate, existing, self_ref, ctx);
        if ctx.early_exit && !result.is_valid() {
            return result;
        }
        if ctx.include_soft {
            result.merge(self.run(&self.catalog.soft(), candidate, existing, self_ref, ctx));
        }
        result
    }

    /// Checks a single code. Unknown codes are reported as satisfied with
    /// an explanation. The context's code filter does not apply here.
    pub fn validate_one(
        &self,
        code: &str,
        candidate: &ScheduledLesson,
        existing: &[ScheduledLesson],
        ctx: &ValidationContext,
    ) -> ConstraintResult {
        let Some(definition) = self.catalog.by_code(code) else {
            return ConstraintResult::skipped(code, format!("Unknown constraint code '{code}'"));
        };
        if self.rules.get(&definition.code).is_none() {
            return ConstraintResult::skipped(
                &definition.code,
                format!("No rule registered for '{}'", definition.code),
            );
        }
        match self.check(definition, candidate, existing, SelfRef::Record, ctx) {
            Some(violation) => ConstraintResult::violated(violation),
            None => ConstraintResult::satisfied(&definition.code),
        }
    }

    /// Validates every placement of a timetable against all others in it.
    pub fn validate_timetable(
        &self,
        timetable_id: TimetableId,
        schedule: &[ScheduledLesson],
        ctx: &ValidationContext,
    ) -> TimetableResult<TimetableValidationResult> {
        if self.data.timetable(timetable_id).is_none() {
            return Err(TimetableError::TimetableNotFound(timetable_id));
        }

        let mut summary = TimetableValidationResult::new(timetable_id);
        for (i, placed) in schedule.iter().enumerate() {
            if placed.timetable_id != timetable_id {
                continue;
            }
            let result = self.validate_all_with(placed, schedule, SelfRef::Position(i), ctx);
            summary.record(PlacementValidation {
                scheduled_lesson_id: placed.id,
                lesson_id: placed.lesson_id,
                day: placed.day,
                period_id: placed.period_id,
                result,
            });
        }

        info!(
            event = "timetable_validated",
            timetable_id,
            lessons = summary.lessons_checked,
            errors = summary.error_count,
            warnings = summary.warning_count,
        );
        Ok(summary)
    }

    /// Fast feasibility check: hard rules only, early exit.
    ///
    /// Agrees with [`validate_hard`](Self::validate_hard) on the same
    /// candidate: `true` exactly when it reports no errors.
    pub fn can_schedule_at(
        &self,
        lesson_id: LessonId,
        day: Weekday,
        period_id: PeriodId,
        room_id: Option<RoomId>,
        timetable_id: TimetableId,
        existing: &[ScheduledLesson],
    ) -> TimetableResult<bool> {
        if self.data.lesson(lesson_id).is_none() {
            return Err(TimetableError::LessonNotFound(lesson_id));
        }
        if self.data.period(period_id).is_none() {
            return Err(TimetableError::PeriodNotFound(period_id));
        }
        let candidate =
            ScheduledLesson::candidate(lesson_id, timetable_id, day, period_id).with_room_opt(room_id);
        let result = self.validate_hard(&candidate, existing, &ValidationContext::feasibility());
        Ok(result.is_valid())
    }

    /// Rejects edits of locked placements.
    pub fn ensure_editable(&self, placed: &ScheduledLesson) -> TimetableResult<()> {
        if placed.locked {
            return Err(TimetableError::LessonLocked(placed.lesson_id));
        }
        Ok(())
    }

    fn run(
        &self,
        definitions: &[&ConstraintDefinition],
        candidate: &ScheduledLesson,
        existing: &[ScheduledLesson],
        self_ref: SelfRef,
        ctx: &ValidationContext,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();
        if self.data.lesson(candidate.lesson_id).is_none() {
            debug!(lesson_id = candidate.lesson_id, "unknown lesson, nothing to validate");
            return result;
        }

        let same_day = self.same_day(candidate, existing, self_ref, ctx);
        for definition in definitions {
            if !ctx.should_check(&definition.code) {
                continue;
            }
            if let Some(violation) =
                self.check_with(definition, candidate, &same_day, existing, ctx)
            {
                let stop = ctx.early_exit && violation.is_hard();
                result.push(violation);
                if stop {
                    break;
                }
            }
        }
        result
    }

    fn check(
        &self,
        definition: &ConstraintDefinition,
        candidate: &ScheduledLesson,
        existing: &[ScheduledLesson],
        self_ref: SelfRef,
        ctx: &ValidationContext,
    ) -> Option<ConstraintViolation> {
        let same_day = self.same_day(candidate, existing, self_ref, ctx);
        self.check_with(definition, candidate, &same_day, existing, ctx)
    }

    fn check_with(
        &self,
        definition: &ConstraintDefinition,
        candidate: &ScheduledLesson,
        same_day: &[&ScheduledLesson],
        existing: &[ScheduledLesson],
        ctx: &ValidationContext,
    ) -> Option<ConstraintViolation> {
        let lesson = self.data.lesson(candidate.lesson_id)?;
        let Some(rule) = self.rules.get(&definition.code) else {
            trace!(code = %definition.code, "no rule registered");
            return None;
        };
        let input = RuleInput {
            data: self.data,
            definition,
            candidate,
            lesson,
            same_day,
            schedule: existing,
            lunch_periods: &self.lunch_periods,
        };
        match rule.check(&input) {
            RuleVerdict::Satisfied => None,
            RuleVerdict::Violated { message, details } => {
                trace!(code = %definition.code, lesson_id = lesson.id, %message, "violation");
                Some(ConstraintViolation::new(definition, message, details, ctx.as_of_ms))
            }
        }
    }

    fn same_day<'s>(
        &self,
        candidate: &ScheduledLesson,
        existing: &'s [ScheduledLesson],
        self_ref: SelfRef,
        ctx: &ValidationContext,
    ) -> Vec<&'s ScheduledLesson> {
        ctx.day_positions(existing, candidate.day)
            .into_iter()
            .filter(|&i| match self_ref {
                SelfRef::Position(p) => i != p,
                SelfRef::Record => !existing[i].is_same_record(candidate),
            })
            .map(|i| &existing[i])
            .filter(|s| s.timetable_id == candidate.timetable_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{ConstraintType, ExemptionPolicy};
    use crate::fixtures;
    use crate::models::{
        AvailabilitySet, AvailabilityTable, Lesson, Period, SchoolClass, Teacher, Timetable,
    };

    const TT: TimetableId = 1;

    fn smith_school() -> SchoolData {
        SchoolData::new()
            .with_timetable(Timetable::new(TT, "Main"))
            .with_teacher(Teacher::new(1, "J.", "Smith"))
            .with_teacher(Teacher::new(2, "xy", ""))
            .with_class(SchoolClass::new(10, "1A"))
            .with_class(SchoolClass::new(11, "1B"))
            .with_class(SchoolClass::new(12, "1C"))
            .with_period(Period::new(1, 1))
            .with_period(Period::new(2, 2))
            .with_period(Period::new(3, 3))
            .with_lesson(Lesson::new(100).with_teacher(1).with_class(10))
            .with_lesson(Lesson::new(101).with_teacher(1).with_class(11))
            .with_lesson(Lesson::new(102).with_teacher(1).with_class(12))
            .with_lesson(Lesson::new(200).with_teacher(2).with_class(10))
            .with_lesson(Lesson::new(201).with_teacher(2).with_class(11))
    }

    fn placed(id: u32, lesson: LessonId, day: Weekday, period: PeriodId) -> ScheduledLesson {
        ScheduledLesson::candidate(lesson, TT, day, period).with_id(id)
    }

    #[test]
    fn test_double_booking_reported_once_with_name() {
        let data = smith_school();
        let existing = vec![
            placed(1, 100, Weekday::Monday, 2),
            placed(2, 101, Weekday::Monday, 2),
        ];
        let candidate = ScheduledLesson::candidate(102, TT, Weekday::Monday, 2);
        let v = ConstraintValidator::new(&data);
        let r = v.validate_hard(&candidate, &existing, &ValidationContext::new());

        assert_eq!(r.count_of("HC-1"), 1);
        let hc1 = r.errors.iter().find(|e| e.code == "HC-1").unwrap();
        assert!(hc1.message.contains("J. Smith"));
        assert!(hc1.message.contains("Monday"));
    }

    #[test]
    fn test_intern_teacher_exempt_from_double_booking() {
        let data = smith_school();
        let existing = vec![placed(1, 200, Weekday::Monday, 2)];
        let candidate = ScheduledLesson::candidate(201, TT, Weekday::Monday, 2);
        let v = ConstraintValidator::new(&data);
        let r = v.validate_hard(&candidate, &existing, &ValidationContext::new());
        assert_eq!(r.count_of("HC-1"), 0);

        // Without the sentinel policy the clash is reported.
        let strict = ConstraintValidator::new(&data)
            .with_catalog(ConstraintCatalog::standard(&ExemptionPolicy::none()));
        let r = strict.validate_hard(&candidate, &existing, &ValidationContext::new());
        assert_eq!(r.count_of("HC-1"), 1);
    }

    #[test]
    fn test_context_reused_across_schedules() {
        let data = smith_school();
        let v = ConstraintValidator::new(&data);
        let ctx = ValidationContext::new().only(["HC-1"]);
        let candidate = ScheduledLesson::candidate(102, TT, Weekday::Monday, 2);

        let monday = vec![placed(1, 100, Weekday::Monday, 2)];
        assert!(!v.validate_hard(&candidate, &monday, &ctx).is_valid());
        drop(monday);

        // Same length, possibly the same allocation: the day index must not
        // carry over.
        let tuesday = vec![placed(1, 100, Weekday::Tuesday, 2)];
        assert!(v.validate_hard(&candidate, &tuesday, &ctx).is_valid());
    }

    #[test]
    fn test_other_timetable_and_own_record_ignored() {
        let data = smith_school();
        let existing = vec![
            ScheduledLesson::candidate(100, 2, Weekday::Monday, 2).with_id(1),
            placed(2, 101, Weekday::Monday, 2),
        ];
        // Re-validating record 2 at its own slot: no clash with itself.
        let r = ConstraintValidator::new(&data).validate_hard(
            &existing[1],
            &existing,
            &ValidationContext::new(),
        );
        assert!(r.is_valid());
    }

    #[test]
    fn test_gap_detection() {
        let data = smith_school();
        let v = ConstraintValidator::new(&data);
        let ctx = ValidationContext::new().only(["SC-7"]);

        let existing = vec![placed(1, 100, Weekday::Monday, 1)];
        let candidate = ScheduledLesson::candidate(200, TT, Weekday::Monday, 3);
        let r = v.validate_soft(&candidate, &existing, &ctx);
        assert_eq!(r.codes(), vec!["SC-7"]);
        assert!(r.warnings[0].message.contains("period 2"));
        assert!(r.warnings[0].message.contains("1A"));

        let existing = vec![
            placed(1, 100, Weekday::Monday, 1),
            placed(2, 200, Weekday::Monday, 2),
        ];
        let candidate = ScheduledLesson::candidate(200, TT, Weekday::Monday, 3);
        assert!(v.validate_soft(&candidate, &existing, &ctx).warnings.is_empty());
    }

    #[test]
    fn test_unknown_code_is_satisfied_with_message() {
        let data = smith_school();
        let candidate = ScheduledLesson::candidate(100, TT, Weekday::Monday, 1);
        let r = ConstraintValidator::new(&data).validate_one(
            "HC-99",
            &candidate,
            &[],
            &ValidationContext::new(),
        );
        assert!(r.satisfied);
        assert!(r.message.unwrap().contains("HC-99"));
    }

    #[test]
    fn test_validate_one_reports_violation() {
        let data = smith_school();
        let existing = vec![placed(1, 100, Weekday::Monday, 2)];
        let candidate = ScheduledLesson::candidate(101, TT, Weekday::Monday, 2);
        let r = ConstraintValidator::new(&data).validate_one(
            "hc-1",
            &candidate,
            &existing,
            &ValidationContext::new(),
        );
        assert!(!r.satisfied);
        assert_eq!(r.code, "HC-1");
        assert_eq!(
            r.violation.map(|v| v.constraint_type),
            Some(ConstraintType::Hard)
        );
    }

    #[test]
    fn test_missing_lesson_is_not_a_violation() {
        let data = smith_school();
        let existing = vec![placed(1, 100, Weekday::Monday, 2)];
        let candidate = ScheduledLesson::candidate(999, TT, Weekday::Monday, 2);
        let r = ConstraintValidator::new(&data).validate_all(
            &candidate,
            &existing,
            &ValidationContext::new(),
        );
        assert!(r.errors.is_empty() && r.warnings.is_empty());
    }

    #[test]
    fn test_early_exit_stops_after_first_hard_violation() {
        let data = smith_school().with_availability(AvailabilitySet {
            teachers: AvailabilityTable::new().with(1, Weekday::Monday, 2, -3),
            ..Default::default()
        });
        let existing = vec![placed(1, 100, Weekday::Monday, 2)];
        let candidate = ScheduledLesson::candidate(101, TT, Weekday::Monday, 2);
        let v = ConstraintValidator::new(&data);

        let full = v.validate_all(&candidate, &existing, &ValidationContext::new());
        assert_eq!(full.codes(), vec!["HC-1", "HC-4"]);

        let quick = v.validate_all(
            &candidate,
            &existing,
            &ValidationContext::new().with_early_exit(true),
        );
        assert_eq!(quick.codes(), vec!["HC-1"]);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let data = fixtures::school();
        let schedule = fixtures::busy_monday();
        let v = ConstraintValidator::new(&data);
        let ctx = ValidationContext::new().at(1_700_000_000_000);
        let candidate = ScheduledLesson::candidate(fixtures::MATH_1A, fixtures::TT, Weekday::Monday, 2)
            .with_room(fixtures::ROOM_A);

        let a = v.validate_all(&candidate, &schedule, &ctx);
        let b = v.validate_all(&candidate, &schedule, &ctx);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        assert!(a.violations().all(|x| x.timestamp_ms == 1_700_000_000_000));
    }

    #[test]
    fn test_can_schedule_at_agrees_with_validate_hard() {
        let data = fixtures::school();
        let schedule = fixtures::busy_monday();
        let v = ConstraintValidator::new(&data);
        let ctx = ValidationContext::new();

        for lesson in data.lessons() {
            for period in data.periods() {
                for room in [None, Some(fixtures::ROOM_A), Some(fixtures::LAB)] {
                    let candidate = ScheduledLesson::candidate(lesson.id, fixtures::TT, Weekday::Monday, period.id)
                        .with_room_opt(room);
                    let hard_ok = v.validate_hard(&candidate, &schedule, &ctx).is_valid();
                    let quick = v
                        .can_schedule_at(lesson.id, Weekday::Monday, period.id, room, fixtures::TT, &schedule)
                        .unwrap();
                    assert_eq!(quick, hard_ok, "lesson {} period {} room {:?}", lesson.id, period.id, room);
                }
            }
        }
    }

    #[test]
    fn test_can_schedule_at_unknown_inputs() {
        let data = smith_school();
        let v = ConstraintValidator::new(&data);
        assert!(matches!(
            v.can_schedule_at(999, Weekday::Monday, 1, None, TT, &[]),
            Err(TimetableError::LessonNotFound(999))
        ));
        assert!(matches!(
            v.can_schedule_at(100, Weekday::Monday, 77, None, TT, &[]),
            Err(TimetableError::PeriodNotFound(77))
        ));
    }

    #[test]
    fn test_validate_timetable() {
        let data = smith_school();
        let schedule = vec![
            placed(1, 100, Weekday::Monday, 2),
            placed(2, 101, Weekday::Monday, 2),
            placed(3, 102, Weekday::Tuesday, 1),
            ScheduledLesson::candidate(100, 2, Weekday::Monday, 2).with_id(4),
        ];
        let v = ConstraintValidator::new(&data);
        let summary = v
            .validate_timetable(TT, &schedule, &ValidationContext::new())
            .unwrap();
        assert_eq!(summary.lessons_checked, 3);
        // Both sides of the clash are reported.
        assert_eq!(summary.error_count, 2);
        assert!(summary.violated_codes().contains("HC-1"));
        assert!(!summary.is_valid());

        assert!(matches!(
            v.validate_timetable(9, &schedule, &ValidationContext::new()),
            Err(TimetableError::TimetableNotFound(9))
        ));
    }

    #[test]
    fn test_locked_lesson_rules() {
        let data = smith_school();
        let original = placed(1, 100, Weekday::Monday, 1).locked();
        let schedule = vec![original.clone()];
        let v = ConstraintValidator::new(&data);

        assert!(matches!(
            v.ensure_editable(&original),
            Err(TimetableError::LessonLocked(100))
        ));

        let mut moved = original.clone();
        moved.period_id = 2;
        let r = v.validate_hard(&moved, &schedule, &ValidationContext::new());
        assert_eq!(r.codes(), vec!["HC-10"]);

        let r = v.validate_hard(&original, &schedule, &ValidationContext::new());
        assert!(r.is_valid());
    }

    #[test]
    fn test_lunch_window_configurable() {
        let data = SchoolData::new()
            .with_teacher(Teacher::new(1, "A", "B").with_min_lunch_break(30))
            .with_period(Period::new(4, 4))
            .with_period(Period::new(7, 7))
            .with_lesson(Lesson::new(1).with_teacher(1));
        let ctx = ValidationContext::new().only(["SC-5"]);
        let at4 = ScheduledLesson::candidate(1, TT, Weekday::Monday, 4);
        let at7 = ScheduledLesson::candidate(1, TT, Weekday::Monday, 7);

        let v = ConstraintValidator::new(&data);
        assert_eq!(v.validate_soft(&at4, &[], &ctx).codes(), vec!["SC-5"]);
        assert!(v.validate_soft(&at7, &[], &ctx).warnings.is_empty());

        let v = v.with_lunch_periods(vec![7]);
        assert!(v.validate_soft(&at4, &[], &ctx).warnings.is_empty());
        assert_eq!(v.validate_soft(&at7, &[], &ctx).codes(), vec!["SC-5"]);
    }
}
