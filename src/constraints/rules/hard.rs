//! Hard rules HC-1 .. HC-12.
//!
//! A hard violation makes a placement illegal. Double-booking rules look at
//! the candidate's (day, period); run and per-day rules look at the whole
//! day of the candidate's timetable, candidate included.

use super::{ConstraintRule, RuleInput};
use crate::constraints::result::{details, RuleVerdict};
use crate::models::longest_consecutive_run;

fn opt(id: Option<u32>) -> i64 {
    id.map_or(-1, i64::from)
}

// ======================== Double booking ========================

/// HC-1: a teacher gives one lesson per slot.
#[derive(Debug, Clone, Copy)]
pub struct TeacherDoubleBooking;

impl ConstraintRule for TeacherDoubleBooking {
    fn code(&self) -> &'static str {
        "HC-1"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        for teacher in input.teachers() {
            if let Some((other, _)) = input.at_slot().find(|(_, l)| l.has_teacher(teacher.id)) {
                return RuleVerdict::violated(
                    input.message(&[&teacher.full_name(), input.day_name(), &input.period_label()]),
                    details([
                        ("teacher_id", teacher.id.into()),
                        ("lesson_id", input.lesson.id.into()),
                        ("conflicting_lesson_id", other.lesson_id.into()),
                        ("conflicting_scheduled_lesson_id", opt(other.id).into()),
                    ]),
                );
            }
        }
        RuleVerdict::Satisfied
    }
}

/// HC-2: a class attends one lesson per slot.
#[derive(Debug, Clone, Copy)]
pub struct ClassDoubleBooking;

impl ConstraintRule for ClassDoubleBooking {
    fn code(&self) -> &'static str {
        "HC-2"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        for class in input.classes() {
            if let Some((other, _)) = input.at_slot().find(|(_, l)| l.has_class(class.id)) {
                return RuleVerdict::violated(
                    input.message(&[&class.name, input.day_name(), &input.period_label()]),
                    details([
                        ("class_id", class.id.into()),
                        ("lesson_id", input.lesson.id.into()),
                        ("conflicting_lesson_id", other.lesson_id.into()),
                        ("conflicting_scheduled_lesson_id", opt(other.id).into()),
                    ]),
                );
            }
        }
        RuleVerdict::Satisfied
    }
}

/// HC-3: a room (primary or additional) holds one lesson per slot.
#[derive(Debug, Clone, Copy)]
pub struct RoomDoubleBooking;

impl ConstraintRule for RoomDoubleBooking {
    fn code(&self) -> &'static str {
        "HC-3"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        for room in input.rooms() {
            if let Some((other, _)) = input.at_slot().find(|(s, _)| s.uses_room(room.id)) {
                return RuleVerdict::violated(
                    input.message(&[&room.number, input.day_name(), &input.period_label()]),
                    details([
                        ("room_id", room.id.into()),
                        ("lesson_id", input.lesson.id.into()),
                        ("conflicting_lesson_id", other.lesson_id.into()),
                        ("conflicting_scheduled_lesson_id", opt(other.id).into()),
                    ]),
                );
            }
        }
        RuleVerdict::Satisfied
    }
}

// ======================== Availability (-3) ========================

/// HC-4: teacher marked -3 at the slot.
#[derive(Debug, Clone, Copy)]
pub struct TeacherBlocked;

impl ConstraintRule for TeacherBlocked {
    fn code(&self) -> &'static str {
        "HC-4"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        let c = input.candidate;
        let table = &input.data.availability.teachers;
        match input
            .teachers()
            .find(|t| table.is_blocked(t.id, c.day, c.period_id))
        {
            Some(t) => RuleVerdict::violated(
                input.message(&[&t.full_name(), input.day_name(), &input.period_label()]),
                details([("teacher_id", t.id.into()), ("lesson_id", input.lesson.id.into())]),
            ),
            None => RuleVerdict::Satisfied,
        }
    }
}

/// HC-5: class marked -3 at the slot.
#[derive(Debug, Clone, Copy)]
pub struct ClassBlocked;

impl ConstraintRule for ClassBlocked {
    fn code(&self) -> &'static str {
        "HC-5"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        let c = input.candidate;
        let table = &input.data.availability.classes;
        match input
            .classes()
            .find(|cl| table.is_blocked(cl.id, c.day, c.period_id))
        {
            Some(cl) => RuleVerdict::violated(
                input.message(&[&cl.name, input.day_name(), &input.period_label()]),
                details([("class_id", cl.id.into()), ("lesson_id", input.lesson.id.into())]),
            ),
            None => RuleVerdict::Satisfied,
        }
    }
}

/// HC-6: any candidate room marked -3 at the slot.
#[derive(Debug, Clone, Copy)]
pub struct RoomBlocked;

impl ConstraintRule for RoomBlocked {
    fn code(&self) -> &'static str {
        "HC-6"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        let c = input.candidate;
        let table = &input.data.availability.rooms;
        match input
            .rooms()
            .into_iter()
            .find(|r| table.is_blocked(r.id, c.day, c.period_id))
        {
            Some(r) => RuleVerdict::violated(
                input.message(&[&r.number, input.day_name(), &input.period_label()]),
                details([("room_id", r.id.into()), ("lesson_id", input.lesson.id.into())]),
            ),
            None => RuleVerdict::Satisfied,
        }
    }
}

/// HC-7: any subject of the lesson marked -3 at the slot.
#[derive(Debug, Clone, Copy)]
pub struct SubjectBlocked;

impl ConstraintRule for SubjectBlocked {
    fn code(&self) -> &'static str {
        "HC-7"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        let c = input.candidate;
        let table = &input.data.availability.subjects;
        let blocked = input
            .lesson
            .subject_ids
            .iter()
            .filter_map(|id| input.data.subject(*id))
            .find(|s| table.is_blocked(s.id, c.day, c.period_id));
        match blocked {
            Some(s) => RuleVerdict::violated(
                input.message(&[&s.name, input.day_name(), &input.period_label()]),
                details([("subject_id", s.id.into()), ("lesson_id", input.lesson.id.into())]),
            ),
            None => RuleVerdict::Satisfied,
        }
    }
}

// ======================== Runs and daily load ========================

/// HC-8: longest run of consecutive teaching periods ≤ teacher max.
#[derive(Debug, Clone, Copy)]
pub struct TeacherConsecutive;

impl ConstraintRule for TeacherConsecutive {
    fn code(&self) -> &'static str {
        "HC-8"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        for teacher in input.teachers() {
            let Some(max) = teacher.max_consecutive_periods else {
                continue;
            };
            let run = longest_consecutive_run(&input.day_numbers(|l| l.has_teacher(teacher.id)));
            if run > max {
                return RuleVerdict::violated(
                    input.message(&[
                        &teacher.full_name(),
                        &run.to_string(),
                        input.day_name(),
                        &max.to_string(),
                    ]),
                    details([
                        ("teacher_id", teacher.id.into()),
                        ("lesson_id", input.lesson.id.into()),
                        ("run", run.into()),
                        ("max", max.into()),
                    ]),
                );
            }
        }
        RuleVerdict::Satisfied
    }
}

/// HC-9: consecutive periods of one subject for a class ≤ class max,
/// checked per subject.
#[derive(Debug, Clone, Copy)]
pub struct ClassConsecutiveSubject;

impl ConstraintRule for ClassConsecutiveSubject {
    fn code(&self) -> &'static str {
        "HC-9"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        for class in input.classes() {
            let Some(max) = class.max_consecutive_same_subject else {
                continue;
            };
            for &subject_id in &input.lesson.subject_ids {
                let numbers =
                    input.day_numbers(|l| l.has_class(class.id) && l.has_subject(subject_id));
                let run = longest_consecutive_run(&numbers);
                if run <= max {
                    continue;
                }
                let subject = input
                    .data
                    .subject(subject_id)
                    .map_or_else(|| subject_id.to_string(), |s| s.name.clone());
                return RuleVerdict::violated(
                    input.message(&[
                        &class.name,
                        &run.to_string(),
                        &subject,
                        input.day_name(),
                        &max.to_string(),
                    ]),
                    details([
                        ("class_id", class.id.into()),
                        ("subject_id", subject_id.into()),
                        ("lesson_id", input.lesson.id.into()),
                        ("run", run.into()),
                        ("max", max.into()),
                    ]),
                );
            }
        }
        RuleVerdict::Satisfied
    }
}

/// HC-10: a locked placement keeps its slot and rooms.
///
/// Fires when the candidate is an edited copy of a locked record. Freshly
/// generated candidates have no id and never trigger it.
#[derive(Debug, Clone, Copy)]
pub struct LockedLesson;

impl ConstraintRule for LockedLesson {
    fn code(&self) -> &'static str {
        "HC-10"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        let c = input.candidate;
        let moved = input.schedule.iter().find(|s| {
            s.locked
                && s.is_same_record(c)
                && (!s.same_slot(c) || s.rooms() != c.rooms() || s.timetable_id != c.timetable_id)
        });
        match moved {
            Some(original) => RuleVerdict::violated(
                input.message(&[&input.data.describe_lesson(input.lesson)]),
                details([
                    ("lesson_id", input.lesson.id.into()),
                    ("scheduled_lesson_id", opt(original.id).into()),
                ]),
            ),
            None => RuleVerdict::Satisfied,
        }
    }
}

/// HC-11: teacher periods per day ≤ max.
#[derive(Debug, Clone, Copy)]
pub struct TeacherDailyMax;

impl ConstraintRule for TeacherDailyMax {
    fn code(&self) -> &'static str {
        "HC-11"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        for teacher in input.teachers() {
            let Some(max) = teacher.max_periods_per_day else {
                continue;
            };
            let count = input.day_count(|l| l.has_teacher(teacher.id));
            if count > max as usize {
                return RuleVerdict::violated(
                    input.message(&[
                        &teacher.full_name(),
                        &count.to_string(),
                        input.day_name(),
                        &max.to_string(),
                    ]),
                    details([
                        ("teacher_id", teacher.id.into()),
                        ("lesson_id", input.lesson.id.into()),
                        ("count", (count as i64).into()),
                        ("max", max.into()),
                    ]),
                );
            }
        }
        RuleVerdict::Satisfied
    }
}

/// HC-12: class periods per day ≤ max.
#[derive(Debug, Clone, Copy)]
pub struct ClassDailyMax;

impl ConstraintRule for ClassDailyMax {
    fn code(&self) -> &'static str {
        "HC-12"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        for class in input.classes() {
            let Some(max) = class.max_periods_per_day else {
                continue;
            };
            let count = input.day_count(|l| l.has_class(class.id));
            if count > max as usize {
                return RuleVerdict::violated(
                    input.message(&[
                        &class.name,
                        &count.to_string(),
                        input.day_name(),
                        &max.to_string(),
                    ]),
                    details([
                        ("class_id", class.id.into()),
                        ("lesson_id", input.lesson.id.into()),
                        ("count", (count as i64).into()),
                        ("max", max.into()),
                    ]),
                );
            }
        }
        RuleVerdict::Satisfied
    }
}

#[cfg(test)]
mod tests {
    use crate::constraints::{
        ConstraintCatalog, ConstraintValidator, ExemptionPolicy, ValidationContext,
    };
    use crate::fixtures::{self, CHEM_1A, ENG_1B, LAB, ROOM_A, ROOM_B, TT};
    use crate::models::{
        AvailabilitySet, AvailabilityTable, Lesson, Period, Room, ScheduledLesson, SchoolClass,
        SchoolData, Subject, Teacher, Timetable, Weekday,
    };

    const ANN: u32 = 1;
    const BOB: u32 = 2;
    const CLASS: u32 = 10;
    const RESERVE: u32 = 11;
    const TEAM: u32 = 12;
    const MATH: u32 = 20;
    const ART: u32 = 21;
    const A1: u32 = 30;
    const TEAM_ROOM: u32 = 31;

    const ANN_MATH: u32 = 100;
    const ANN_ART: u32 = 101;
    const BOB_MATH_ART: u32 = 102;
    const BOB_RESERVE: u32 = 110;
    const ANN_RESERVE: u32 = 111;
    const BOB_TEAM: u32 = 120;
    const ANN_TEAM: u32 = 121;

    /// Small school with limits on Ann and class 1A, plus one class or room
    /// for each sentinel kind.
    fn school() -> SchoolData {
        SchoolData::new()
            .with_timetable(Timetable::new(TT, "Main"))
            .with_teacher(
                Teacher::new(ANN, "Ann", "Lee")
                    .with_max_consecutive(2)
                    .with_daily_bounds(None, Some(3)),
            )
            .with_teacher(Teacher::new(BOB, "Bob", "Ray"))
            .with_class(
                SchoolClass::new(CLASS, "1A")
                    .with_max_consecutive_same_subject(2)
                    .with_daily_bounds(None, Some(3)),
            )
            .with_class(SchoolClass::new(RESERVE, "v-res"))
            .with_class(SchoolClass::new(TEAM, "Team"))
            .with_subject(Subject::new(MATH, "Math"))
            .with_subject(Subject::new(ART, "Art"))
            .with_room(Room::new(A1, "A1"))
            .with_room(Room::new(TEAM_ROOM, "Teamraum"))
            .with_period(Period::new(1, 1))
            .with_period(Period::new(2, 2))
            .with_period(Period::new(3, 3))
            .with_period(Period::break_period(4, 4))
            .with_period(Period::new(5, 5))
            .with_period(Period::new(6, 6))
            .with_lesson(Lesson::new(ANN_MATH).with_teacher(ANN).with_class(CLASS).with_subject(MATH))
            .with_lesson(Lesson::new(ANN_ART).with_teacher(ANN).with_class(CLASS).with_subject(ART))
            .with_lesson(
                Lesson::new(BOB_MATH_ART)
                    .with_teacher(BOB)
                    .with_class(CLASS)
                    .with_subject(MATH)
                    .with_subject(ART),
            )
            .with_lesson(Lesson::new(BOB_RESERVE).with_teacher(BOB).with_class(RESERVE))
            .with_lesson(Lesson::new(ANN_RESERVE).with_teacher(ANN).with_class(RESERVE))
            .with_lesson(Lesson::new(BOB_TEAM).with_teacher(BOB).with_class(TEAM))
            .with_lesson(Lesson::new(ANN_TEAM).with_teacher(ANN).with_class(TEAM))
    }

    fn monday(lesson: u32, period: u32) -> ScheduledLesson {
        ScheduledLesson::candidate(lesson, TT, Weekday::Monday, period)
    }

    /// Saved placements on Monday, one per `(lesson, period)`.
    fn saved(placements: &[(u32, u32)]) -> Vec<ScheduledLesson> {
        placements
            .iter()
            .zip(1..)
            .map(|(&(lesson, period), id)| monday(lesson, period).with_id(id))
            .collect()
    }

    fn satisfied(
        data: &SchoolData,
        code: &str,
        candidate: &ScheduledLesson,
        existing: &[ScheduledLesson],
    ) -> bool {
        ConstraintValidator::new(data)
            .validate_one(code, candidate, existing, &ValidationContext::new())
            .satisfied
    }

    fn satisfied_without_exemptions(
        data: &SchoolData,
        code: &str,
        candidate: &ScheduledLesson,
        existing: &[ScheduledLesson],
    ) -> bool {
        ConstraintValidator::new(data)
            .with_catalog(ConstraintCatalog::standard(&ExemptionPolicy::none()))
            .validate_one(code, candidate, existing, &ValidationContext::new())
            .satisfied
    }

    #[test]
    fn test_room_double_booking() {
        let data = fixtures::school();
        let validator = ConstraintValidator::new(&data);
        let existing = fixtures::busy_monday();
        let ctx = ValidationContext::new();

        let clash = ScheduledLesson::candidate(ENG_1B, TT, Weekday::Monday, 1).with_room(ROOM_A);
        assert!(!validator.validate_one("HC-3", &clash, &existing, &ctx).satisfied);

        let free = ScheduledLesson::candidate(ENG_1B, TT, Weekday::Monday, 1).with_room(ROOM_B);
        assert!(validator.validate_one("HC-3", &free, &existing, &ctx).satisfied);

        // Additional rooms count too.
        let extra = free.with_additional_room(LAB);
        assert!(!validator.validate_one("HC-3", &extra, &existing, &ctx).satisfied);
    }

    #[test]
    fn test_teacher_blocked_slot() {
        let data = fixtures::school();
        let validator = ConstraintValidator::new(&data);
        let ctx = ValidationContext::new();

        let tuesday = ScheduledLesson::candidate(CHEM_1A, TT, Weekday::Tuesday, 1).with_room(LAB);
        let result = validator.validate_one("HC-4", &tuesday, &[], &ctx);
        assert!(!result.satisfied);
        assert!(result.violation.is_some());

        let later = ScheduledLesson::candidate(CHEM_1A, TT, Weekday::Tuesday, 2).with_room(LAB);
        assert!(validator.validate_one("HC-4", &later, &[], &ctx).satisfied);
    }

    #[test]
    fn test_class_blocked_slot() {
        let data = school().with_availability(AvailabilitySet {
            classes: AvailabilityTable::new().with(CLASS, Weekday::Monday, 1, -3),
            ..Default::default()
        });
        assert!(!satisfied(&data, "HC-5", &monday(ANN_MATH, 1), &[]));
        assert!(satisfied(&data, "HC-5", &monday(ANN_MATH, 2), &[]));
    }

    #[test]
    fn test_room_blocked_slot() {
        let data = school().with_availability(AvailabilitySet {
            rooms: AvailabilityTable::new().with(A1, Weekday::Monday, 1, -3),
            ..Default::default()
        });
        assert!(!satisfied(&data, "HC-6", &monday(ANN_MATH, 1).with_room(A1), &[]));
        assert!(satisfied(&data, "HC-6", &monday(ANN_MATH, 1).with_room(TEAM_ROOM), &[]));
        assert!(satisfied(&data, "HC-6", &monday(ANN_MATH, 1), &[]));
    }

    #[test]
    fn test_subject_blocked_slot() {
        let data = school().with_availability(AvailabilitySet {
            subjects: AvailabilityTable::new().with(ART, Weekday::Monday, 3, -3),
            ..Default::default()
        });
        // The second subject of a multi-subject lesson is checked too.
        assert!(!satisfied(&data, "HC-7", &monday(BOB_MATH_ART, 3), &[]));
        assert!(satisfied(&data, "HC-7", &monday(BOB_MATH_ART, 2), &[]));
        assert!(satisfied(&data, "HC-7", &monday(ANN_MATH, 3), &[]));
    }

    #[test]
    fn test_teacher_consecutive_periods() {
        let data = school();
        let existing = saved(&[(ANN_MATH, 1), (ANN_ART, 2)]);
        assert!(!satisfied(&data, "HC-8", &monday(ANN_MATH, 3), &existing));
        // The break after period 3 ends the run.
        assert!(satisfied(&data, "HC-8", &monday(ANN_MATH, 5), &existing));
        // Bob has no limit.
        assert!(satisfied(&data, "HC-8", &monday(BOB_MATH_ART, 3), &existing));
    }

    #[test]
    fn test_class_consecutive_subject_per_subject() {
        let data = school();
        let maths = saved(&[(ANN_MATH, 1), (ANN_MATH, 2)]);
        assert!(!satisfied(&data, "HC-9", &monday(ANN_MATH, 3), &maths));
        assert!(!satisfied(&data, "HC-9", &monday(BOB_MATH_ART, 3), &maths));
        assert!(satisfied(&data, "HC-9", &monday(ANN_ART, 3), &maths));

        // Runs of different subjects do not add up.
        let mixed = saved(&[(ANN_ART, 1), (ANN_ART, 2)]);
        assert!(satisfied(&data, "HC-9", &monday(ANN_MATH, 3), &mixed));
    }

    #[test]
    fn test_teacher_daily_max() {
        let data = school();
        let three = saved(&[(ANN_MATH, 1), (ANN_ART, 2), (ANN_RESERVE, 5)]);
        assert!(!satisfied(&data, "HC-11", &monday(ANN_MATH, 6), &three));
        assert!(satisfied(&data, "HC-11", &monday(ANN_MATH, 6), &three[..2]));
    }

    #[test]
    fn test_class_daily_max() {
        let data = school();
        let three = saved(&[(ANN_MATH, 1), (ANN_ART, 2), (BOB_MATH_ART, 3)]);
        assert!(!satisfied(&data, "HC-12", &monday(ANN_MATH, 5), &three));
        assert!(satisfied(&data, "HC-12", &monday(ANN_MATH, 5), &three[..2]));
    }

    #[test]
    fn test_reserve_class_exempt_from_double_booking() {
        let data = school();
        let existing = saved(&[(BOB_RESERVE, 1)]);
        let candidate = monday(ANN_RESERVE, 1);
        assert!(satisfied(&data, "HC-2", &candidate, &existing));
        assert!(!satisfied_without_exemptions(&data, "HC-2", &candidate, &existing));
    }

    #[test]
    fn test_team_class_exempt_from_double_booking() {
        let data = school();
        let existing = saved(&[(BOB_TEAM, 1)]);
        let candidate = monday(ANN_TEAM, 1);
        assert!(satisfied(&data, "HC-2", &candidate, &existing));
        assert!(!satisfied_without_exemptions(&data, "HC-2", &candidate, &existing));
    }

    #[test]
    fn test_team_room_exempt_from_double_booking() {
        let data = school();
        let existing = vec![monday(ANN_MATH, 1).with_id(1).with_room(TEAM_ROOM)];
        let candidate = monday(BOB_RESERVE, 1).with_room(TEAM_ROOM);
        assert!(satisfied(&data, "HC-3", &candidate, &existing));
        assert!(!satisfied_without_exemptions(&data, "HC-3", &candidate, &existing));

        let existing = vec![monday(ANN_MATH, 1).with_id(1).with_room(A1)];
        assert!(!satisfied(&data, "HC-3", &candidate.with_room(A1), &existing));
    }
}
