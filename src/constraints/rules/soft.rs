//! Soft rules SC-1 .. SC-11.
//!
//! Soft violations never block a placement; the engines turn them into
//! score penalties sized by the constraint priority.

use super::{ConstraintRule, RuleInput};
use crate::constraints::result::{details, RuleVerdict};
use crate::models::gap_numbers;

// ======================== Availability dislikes ========================

/// SC-1: teacher marked -2/-1 at the slot.
#[derive(Debug, Clone, Copy)]
pub struct TeacherDislike;

impl ConstraintRule for TeacherDislike {
    fn code(&self) -> &'static str {
        "SC-1"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        let c = input.candidate;
        let table = &input.data.availability.teachers;
        match input
            .teachers()
            .find(|t| table.importance(t.id, c.day, c.period_id).is_dislike())
        {
            Some(t) => RuleVerdict::violated(
                input.message(&[&t.full_name(), input.day_name(), &input.period_label()]),
                details([
                    ("teacher_id", t.id.into()),
                    ("lesson_id", input.lesson.id.into()),
                    (
                        "importance",
                        i64::from(table.importance(t.id, c.day, c.period_id).value()).into(),
                    ),
                ]),
            ),
            None => RuleVerdict::Satisfied,
        }
    }
}

/// SC-2: class marked -2/-1 at the slot.
#[derive(Debug, Clone, Copy)]
pub struct ClassDislike;

impl ConstraintRule for ClassDislike {
    fn code(&self) -> &'static str {
        "SC-2"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        let c = input.candidate;
        let table = &input.data.availability.classes;
        match input
            .classes()
            .find(|cl| table.importance(cl.id, c.day, c.period_id).is_dislike())
        {
            Some(cl) => RuleVerdict::violated(
                input.message(&[&cl.name, input.day_name(), &input.period_label()]),
                details([("class_id", cl.id.into()), ("lesson_id", input.lesson.id.into())]),
            ),
            None => RuleVerdict::Satisfied,
        }
    }
}

/// SC-3: subject marked -2/-1 at the slot.
#[derive(Debug, Clone, Copy)]
pub struct SubjectTimePreference;

impl ConstraintRule for SubjectTimePreference {
    fn code(&self) -> &'static str {
        "SC-3"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        let c = input.candidate;
        let table = &input.data.availability.subjects;
        let disliked = input
            .lesson
            .subject_ids
            .iter()
            .filter_map(|id| input.data.subject(*id))
            .find(|s| table.importance(s.id, c.day, c.period_id).is_dislike());
        match disliked {
            Some(s) => RuleVerdict::violated(
                input.message(&[&s.name, input.day_name(), &input.period_label()]),
                details([("subject_id", s.id.into()), ("lesson_id", input.lesson.id.into())]),
            ),
            None => RuleVerdict::Satisfied,
        }
    }
}

/// SC-4: a candidate room marked -2/-1 at the slot.
#[derive(Debug, Clone, Copy)]
pub struct RoomPreference;

impl ConstraintRule for RoomPreference {
    fn code(&self) -> &'static str {
        "SC-4"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        let c = input.candidate;
        let table = &input.data.availability.rooms;
        match input
            .rooms()
            .into_iter()
            .find(|r| table.importance(r.id, c.day, c.period_id).is_dislike())
        {
            Some(r) => RuleVerdict::violated(
                input.message(&[&r.number, input.day_name(), &input.period_label()]),
                details([("room_id", r.id.into()), ("lesson_id", input.lesson.id.into())]),
            ),
            None => RuleVerdict::Satisfied,
        }
    }
}

// ======================== Lunch window ========================

fn in_lunch_window(input: &RuleInput<'_>) -> bool {
    input
        .period_number()
        .is_some_and(|n| input.lunch_periods.contains(&n))
}

fn wants_lunch(minutes: Option<u32>) -> bool {
    minutes.is_some_and(|m| m > 0)
}

/// SC-5: a teacher with a configured lunch break teaches in the window.
#[derive(Debug, Clone, Copy)]
pub struct TeacherLunchBreak;

impl ConstraintRule for TeacherLunchBreak {
    fn code(&self) -> &'static str {
        "SC-5"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        if !in_lunch_window(input) {
            return RuleVerdict::Satisfied;
        }
        match input
            .teachers()
            .find(|t| wants_lunch(t.min_lunch_break_minutes))
        {
            Some(t) => RuleVerdict::violated(
                input.message(&[&t.full_name(), input.day_name(), &input.period_label()]),
                details([("teacher_id", t.id.into()), ("lesson_id", input.lesson.id.into())]),
            ),
            None => RuleVerdict::Satisfied,
        }
    }
}

/// SC-6: a class with a configured lunch break has a lesson in the window.
#[derive(Debug, Clone, Copy)]
pub struct ClassLunchBreak;

impl ConstraintRule for ClassLunchBreak {
    fn code(&self) -> &'static str {
        "SC-6"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        if !in_lunch_window(input) {
            return RuleVerdict::Satisfied;
        }
        match input
            .classes()
            .find(|c| wants_lunch(c.min_lunch_break_minutes))
        {
            Some(c) => RuleVerdict::violated(
                input.message(&[&c.name, input.day_name(), &input.period_label()]),
                details([("class_id", c.id.into()), ("lesson_id", input.lesson.id.into())]),
            ),
            None => RuleVerdict::Satisfied,
        }
    }
}

// ======================== Day shape ========================

/// SC-7: no empty teaching period between a class's first and last lesson
/// of the day.
#[derive(Debug, Clone, Copy)]
pub struct ClassGap;

impl ConstraintRule for ClassGap {
    fn code(&self) -> &'static str {
        "SC-7"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        let teaching = input.data.teaching_period_numbers();
        for class in input.classes() {
            let occupied = input.day_numbers(|l| l.has_class(class.id));
            let gaps = gap_numbers(&occupied, &teaching);
            if let Some(&first) = gaps.first() {
                return RuleVerdict::violated(
                    input.message(&[&class.name, input.day_name(), &first.to_string()]),
                    details([
                        ("class_id", class.id.into()),
                        ("lesson_id", input.lesson.id.into()),
                        ("gap_periods", gaps.into()),
                    ]),
                );
            }
        }
        RuleVerdict::Satisfied
    }
}

/// SC-10: teacher periods per day ≥ min.
#[derive(Debug, Clone, Copy)]
pub struct TeacherDailyMin;

impl ConstraintRule for TeacherDailyMin {
    fn code(&self) -> &'static str {
        "SC-10"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        for teacher in input.teachers() {
            let Some(min) = teacher.min_periods_per_day else {
                continue;
            };
            let count = input.day_count(|l| l.has_teacher(teacher.id));
            if count < min as usize {
                return RuleVerdict::violated(
                    input.message(&[
                        &teacher.full_name(),
                        &count.to_string(),
                        input.day_name(),
                        &min.to_string(),
                    ]),
                    details([
                        ("teacher_id", teacher.id.into()),
                        ("count", (count as i64).into()),
                        ("min", min.into()),
                    ]),
                );
            }
        }
        RuleVerdict::Satisfied
    }
}

/// SC-11: class periods per day ≥ min.
#[derive(Debug, Clone, Copy)]
pub struct ClassDailyMin;

impl ConstraintRule for ClassDailyMin {
    fn code(&self) -> &'static str {
        "SC-11"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        for class in input.classes() {
            let Some(min) = class.min_periods_per_day else {
                continue;
            };
            let count = input.day_count(|l| l.has_class(class.id));
            if count < min as usize {
                return RuleVerdict::violated(
                    input.message(&[
                        &class.name,
                        &count.to_string(),
                        input.day_name(),
                        &min.to_string(),
                    ]),
                    details([
                        ("class_id", class.id.into()),
                        ("count", (count as i64).into()),
                        ("min", min.into()),
                    ]),
                );
            }
        }
        RuleVerdict::Satisfied
    }
}

// ======================== Rooms ========================

/// SC-8: the primary room matches the lesson's required type. A missing
/// room counts as a mismatch.
#[derive(Debug, Clone, Copy)]
pub struct RoomTypeMismatch;

impl ConstraintRule for RoomTypeMismatch {
    fn code(&self) -> &'static str {
        "SC-8"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        let Some(required) = input
            .lesson
            .required_room_type
            .as_deref()
            .filter(|_| input.lesson.requires_room_type())
        else {
            return RuleVerdict::Satisfied;
        };
        let actual = match input.candidate.room_id {
            None => "no room".to_string(),
            Some(id) => match input.data.room(id) {
                Some(room) if room.is_type(required) => return RuleVerdict::Satisfied,
                Some(room) => room.number.clone(),
                None => return RuleVerdict::Satisfied,
            },
        };
        RuleVerdict::violated(
            input.message(&[&input.data.describe_lesson(input.lesson), required, &actual]),
            details([
                ("lesson_id", input.lesson.id.into()),
                ("required_room_type", required.into()),
                (
                    "room_id",
                    input.candidate.room_id.map_or(-1, i64::from).into(),
                ),
            ]),
        )
    }
}

/// SC-9: a subject with a preferred room is taught there.
#[derive(Debug, Clone, Copy)]
pub struct PreferredSubjectRoom;

impl ConstraintRule for PreferredSubjectRoom {
    fn code(&self) -> &'static str {
        "SC-9"
    }

    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict {
        for subject in input
            .lesson
            .subject_ids
            .iter()
            .filter_map(|id| input.data.subject(*id))
        {
            let Some(preferred) = subject.preferred_room_id else {
                continue;
            };
            if input.candidate.uses_room(preferred) {
                continue;
            }
            let room = input
                .data
                .room(preferred)
                .map_or_else(|| preferred.to_string(), |r| r.number.clone());
            return RuleVerdict::violated(
                input.message(&[&subject.name, &room]),
                details([
                    ("subject_id", subject.id.into()),
                    ("preferred_room_id", preferred.into()),
                    ("lesson_id", input.lesson.id.into()),
                ]),
            );
        }
        RuleVerdict::Satisfied
    }
}

#[cfg(test)]
mod tests {
    use crate::constraints::{ConstraintValidator, ValidationContext};
    use crate::fixtures::{self, CHEM_1A, LAB, MATH_1A, ROOM_A, TT};
    use crate::models::{ScheduledLesson, Weekday};

    #[test]
    fn test_teacher_dislike() {
        let data = fixtures::school();
        let validator = ConstraintValidator::new(&data);
        let ctx = ValidationContext::new();

        let friday = ScheduledLesson::candidate(MATH_1A, TT, Weekday::Friday, 6).with_room(ROOM_A);
        assert!(!validator.validate_one("SC-1", &friday, &[], &ctx).satisfied);

        let monday = ScheduledLesson::candidate(MATH_1A, TT, Weekday::Monday, 6).with_room(ROOM_A);
        assert!(validator.validate_one("SC-1", &monday, &[], &ctx).satisfied);
    }

    #[test]
    fn test_room_type_mismatch() {
        let data = fixtures::school();
        let validator = ConstraintValidator::new(&data);
        let ctx = ValidationContext::new();
        let at = |room: Option<u32>| {
            ScheduledLesson::candidate(CHEM_1A, TT, Weekday::Wednesday, 2).with_room_opt(room)
        };

        assert!(validator.validate_one("SC-8", &at(Some(LAB)), &[], &ctx).satisfied);
        assert!(!validator.validate_one("SC-8", &at(Some(ROOM_A)), &[], &ctx).satisfied);
        assert!(!validator.validate_one("SC-8", &at(None), &[], &ctx).satisfied);

        // Lessons without a required type never mismatch.
        let math = ScheduledLesson::candidate(MATH_1A, TT, Weekday::Wednesday, 2);
        assert!(validator.validate_one("SC-8", &math, &[], &ctx).satisfied);
    }
}
