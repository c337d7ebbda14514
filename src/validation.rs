//! Input validation for school snapshots.
//!
//! Checks structural integrity of a [`SchoolData`] snapshot before a run.
//! Detects:
//! - Duplicate IDs per entity kind
//! - Lessons referencing unknown teachers, classes, subjects
//! - Lessons with a weekly frequency of zero
//! - Required room types no room provides
//! - Preferred subject rooms that do not exist
//! - No active lessons / no teaching periods (fatal for the engines)

use std::collections::HashSet;
use std::hash::Hash;

use tracing::warn;

use crate::error::{TimetableError, TimetableResult};
use crate::models::SchoolData;

/// Validation result.
pub type InputValidation = Result<(), Vec<ValidationError>>;

/// A validation finding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of one kind share an ID.
    DuplicateId,
    /// A lesson references an entity that doesn't exist.
    UnknownReference,
    /// A lesson is scheduled zero times a week.
    ZeroFrequency,
    /// No room has the type a lesson requires.
    UnavailableRoomType,
    /// A subject prefers a room that doesn't exist.
    UnknownPreferredRoom,
    /// Nothing to schedule.
    NoActiveLessons,
    /// No non-break periods.
    NoPeriods,
}

impl ValidationErrorKind {
    /// Whether an engine cannot start with this finding.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            ValidationErrorKind::NoActiveLessons | ValidationErrorKind::NoPeriods
        )
    }
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn duplicates<K: Hash + Eq + Copy + std::fmt::Display>(
    kind: &str,
    ids: impl Iterator<Item = K>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {kind} ID: {id}"),
            ));
        }
    }
}

/// Validates a snapshot.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(data: &SchoolData) -> InputValidation {
    let mut errors = Vec::new();

    duplicates("teacher", data.teachers().iter().map(|t| t.id), &mut errors);
    duplicates("class", data.classes().iter().map(|c| c.id), &mut errors);
    duplicates("room", data.rooms().iter().map(|r| r.id), &mut errors);
    duplicates("subject", data.subjects().iter().map(|s| s.id), &mut errors);
    duplicates("lesson", data.lessons().iter().map(|l| l.id), &mut errors);
    duplicates("period", data.periods().iter().map(|p| p.id), &mut errors);
    duplicates("timetable", data.timetables().iter().map(|t| t.id), &mut errors);

    for lesson in data.lessons() {
        for id in &lesson.teacher_ids {
            if data.teacher(*id).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("Lesson {} references unknown teacher {id}", lesson.id),
                ));
            }
        }
        for id in &lesson.class_ids {
            if data.class(*id).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("Lesson {} references unknown class {id}", lesson.id),
                ));
            }
        }
        for id in &lesson.subject_ids {
            if data.subject(*id).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("Lesson {} references unknown subject {id}", lesson.id),
                ));
            }
        }
        if lesson.is_active && lesson.weekly_frequency == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroFrequency,
                format!("Lesson {} has a weekly frequency of 0", lesson.id),
            ));
        }
        if let Some(room_type) = lesson.required_room_type.as_deref() {
            if lesson.is_active
                && lesson.requires_room_type()
                && data.rooms_of_type(room_type).is_empty()
            {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnavailableRoomType,
                    format!(
                        "Lesson {} requires room type '{room_type}' but no room has it",
                        lesson.id
                    ),
                ));
            }
        }
    }

    for subject in data.subjects() {
        if let Some(room_id) = subject.preferred_room_id {
            if data.room(room_id).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownPreferredRoom,
                    format!(
                        "Subject '{}' prefers unknown room {room_id}",
                        subject.name
                    ),
                ));
            }
        }
    }

    if data.active_lessons().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoActiveLessons,
            "No active lessons to schedule",
        ));
    }
    if data.teaching_periods().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoPeriods,
            "No teaching periods configured",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Runs [`validate_input`], logs non-fatal findings and fails on the first
/// fatal one.
pub fn ensure_schedulable(data: &SchoolData) -> TimetableResult<()> {
    let Err(errors) = validate_input(data) else {
        return Ok(());
    };
    for e in errors.iter().filter(|e| !e.kind.is_fatal()) {
        warn!(event = "input_issue", kind = ?e.kind, message = %e.message);
    }
    match errors.iter().find(|e| e.kind.is_fatal()).map(|e| e.kind) {
        Some(ValidationErrorKind::NoActiveLessons) => Err(TimetableError::NoActiveLessons),
        Some(_) => Err(TimetableError::NoPeriods),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lesson, Period, Room, SchoolClass, Subject, Teacher};

    fn sample() -> SchoolData {
        SchoolData::new()
            .with_teacher(Teacher::new(1, "A", "Teacher"))
            .with_class(SchoolClass::new(10, "1A"))
            .with_subject(Subject::new(20, "Math"))
            .with_room(Room::new(30, "A1"))
            .with_period(Period::new(1, 1))
            .with_lesson(Lesson::new(100).with_teacher(1).with_class(10).with_subject(20))
    }

    fn kinds(data: &SchoolData) -> Vec<ValidationErrorKind> {
        validate_input(data)
            .err()
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample()).is_ok());
        assert!(ensure_schedulable(&sample()).is_ok());
    }

    #[test]
    fn test_duplicate_id() {
        let data = sample().with_room(Room::new(30, "A2"));
        let errors = validate_input(&data).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateId);
        assert!(errors[0].message.contains("room"));
    }

    #[test]
    fn test_unknown_references() {
        let data = sample().with_lesson(Lesson::new(101).with_teacher(9).with_class(99));
        assert_eq!(
            kinds(&data),
            vec![ValidationErrorKind::UnknownReference, ValidationErrorKind::UnknownReference]
        );
    }

    #[test]
    fn test_room_type_and_preferred_room() {
        let data = sample()
            .with_lesson(Lesson::new(101).with_teacher(1).with_room_type("Lab"))
            .with_subject(Subject::new(21, "Chem").with_preferred_room(77));
        assert_eq!(
            kinds(&data),
            vec![
                ValidationErrorKind::UnavailableRoomType,
                ValidationErrorKind::UnknownPreferredRoom
            ]
        );
        // Not fatal.
        assert!(ensure_schedulable(&data).is_ok());
    }

    #[test]
    fn test_fatal_conditions() {
        let no_lessons = SchoolData::new().with_period(Period::new(1, 1));
        assert!(matches!(
            ensure_schedulable(&no_lessons),
            Err(TimetableError::NoActiveLessons)
        ));

        let only_breaks = sample();
        let only_breaks = SchoolData::new()
            .with_lesson(only_breaks.lessons()[0].clone())
            .with_period(Period::break_period(1, 3));
        assert!(matches!(
            ensure_schedulable(&only_breaks),
            Err(TimetableError::NoPeriods)
        ));
    }

    #[test]
    fn test_zero_frequency() {
        let data = sample().with_lesson(Lesson::new(101).with_frequency(0));
        assert_eq!(kinds(&data), vec![ValidationErrorKind::ZeroFrequency]);
    }
}
