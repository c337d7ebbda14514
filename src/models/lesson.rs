//! Lesson model.
//!
//! A lesson is a unit of teaching to be placed into the week `weekly_frequency`
//! times. It aggregates one or more teachers (co-teaching), classes
//! (combined groups) and subjects (interdisciplinary lessons).

use serde::{Deserialize, Serialize};

use super::{ClassId, LessonId, SubjectId, TeacherId};

/// A lesson to be scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    /// Unique lesson identifier.
    pub id: LessonId,
    /// Teachers giving the lesson.
    pub teacher_ids: Vec<TeacherId>,
    /// Classes attending.
    pub class_ids: Vec<ClassId>,
    /// Subjects taught.
    pub subject_ids: Vec<SubjectId>,
    /// Number of instances per week.
    pub weekly_frequency: u32,
    /// Length in periods (ordering tie-breaker only).
    pub duration: u32,
    /// Required room type (e.g., "Lab"). `None` = any room or no room.
    pub required_room_type: Option<String>,
    /// Head count override. `None` = sum of the classes' student counts.
    pub student_count: Option<u32>,
    /// Inactive lessons are ignored by the engines.
    pub is_active: bool,
}

impl Lesson {
    /// Creates an active single-period lesson held once per week.
    pub fn new(id: LessonId) -> Self {
        Self {
            id,
            teacher_ids: Vec::new(),
            class_ids: Vec::new(),
            subject_ids: Vec::new(),
            weekly_frequency: 1,
            duration: 1,
            required_room_type: None,
            student_count: None,
            is_active: true,
        }
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher_id: TeacherId) -> Self {
        self.teacher_ids.push(teacher_id);
        self
    }

    /// Adds a class.
    pub fn with_class(mut self, class_id: ClassId) -> Self {
        self.class_ids.push(class_id);
        self
    }

    /// Adds a subject.
    pub fn with_subject(mut self, subject_id: SubjectId) -> Self {
        self.subject_ids.push(subject_id);
        self
    }

    /// Sets the weekly frequency.
    pub fn with_frequency(mut self, per_week: u32) -> Self {
        self.weekly_frequency = per_week;
        self
    }

    /// Sets the duration in periods.
    pub fn with_duration(mut self, periods: u32) -> Self {
        self.duration = periods;
        self
    }

    /// Sets the required room type.
    pub fn with_room_type(mut self, room_type: impl Into<String>) -> Self {
        self.required_room_type = Some(room_type.into());
        self
    }

    /// Sets the head count override.
    pub fn with_student_count(mut self, count: u32) -> Self {
        self.student_count = Some(count);
        self
    }

    /// Marks the lesson inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Whether `teacher_id` teaches this lesson.
    pub fn has_teacher(&self, teacher_id: TeacherId) -> bool {
        self.teacher_ids.contains(&teacher_id)
    }

    /// Whether `class_id` attends this lesson.
    pub fn has_class(&self, class_id: ClassId) -> bool {
        self.class_ids.contains(&class_id)
    }

    /// Whether `subject_id` is taught in this lesson.
    pub fn has_subject(&self, subject_id: SubjectId) -> bool {
        self.subject_ids.contains(&subject_id)
    }

    /// Whether a specific room type is required.
    pub fn requires_room_type(&self) -> bool {
        self.required_room_type
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}
