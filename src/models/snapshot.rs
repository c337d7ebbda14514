//! Read-only school snapshot.
//!
//! The storage collaborator hydrates every entity once per operation; the
//! validator and the engines only read from it. Entities keep their
//! insertion order (rooms are tried in that order) and are indexed by id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{
    AvailabilityTable, ClassId, Lesson, LessonId, Period, PeriodId, Room, RoomId, SchoolClass,
    Subject, SubjectId, Teacher, TeacherId, Timetable, TimetableId,
};

/// Availability tables for the four entity kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilitySet {
    pub teachers: AvailabilityTable,
    pub classes: AvailabilityTable,
    pub rooms: AvailabilityTable,
    pub subjects: AvailabilityTable,
}

/// A fully hydrated, immutable entity snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "SnapshotParts", into = "SnapshotParts")]
pub struct SchoolData {
    teachers: Vec<Teacher>,
    classes: Vec<SchoolClass>,
    rooms: Vec<Room>,
    subjects: Vec<Subject>,
    lessons: Vec<Lesson>,
    periods: Vec<Period>,
    timetables: Vec<Timetable>,
    /// Availability records.
    pub availability: AvailabilitySet,
    index: Index,
}

#[derive(Debug, Clone, Default)]
struct Index {
    teachers: HashMap<TeacherId, usize>,
    classes: HashMap<ClassId, usize>,
    rooms: HashMap<RoomId, usize>,
    subjects: HashMap<SubjectId, usize>,
    lessons: HashMap<LessonId, usize>,
    periods: HashMap<PeriodId, usize>,
    timetables: HashMap<TimetableId, usize>,
}

/// Wire form of [`SchoolData`]; the index is rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotParts {
    teachers: Vec<Teacher>,
    classes: Vec<SchoolClass>,
    rooms: Vec<Room>,
    subjects: Vec<Subject>,
    lessons: Vec<Lesson>,
    periods: Vec<Period>,
    timetables: Vec<Timetable>,
    availability: AvailabilitySet,
}

impl From<SnapshotParts> for SchoolData {
    fn from(p: SnapshotParts) -> Self {
        let mut data = SchoolData {
            teachers: p.teachers,
            classes: p.classes,
            rooms: p.rooms,
            subjects: p.subjects,
            lessons: p.lessons,
            periods: p.periods,
            timetables: p.timetables,
            availability: p.availability,
            index: Index::default(),
        };
        data.reindex();
        data
    }
}

impl From<SchoolData> for SnapshotParts {
    fn from(d: SchoolData) -> Self {
        SnapshotParts {
            teachers: d.teachers,
            classes: d.classes,
            rooms: d.rooms,
            subjects: d.subjects,
            lessons: d.lessons,
            periods: d.periods,
            timetables: d.timetables,
            availability: d.availability,
        }
    }
}

// First occurrence wins on duplicate ids; `validation` reports duplicates.
fn index_of<K: std::hash::Hash + Eq + Copy, T>(items: &[T], key: impl Fn(&T) -> K) -> HashMap<K, usize> {
    let mut map = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        map.entry(key(item)).or_insert(i);
    }
    map
}

impl SchoolData {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    fn reindex(&mut self) {
        self.index = Index {
            teachers: index_of(&self.teachers, |t| t.id),
            classes: index_of(&self.classes, |c| c.id),
            rooms: index_of(&self.rooms, |r| r.id),
            subjects: index_of(&self.subjects, |s| s.id),
            lessons: index_of(&self.lessons, |l| l.id),
            periods: index_of(&self.periods, |p| p.id),
            timetables: index_of(&self.timetables, |t| t.id),
        };
    }

    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.index.teachers.entry(teacher.id).or_insert(self.teachers.len());
        self.teachers.push(teacher);
        self
    }

    pub fn with_class(mut self, class: SchoolClass) -> Self {
        self.index.classes.entry(class.id).or_insert(self.classes.len());
        self.classes.push(class);
        self
    }

    pub fn with_room(mut self, room: Room) -> Self {
        self.index.rooms.entry(room.id).or_insert(self.rooms.len());
        self.rooms.push(room);
        self
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.index.subjects.entry(subject.id).or_insert(self.subjects.len());
        self.subjects.push(subject);
        self
    }

    pub fn with_lesson(mut self, lesson: Lesson) -> Self {
        self.index.lessons.entry(lesson.id).or_insert(self.lessons.len());
        self.lessons.push(lesson);
        self
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.index.periods.entry(period.id).or_insert(self.periods.len());
        self.periods.push(period);
        self
    }

    pub fn with_timetable(mut self, timetable: Timetable) -> Self {
        self.index
            .timetables
            .entry(timetable.id)
            .or_insert(self.timetables.len());
        self.timetables.push(timetable);
        self
    }

    /// Replaces the availability tables.
    pub fn with_availability(mut self, availability: AvailabilitySet) -> Self {
        self.availability = availability;
        self
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn classes(&self) -> &[SchoolClass] {
        &self.classes
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn timetables(&self) -> &[Timetable] {
        &self.timetables
    }

    pub fn teacher(&self, id: TeacherId) -> Option<&Teacher> {
        self.index.teachers.get(&id).map(|&i| &self.teachers[i])
    }

    pub fn class(&self, id: ClassId) -> Option<&SchoolClass> {
        self.index.classes.get(&id).map(|&i| &self.classes[i])
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.index.rooms.get(&id).map(|&i| &self.rooms[i])
    }

    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.index.subjects.get(&id).map(|&i| &self.subjects[i])
    }

    pub fn lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.index.lessons.get(&id).map(|&i| &self.lessons[i])
    }

    pub fn period(&self, id: PeriodId) -> Option<&Period> {
        self.index.periods.get(&id).map(|&i| &self.periods[i])
    }

    pub fn timetable(&self, id: TimetableId) -> Option<&Timetable> {
        self.index.timetables.get(&id).map(|&i| &self.timetables[i])
    }

    /// Active lessons with a positive weekly frequency, in input order.
    pub fn active_lessons(&self) -> Vec<&Lesson> {
        self.lessons
            .iter()
            .filter(|l| l.is_active && l.weekly_frequency > 0)
            .collect()
    }

    /// Non-break periods ordered by number.
    pub fn teaching_periods(&self) -> Vec<&Period> {
        let mut periods: Vec<&Period> = self.periods.iter().filter(|p| !p.is_break).collect();
        periods.sort_by_key(|p| p.number);
        periods
    }

    /// Ordered numbers of the non-break periods.
    pub fn teaching_period_numbers(&self) -> Vec<u32> {
        self.teaching_periods().iter().map(|p| p.number).collect()
    }

    /// Period number for an id, if the period exists.
    pub fn period_number(&self, id: PeriodId) -> Option<u32> {
        self.period(id).map(|p| p.number)
    }

    /// Head count of a lesson: explicit override, else the sum of the known
    /// class sizes, else unknown.
    pub fn students_for(&self, lesson: &Lesson) -> Option<u32> {
        if lesson.student_count.is_some() {
            return lesson.student_count;
        }
        let counts: Vec<u32> = lesson
            .class_ids
            .iter()
            .filter_map(|id| self.class(*id).and_then(|c| c.student_count))
            .collect();
        if counts.is_empty() {
            None
        } else {
            Some(counts.iter().sum())
        }
    }

    /// Rooms of the given type, in insertion order.
    pub fn rooms_of_type(&self, room_type: &str) -> Vec<&Room> {
        self.rooms.iter().filter(|r| r.is_type(room_type)).collect()
    }

    /// Human-readable description "Subject / Class / Teacher" of a lesson.
    ///
    /// Unknown references are skipped; multi-valued parts are joined by ", ".
    pub fn describe_lesson(&self, lesson: &Lesson) -> String {
        let subjects: Vec<String> = lesson
            .subject_ids
            .iter()
            .filter_map(|id| self.subject(*id).map(|s| s.name.clone()))
            .collect();
        let classes: Vec<String> = lesson
            .class_ids
            .iter()
            .filter_map(|id| self.class(*id).map(|c| c.name.clone()))
            .collect();
        let teachers: Vec<String> = lesson
            .teacher_ids
            .iter()
            .filter_map(|id| self.teacher(*id).map(|t| t.full_name()))
            .collect();

        let parts: Vec<String> = [subjects, classes, teachers]
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.join(", "))
            .collect();
        if parts.is_empty() {
            format!("lesson {}", lesson.id)
        } else {
            parts.join(" / ")
        }
    }
}
