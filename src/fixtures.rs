//! Shared test school.
//!
//! Three teachers plus a placeholder, two classes plus the reserve class,
//! a lab and two classrooms, five teaching periods around a break.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::models::{
    AvailabilitySet, AvailabilityTable, ClassId, Lesson, LessonId, Period, Room, RoomId,
    ScheduledLesson, SchoolClass, SchoolData, Subject, SubjectId, Teacher, TeacherId, Timetable,
    TimetableId, Weekday,
};

pub const TT: TimetableId = 1;

pub const SMITH: TeacherId = 1;
pub const JONES: TeacherId = 2;
pub const BROWN: TeacherId = 3;
pub const PLACEHOLDER: TeacherId = 4;

pub const CLASS_1A: ClassId = 10;
pub const CLASS_1B: ClassId = 11;
pub const RESERVE: ClassId = 12;

pub const MATH: SubjectId = 20;
pub const CHEM: SubjectId = 21;
pub const ENGLISH: SubjectId = 22;

pub const ROOM_A: RoomId = 30;
pub const ROOM_B: RoomId = 31;
pub const LAB: RoomId = 32;

pub const MATH_1A: LessonId = 100;
pub const MATH_1B: LessonId = 101;
pub const CHEM_1A: LessonId = 102;
pub const CHEM_1B: LessonId = 103;
pub const ENG_1A: LessonId = 104;
/// Co-taught by Brown and Jones.
pub const ENG_1B: LessonId = 105;
/// Brown's substitution reserve hour.
pub const RESERVE_DUTY: LessonId = 106;

pub fn school() -> SchoolData {
    SchoolData::new()
        .with_timetable(Timetable::new(TT, "Main"))
        .with_teacher(
            Teacher::new(SMITH, "J.", "Smith")
                .with_department("Maths")
                .with_qualification(MATH)
                .with_max_consecutive(4),
        )
        .with_teacher(
            Teacher::new(JONES, "A.", "Jones")
                .with_department("Science")
                .with_qualification(CHEM)
                .with_qualification(ENGLISH),
        )
        .with_teacher(
            Teacher::new(BROWN, "K.", "Brown")
                .with_department("Maths")
                .with_qualification(ENGLISH)
                .with_max_substitutions(3),
        )
        .with_teacher(Teacher::new(PLACEHOLDER, "xy", ""))
        .with_class(SchoolClass::new(CLASS_1A, "1A").with_students(24))
        .with_class(SchoolClass::new(CLASS_1B, "1B").with_students(22))
        .with_class(SchoolClass::new(RESERVE, "v-res"))
        .with_subject(Subject::new(MATH, "Math"))
        .with_subject(Subject::new(CHEM, "Chemistry").with_preferred_room(LAB))
        .with_subject(Subject::new(ENGLISH, "English"))
        .with_room(Room::new(ROOM_A, "A1").with_capacity(30))
        .with_room(Room::new(ROOM_B, "A2").with_capacity(30))
        .with_room(Room::new(LAB, "L1").with_type("Lab").with_capacity(26))
        .with_period(Period::new(1, 1))
        .with_period(Period::new(2, 2))
        .with_period(Period::new(3, 3))
        .with_period(Period::break_period(4, 4))
        .with_period(Period::new(5, 5))
        .with_period(Period::new(6, 6))
        .with_lesson(lesson(MATH_1A, &[SMITH], CLASS_1A, MATH, 4))
        .with_lesson(lesson(MATH_1B, &[SMITH], CLASS_1B, MATH, 3))
        .with_lesson(lesson(CHEM_1A, &[JONES], CLASS_1A, CHEM, 2).with_room_type("Lab"))
        .with_lesson(lesson(CHEM_1B, &[JONES], CLASS_1B, CHEM, 2).with_room_type("Lab"))
        .with_lesson(lesson(ENG_1A, &[BROWN], CLASS_1A, ENGLISH, 3))
        .with_lesson(lesson(ENG_1B, &[BROWN, JONES], CLASS_1B, ENGLISH, 2))
        .with_lesson(Lesson::new(RESERVE_DUTY).with_teacher(BROWN).with_class(RESERVE))
        .with_availability(AvailabilitySet {
            teachers: AvailabilityTable::new()
                .with(JONES, Weekday::Tuesday, 1, -3)
                .with(SMITH, Weekday::Friday, 6, -1),
            classes: AvailabilityTable::new().with(CLASS_1A, Weekday::Monday, 1, 2),
            ..Default::default()
        })
}

fn lesson(id: LessonId, teachers: &[TeacherId], class: ClassId, subject: SubjectId, per_week: u32) -> Lesson {
    teachers
        .iter()
        .fold(Lesson::new(id), |l, t| l.with_teacher(*t))
        .with_class(class)
        .with_subject(subject)
        .with_frequency(per_week)
}

/// Conflict-free Monday morning.
pub fn busy_monday() -> Vec<ScheduledLesson> {
    let at = |id, lesson, period, room| {
        ScheduledLesson::candidate(lesson, TT, Weekday::Monday, period)
            .with_id(id)
            .with_room(room)
    };
    vec![
        at(1, MATH_1A, 1, ROOM_A),
        at(2, CHEM_1B, 1, LAB),
        at(3, ENG_1A, 2, ROOM_B),
        at(4, MATH_1B, 2, ROOM_A),
        at(5, ENG_1B, 3, ROOM_B),
        at(6, RESERVE_DUTY, 5, ROOM_B),
    ]
}

static TRACING: Once = Once::new();

/// Routes engine logs to the test output. Filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
