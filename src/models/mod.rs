//! School timetabling domain models.
//!
//! Read-only entity snapshots supplied by the storage collaborator and the
//! placement type produced by the engines.
//!
//! # Domain Mappings
//!
//! | u-timetable | Generic scheduling |
//! |-------------|--------------------|
//! | Lesson | Task (repeated `weekly_frequency` times) |
//! | ScheduledLesson | Assignment |
//! | Teacher / SchoolClass / Room | Resources |
//! | Weekday × Period | Discrete time slot |

mod availability;
mod calendar;
mod class;
mod lesson;
mod room;
mod schedule;
mod snapshot;
mod teacher;

pub use availability::{Availability, AvailabilityTable, Importance};
pub use calendar::{gap_numbers, longest_consecutive_run, school_days, Period, Weekday};
pub use class::SchoolClass;
pub use lesson::Lesson;
pub use room::{Room, Subject};
pub use schedule::{next_placement_id, placements_in, ScheduledLesson, Slot, Timetable};
pub use snapshot::{AvailabilitySet, SchoolData};
pub use teacher::Teacher;

pub type TeacherId = u32;
pub type ClassId = u32;
pub type RoomId = u32;
pub type SubjectId = u32;
pub type LessonId = u32;
pub type PeriodId = u32;
pub type TimetableId = u32;
pub type ScheduledLessonId = u32;
