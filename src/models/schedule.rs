//! Scheduled lessons (placements) and timetables.
//!
//! A scheduled lesson puts one instance of a [`Lesson`](super::Lesson) at a
//! (day, period) with zero or one primary room plus any number of additional
//! rooms. Candidates created during scheduling have no id yet; persisted
//! placements carry one.

use serde::{Deserialize, Serialize};

use super::{LessonId, PeriodId, RoomId, ScheduledLessonId, TimetableId, Weekday};

/// A timetable header. Placements reference it by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timetable {
    pub id: TimetableId,
    pub name: String,
    /// Week the timetable applies to.
    pub week_number: u32,
}

impl Timetable {
    pub fn new(id: TimetableId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            week_number: 1,
        }
    }

    pub fn with_week(mut self, week_number: u32) -> Self {
        self.week_number = week_number;
        self
    }
}

/// A (day, period) cell of the week grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub day: Weekday,
    pub period_id: PeriodId,
}

impl Slot {
    pub fn new(day: Weekday, period_id: PeriodId) -> Self {
        Self { day, period_id }
    }
}

/// A lesson placed at a day, period and room(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledLesson {
    /// `None` for transient candidates.
    pub id: Option<ScheduledLessonId>,
    pub lesson_id: LessonId,
    pub day: Weekday,
    pub period_id: PeriodId,
    /// Primary room.
    pub room_id: Option<RoomId>,
    /// Further rooms for multi-room lessons.
    pub additional_room_ids: Vec<RoomId>,
    pub timetable_id: TimetableId,
    pub week_number: u32,
    /// Locked placements survive regeneration and cannot be edited.
    pub locked: bool,
}

impl ScheduledLesson {
    /// Creates an unlocked candidate placement without rooms.
    pub fn candidate(
        lesson_id: LessonId,
        timetable_id: TimetableId,
        day: Weekday,
        period_id: PeriodId,
    ) -> Self {
        Self {
            id: None,
            lesson_id,
            day,
            period_id,
            room_id: None,
            additional_room_ids: Vec::new(),
            timetable_id,
            week_number: 1,
            locked: false,
        }
    }

    /// Sets the id.
    pub fn with_id(mut self, id: ScheduledLessonId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the primary room.
    pub fn with_room(mut self, room_id: RoomId) -> Self {
        self.room_id = Some(room_id);
        self
    }

    /// Sets an optional primary room.
    pub fn with_room_opt(mut self, room_id: Option<RoomId>) -> Self {
        self.room_id = room_id;
        self
    }

    /// Adds an additional room.
    pub fn with_additional_room(mut self, room_id: RoomId) -> Self {
        self.additional_room_ids.push(room_id);
        self
    }

    /// Sets the week number.
    pub fn with_week(mut self, week_number: u32) -> Self {
        self.week_number = week_number;
        self
    }

    /// Marks the placement locked.
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// The (day, period) cell.
    #[inline]
    pub fn slot(&self) -> Slot {
        Slot::new(self.day, self.period_id)
    }

    /// Whether both placements occupy the same (day, period).
    #[inline]
    pub fn same_slot(&self, other: &ScheduledLesson) -> bool {
        self.day == other.day && self.period_id == other.period_id
    }

    /// Primary and additional rooms, primary first, without duplicates.
    pub fn rooms(&self) -> Vec<RoomId> {
        let mut rooms = Vec::with_capacity(1 + self.additional_room_ids.len());
        rooms.extend(self.room_id);
        for r in &self.additional_room_ids {
            if !rooms.contains(r) {
                rooms.push(*r);
            }
        }
        rooms
    }

    /// Whether the placement uses `room_id` as primary or additional room.
    pub fn uses_room(&self, room_id: RoomId) -> bool {
        self.room_id == Some(room_id) || self.additional_room_ids.contains(&room_id)
    }

    /// Whether `other` is this same persisted placement.
    #[inline]
    pub fn is_same_record(&self, other: &ScheduledLesson) -> bool {
        matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}

/// Placements of `timetable_id`, in input order.
pub fn placements_in(schedule: &[ScheduledLesson], timetable_id: TimetableId) -> Vec<&ScheduledLesson> {
    schedule
        .iter()
        .filter(|s| s.timetable_id == timetable_id)
        .collect()
}

/// Next free placement id after the largest id present.
pub fn next_placement_id(schedule: &[ScheduledLesson]) -> ScheduledLessonId {
    schedule
        .iter()
        .filter_map(|s| s.id)
        .max()
        .map_or(1, |m| m + 1)
}
