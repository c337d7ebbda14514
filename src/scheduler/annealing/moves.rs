//! Neighbourhood moves.
//!
//! | Move | Share | Effect |
//! |------|-------|--------|
//! | Swap | 40% | two placements exchange day and period, and rooms when each fits the other |
//! | Relocate | 30% | one placement moves to a random day and period |
//! | Change room | 30% | one placement takes another eligible room |
//!
//! Locked placements are never touched.

use rand::prelude::IndexedRandom;
use rand::Rng;

use crate::models::{PeriodId, RoomId, ScheduledLesson, SchoolData, Weekday};

/// Kind of a neighbourhood move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Swap,
    Relocate,
    ChangeRoom,
}

impl MoveKind {
    /// Draws a move kind with the 40/30/30 split.
    pub fn sample<R: Rng>(rng: &mut R) -> Self {
        let roll: f64 = rng.random();
        if roll < 0.4 {
            MoveKind::Swap
        } else if roll < 0.7 {
            MoveKind::Relocate
        } else {
            MoveKind::ChangeRoom
        }
    }
}

/// Generates neighbours of a schedule.
#[derive(Debug, Clone)]
pub(crate) struct Neighborhood<'d> {
    data: &'d SchoolData,
    days: Vec<Weekday>,
    periods: Vec<PeriodId>,
    /// Positions of unlocked placements.
    movable: Vec<usize>,
}

impl<'d> Neighborhood<'d> {
    pub fn new(data: &'d SchoolData, days: Vec<Weekday>, schedule: &[ScheduledLesson]) -> Self {
        Self {
            data,
            days,
            periods: data.teaching_periods().iter().map(|p| p.id).collect(),
            movable: schedule
                .iter()
                .enumerate()
                .filter(|(_, s)| !s.locked)
                .map(|(i, _)| i)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.movable.is_empty()
    }

    /// Applies one random move to `schedule`. Returns the move kind, or
    /// `None` when the drawn move had nothing to change.
    pub fn apply<R: Rng>(&self, schedule: &mut [ScheduledLesson], rng: &mut R) -> Option<MoveKind> {
        let kind = match MoveKind::sample(rng) {
            MoveKind::Swap if self.movable.len() < 2 => MoveKind::Relocate,
            kind => kind,
        };
        let applied = match kind {
            MoveKind::Swap => self.swap(schedule, rng),
            MoveKind::Relocate => self.relocate(schedule, rng),
            MoveKind::ChangeRoom => self.change_room(schedule, rng),
        };
        applied.then_some(kind)
    }

    fn pick<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        self.movable.choose(rng).copied()
    }

    fn swap<R: Rng>(&self, schedule: &mut [ScheduledLesson], rng: &mut R) -> bool {
        let a = self.movable[rng.random_range(0..self.movable.len())];
        let b = self.movable[rng.random_range(0..self.movable.len())];
        if a == b || schedule[a].same_slot(&schedule[b]) {
            return false;
        }
        // Rooms travel only when each lesson may use the other's room.
        let rooms_fit = self.accepts(&schedule[a], schedule[b].room_id)
            && self.accepts(&schedule[b], schedule[a].room_id);

        let (day, period, room) = (schedule[a].day, schedule[a].period_id, schedule[a].room_id);
        schedule[a].day = schedule[b].day;
        schedule[a].period_id = schedule[b].period_id;
        schedule[b].day = day;
        schedule[b].period_id = period;
        if rooms_fit {
            schedule[a].room_id = schedule[b].room_id;
            schedule[b].room_id = room;
        }
        true
    }

    fn accepts(&self, s: &ScheduledLesson, room: Option<RoomId>) -> bool {
        match room {
            Some(id) => self.eligible_rooms(s).contains(&id),
            None => self
                .data
                .lesson(s.lesson_id)
                .is_some_and(|l| !l.requires_room_type()),
        }
    }

    fn relocate<R: Rng>(&self, schedule: &mut [ScheduledLesson], rng: &mut R) -> bool {
        let (Some(i), Some(&day), Some(&period)) =
            (self.pick(rng), self.days.choose(rng), self.periods.choose(rng))
        else {
            return false;
        };
        let s = &mut schedule[i];
        if s.day == day && s.period_id == period {
            return false;
        }
        s.day = day;
        s.period_id = period;
        true
    }

    fn change_room<R: Rng>(&self, schedule: &mut [ScheduledLesson], rng: &mut R) -> bool {
        let Some(i) = self.pick(rng) else {
            return false;
        };
        let current = schedule[i].room_id;
        let options: Vec<RoomId> = self
            .eligible_rooms(&schedule[i])
            .into_iter()
            .filter(|r| Some(*r) != current)
            .collect();
        match options.choose(rng) {
            Some(&room) => {
                schedule[i].room_id = Some(room);
                true
            }
            None => false,
        }
    }

    /// Rooms of the required type (or any room) that fit the head count.
    fn eligible_rooms(&self, s: &ScheduledLesson) -> Vec<RoomId> {
        let Some(lesson) = self.data.lesson(s.lesson_id) else {
            return Vec::new();
        };
        let students = self.data.students_for(lesson);
        let rooms = match lesson.required_room_type.as_deref() {
            Some(room_type) if lesson.requires_room_type() => self.data.rooms_of_type(room_type),
            _ => self.data.rooms().iter().collect(),
        };
        rooms
            .into_iter()
            .filter(|r| r.fits(students))
            .map(|r| r.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn schedule() -> Vec<ScheduledLesson> {
        let mut s = fixtures::busy_monday();
        s[0].locked = true;
        s
    }

    #[test]
    fn test_locked_never_moves() {
        let data = fixtures::school();
        let mut current = schedule();
        let hood = Neighborhood::new(&data, Weekday::SCHOOL_WEEK.to_vec(), &current);
        let locked = current[0].clone();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            hood.apply(&mut current, &mut rng);
        }
        assert_eq!(current[0], locked);
    }

    #[test]
    fn test_moves_stay_on_grid() {
        let data = fixtures::school();
        let mut current = schedule();
        let hood = Neighborhood::new(&data, vec![Weekday::Monday, Weekday::Tuesday], &current);
        let mut rng = StdRng::seed_from_u64(11);
        let mut kinds = Vec::new();
        for _ in 0..300 {
            kinds.extend(hood.apply(&mut current, &mut rng));
        }
        assert!(kinds.contains(&MoveKind::Swap));
        assert!(kinds.contains(&MoveKind::Relocate));
        assert!(kinds.contains(&MoveKind::ChangeRoom));
        for s in &current[1..] {
            assert!(matches!(s.day, Weekday::Monday | Weekday::Tuesday));
            assert_ne!(s.period_id, 4, "break period used");
        }
    }

    #[test]
    fn test_change_room_respects_type() {
        let data = fixtures::school();
        let hood = Neighborhood::new(&data, Weekday::SCHOOL_WEEK.to_vec(), &[]);
        let chem = ScheduledLesson::candidate(fixtures::CHEM_1A, fixtures::TT, Weekday::Monday, 1);
        assert_eq!(hood.eligible_rooms(&chem), vec![fixtures::LAB]);
        let math = ScheduledLesson::candidate(fixtures::MATH_1A, fixtures::TT, Weekday::Monday, 1);
        assert_eq!(hood.eligible_rooms(&math).len(), 3);
    }

    #[test]
    fn test_sample_split() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 10_000;
        let swaps = (0..n).filter(|_| MoveKind::sample(&mut rng) == MoveKind::Swap).count();
        let share = swaps as f64 / n as f64;
        assert!((share - 0.4).abs() < 0.03, "swap share {share}");
    }
}
