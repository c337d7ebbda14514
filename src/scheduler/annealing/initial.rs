//! Starting solution for the annealing search.
//!
//! A cheaper greedy than [`GreedyScheduler`](crate::scheduler::GreedyScheduler):
//! no soft scoring and no full rule evaluation. Each instance takes the
//! first (day, period) where its teachers and classes are free, not blocked
//! and within their daily and run limits, and the first free room that is
//! large enough. A first pass also
//! refuses slots that would leave a class with an empty period inside its
//! day; instances that fail it are retried without that check.

use std::collections::HashMap;

use tracing::debug;

use super::energy::HardRules;
use crate::models::{
    gap_numbers, Lesson, Period, RoomId, ScheduledLesson, SchoolData, TimetableId, Weekday,
};
use crate::scheduler::request::Instance;

/// Result of the construction pass.
#[derive(Debug, Clone)]
pub(crate) struct InitialSolution {
    /// Locked placements first, then new ones.
    pub schedule: Vec<ScheduledLesson>,
    pub scheduled: usize,
    /// Instances that found no slot.
    pub unplaced: Vec<usize>,
}

pub(crate) struct InitialBuilder<'a, 'd> {
    pub data: &'d SchoolData,
    pub hard: &'a HardRules<'d>,
    pub days: &'a [Weekday],
    pub periods: Vec<&'d Period>,
    pub timetable_id: TimetableId,
    pub week_number: u32,
}

impl<'a, 'd> InitialBuilder<'a, 'd> {
    pub fn build(&self, locked: Vec<ScheduledLesson>, instances: &[Instance<'d>]) -> InitialSolution {
        let numbers: HashMap<_, _> = self.data.periods().iter().map(|p| (p.id, p.number)).collect();
        let teaching = self.data.teaching_period_numbers();
        let mut schedule = locked;
        let mut scheduled = 0;
        let mut unplaced = Vec::new();

        for (index, instance) in instances.iter().enumerate() {
            let placement = self
                .first_fit(instance.lesson, &schedule, &numbers, &teaching, true)
                .or_else(|| self.first_fit(instance.lesson, &schedule, &numbers, &teaching, false));
            match placement {
                Some(p) => {
                    schedule.push(p);
                    scheduled += 1;
                }
                None => unplaced.push(index),
            }
        }

        debug!(event = "initial_solution", scheduled, unplaced = unplaced.len());
        InitialSolution {
            schedule,
            scheduled,
            unplaced,
        }
    }

    fn first_fit(
        &self,
        lesson: &Lesson,
        schedule: &[ScheduledLesson],
        numbers: &HashMap<u32, u32>,
        teaching: &[u32],
        avoid_gaps: bool,
    ) -> Option<ScheduledLesson> {
        for &day in self.days {
            for period in &self.periods {
                let slot = ScheduledLesson::candidate(lesson.id, self.timetable_id, day, period.id)
                    .with_week(self.week_number);
                if self.hard.blocked(&slot, lesson) > 0 {
                    continue;
                }
                let busy: Vec<(&ScheduledLesson, &Lesson)> = schedule
                    .iter()
                    .filter(|s| s.same_slot(&slot))
                    .filter_map(|s| self.data.lesson(s.lesson_id).map(|l| (s, l)))
                    .collect();
                if busy.iter().any(|&other| self.hard.clashes((&slot, lesson), other) > 0) {
                    continue;
                }
                if self.exceeds_limits(lesson, &slot, schedule, numbers) {
                    continue;
                }
                if avoid_gaps && self.leaves_gap(lesson, &slot, schedule, numbers, teaching) {
                    continue;
                }
                if let Some(room) = self.pick_room(lesson, &slot, &busy) {
                    return Some(slot.with_room_opt(room));
                }
            }
        }
        None
    }

    /// Whether placing `slot` breaks a teacher run or daily limit, a class
    /// daily limit or a same-subject run limit.
    fn exceeds_limits(
        &self,
        lesson: &Lesson,
        slot: &ScheduledLesson,
        schedule: &[ScheduledLesson],
        numbers: &HashMap<u32, u32>,
    ) -> bool {
        let Some(&own) = numbers.get(&slot.period_id) else {
            return false;
        };
        let day: Vec<(&Lesson, u32)> = schedule
            .iter()
            .filter(|s| s.day == slot.day)
            .filter_map(|s| Some((self.data.lesson(s.lesson_id)?, *numbers.get(&s.period_id)?)))
            .collect();

        let teacher = lesson.teacher_ids.iter().any(|&teacher_id| {
            let mut taught: Vec<u32> = day
                .iter()
                .filter(|(l, _)| l.has_teacher(teacher_id))
                .map(|&(_, n)| n)
                .collect();
            taught.push(own);
            self.hard.teacher_overrun(teacher_id, &taught) > 0
        });
        let class = lesson.class_ids.iter().any(|&class_id| {
            let mut attended: Vec<(&Lesson, u32)> = day
                .iter()
                .filter(|(l, _)| l.has_class(class_id))
                .copied()
                .collect();
            attended.push((lesson, own));
            let taken: Vec<u32> = attended.iter().map(|&(_, n)| n).collect();
            self.hard.class_overrun(class_id, &taken) > 0
                || self.hard.subject_overrun(class_id, &attended) > 0
        });
        teacher || class
    }

    fn leaves_gap(
        &self,
        lesson: &Lesson,
        slot: &ScheduledLesson,
        schedule: &[ScheduledLesson],
        numbers: &HashMap<u32, u32>,
        teaching: &[u32],
    ) -> bool {
        let Some(&own) = numbers.get(&slot.period_id) else {
            return false;
        };
        lesson.class_ids.iter().any(|&class_id| {
            let mut occupied: Vec<u32> = schedule
                .iter()
                .filter(|s| s.day == slot.day)
                .filter(|s| self.data.lesson(s.lesson_id).is_some_and(|l| l.has_class(class_id)))
                .filter_map(|s| numbers.get(&s.period_id).copied())
                .collect();
            occupied.push(own);
            !gap_numbers(&occupied, teaching).is_empty()
        })
    }

    /// `Some(room)` to place, `None` when the slot has no usable room.
    fn pick_room(
        &self,
        lesson: &Lesson,
        slot: &ScheduledLesson,
        busy: &[(&ScheduledLesson, &Lesson)],
    ) -> Option<Option<RoomId>> {
        let students = self.data.students_for(lesson);
        let typed = lesson.requires_room_type();
        let candidates = match lesson.required_room_type.as_deref() {
            Some(room_type) if typed => self.data.rooms_of_type(room_type),
            _ => self.data.rooms().iter().collect(),
        };
        let free = candidates.into_iter().find(|room| {
            room.fits(students)
                && !self.hard.room_blocked(room.id, slot.day, slot.period_id)
                && !busy.iter().any(|(s, _)| s.uses_room(room.id))
        });
        match free {
            Some(room) => Some(Some(room.id)),
            None if !typed => Some(None),
            None => None,
        }
    }
}
