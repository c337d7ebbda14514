//! Energy of a complete timetable.
//!
//! Lower is better. Hard conflicts dominate with a fixed weight of 10 000,
//! so the search is pushed towards feasibility without rejecting infeasible
//! neighbours outright.
//!
//! # Terms
//!
//! | Term | Unit | Weight |
//! |------|------|--------|
//! | Hard conflicts | teacher/class/room clash per pair, blocked (-3) slot per entity kind, periods over teacher run and daily limits and class daily limits | 10 000 |
//! | Teacher gaps | NTP | `teacher_gaps` |
//! | Student gaps | class NTP | `student_gaps` |
//! | Day unevenness | Σ variance of lessons per day, per class | `day_unevenness` |
//! | Non-preferred slots | placement on a -1/-2 teacher or class slot | `non_preferred_slots` |
//! | Room changes | class switches room between successive lessons | `room_changes` |
//! | Workload imbalance | Σ variance of lessons per day, per teacher | `workload_imbalance` |
//! | Consecutive same subject | periods over a class's run limit | 100 |
//! | Availability | Σ +1/+2 preferences met (subtracted) | `availability` |

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::config::{EnergyWeights, CONSECUTIVE_SUBJECT_WEIGHT, HARD_CONFLICT_WEIGHT};
use crate::constraints::{ExemptEntities, ExemptionPolicy};
use crate::models::{
    gap_numbers, longest_consecutive_run, AvailabilityTable, ClassId, Lesson, PeriodId, RoomId,
    ScheduledLesson, SchoolClass, SchoolData, Teacher, TeacherId, Weekday,
};

/// Energy terms of one timetable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyBreakdown {
    pub hard_conflicts: u32,
    pub teacher_gaps: u32,
    pub student_gaps: u32,
    pub day_unevenness: f64,
    pub non_preferred_slots: u32,
    pub room_changes: u32,
    pub workload_imbalance: f64,
    pub consecutive_same_subject: u32,
    pub availability_score: i64,
    /// Weighted sum of all terms except availability.
    pub penalty: f64,
    /// `penalty` minus the weighted availability score.
    pub energy: f64,
}

impl EnergyBreakdown {
    fn weighted(mut self, w: &EnergyWeights) -> Self {
        self.penalty = HARD_CONFLICT_WEIGHT * f64::from(self.hard_conflicts)
            + w.teacher_gaps * f64::from(self.teacher_gaps)
            + w.student_gaps * f64::from(self.student_gaps)
            + w.day_unevenness * self.day_unevenness
            + w.non_preferred_slots * f64::from(self.non_preferred_slots)
            + w.room_changes * f64::from(self.room_changes)
            + w.workload_imbalance * self.workload_imbalance
            + CONSECUTIVE_SUBJECT_WEIGHT * f64::from(self.consecutive_same_subject);
        self.energy = self.penalty - w.availability * self.availability_score as f64;
        self
    }

    /// Whether no hard rule is broken. Same-subject overruns (HC-9) are
    /// weighted separately but still make a timetable infeasible.
    pub fn is_feasible(&self) -> bool {
        self.hard_conflicts == 0 && self.consecutive_same_subject == 0
    }
}

/// Hard-rule tests shared by the energy function and the initial solution.
/// Sentinel entities follow the same per-code exemptions as the validator.
#[derive(Debug, Clone)]
pub(crate) struct HardRules<'d> {
    data: &'d SchoolData,
    /// HC-1..HC-3
    clash: [ExemptEntities; 3],
    /// HC-4..HC-6
    blocked: [ExemptEntities; 3],
    teacher_run: ExemptEntities,
    subject_run: ExemptEntities,
    teacher_daily: ExemptEntities,
    class_daily: ExemptEntities,
}

impl<'d> HardRules<'d> {
    pub fn new(data: &'d SchoolData, policy: &ExemptionPolicy) -> Self {
        Self {
            data,
            clash: ["HC-1", "HC-2", "HC-3"].map(|code| policy.exempt_for(code)),
            blocked: ["HC-4", "HC-5", "HC-6"].map(|code| policy.exempt_for(code)),
            teacher_run: policy.exempt_for("HC-8"),
            subject_run: policy.exempt_for("HC-9"),
            teacher_daily: policy.exempt_for("HC-11"),
            class_daily: policy.exempt_for("HC-12"),
        }
    }

    fn teacher(&self, id: TeacherId, exempt: &ExemptEntities) -> Option<&'d Teacher> {
        self.data
            .teacher(id)
            .filter(|t| !exempt.teacher(&t.first_name, &t.full_name()))
    }

    fn class(&self, id: ClassId, exempt: &ExemptEntities) -> Option<&'d SchoolClass> {
        self.data.class(id).filter(|c| !exempt.class(&c.name))
    }

    fn counts_room(&self, id: RoomId, exempt: &ExemptEntities) -> bool {
        self.data.room(id).is_some_and(|r| !exempt.room(&r.number))
    }

    /// Clashing entity kinds (0..=3) of two placements in the same slot.
    pub fn clashes(&self, a: (&ScheduledLesson, &Lesson), b: (&ScheduledLesson, &Lesson)) -> u32 {
        let [teachers, classes, rooms] = &self.clash;
        let teacher = a.1
            .teacher_ids
            .iter()
            .any(|t| b.1.has_teacher(*t) && self.teacher(*t, teachers).is_some());
        let class = a.1
            .class_ids
            .iter()
            .any(|c| b.1.has_class(*c) && self.class(*c, classes).is_some());
        let room = a.0
            .rooms()
            .into_iter()
            .any(|r| b.0.uses_room(r) && self.counts_room(r, rooms));
        u32::from(teacher) + u32::from(class) + u32::from(room)
    }

    /// Entity kinds (teacher, class, room, subject) blocked at the slot.
    pub fn blocked(&self, s: &ScheduledLesson, lesson: &Lesson) -> u32 {
        let [teachers, classes, rooms] = &self.blocked;
        let a = &self.data.availability;
        let at = |table: &AvailabilityTable, id: u32| table.is_blocked(id, s.day, s.period_id);
        let teacher = lesson
            .teacher_ids
            .iter()
            .any(|t| at(&a.teachers, *t) && self.teacher(*t, teachers).is_some());
        let class = lesson
            .class_ids
            .iter()
            .any(|c| at(&a.classes, *c) && self.class(*c, classes).is_some());
        let room = s
            .rooms()
            .into_iter()
            .any(|r| at(&a.rooms, r) && self.counts_room(r, rooms));
        let subject = lesson.subject_ids.iter().any(|x| at(&a.subjects, *x));
        u32::from(teacher) + u32::from(class) + u32::from(room) + u32::from(subject)
    }

    /// Whether a room is blocked at the slot for HC-6.
    pub fn room_blocked(&self, id: RoomId, day: Weekday, period: PeriodId) -> bool {
        self.data.availability.rooms.is_blocked(id, day, period) && self.counts_room(id, &self.blocked[2])
    }

    /// Periods over a teacher's consecutive run limit (HC-8) plus periods
    /// over the daily maximum (HC-11), for the period numbers of one day.
    pub fn teacher_overrun(&self, id: TeacherId, numbers: &[u32]) -> u32 {
        let run = self
            .teacher(id, &self.teacher_run)
            .and_then(|t| t.max_consecutive_periods)
            .map_or(0, |max| longest_consecutive_run(numbers).saturating_sub(max));
        let daily = self
            .teacher(id, &self.teacher_daily)
            .and_then(|t| t.max_periods_per_day)
            .map_or(0, |max| (numbers.len() as u32).saturating_sub(max));
        run + daily
    }

    /// Periods over a class's daily maximum (HC-12).
    pub fn class_overrun(&self, id: ClassId, numbers: &[u32]) -> u32 {
        self.class(id, &self.class_daily)
            .and_then(|c| c.max_periods_per_day)
            .map_or(0, |max| (numbers.len() as u32).saturating_sub(max))
    }

    /// Periods beyond the class's same-subject run limit (HC-9) on one
    /// day, given `(lesson, period number)` pairs of the class.
    pub fn subject_overrun(&self, id: ClassId, day: &[(&Lesson, u32)]) -> u32 {
        let Some(max) = self
            .class(id, &self.subject_run)
            .and_then(|c| c.max_consecutive_same_subject)
        else {
            return 0;
        };
        let mut subjects: Vec<_> = day
            .iter()
            .flat_map(|(l, _)| l.subject_ids.iter().copied())
            .collect();
        subjects.sort_unstable();
        subjects.dedup();
        subjects
            .into_iter()
            .map(|subject| {
                let numbers: Vec<u32> = day
                    .iter()
                    .filter(|(l, _)| l.has_subject(subject))
                    .map(|&(_, n)| n)
                    .collect();
                longest_consecutive_run(&numbers).saturating_sub(max)
            })
            .sum()
    }
}

fn variance(counts: &[u32]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    let n = counts.len() as f64;
    let mean = counts.iter().map(|&c| f64::from(c)).sum::<f64>() / n;
    counts
        .iter()
        .map(|&c| (f64::from(c) - mean).powi(2))
        .sum::<f64>()
        / n
}

/// Evaluates timetables of one school snapshot.
#[derive(Debug, Clone)]
pub struct EnergyModel<'d> {
    data: &'d SchoolData,
    hard: HardRules<'d>,
    days: Vec<Weekday>,
    teaching: Vec<u32>,
    numbers: HashMap<PeriodId, u32>,
    weights: EnergyWeights,
}

struct Placed<'a> {
    s: &'a ScheduledLesson,
    lesson: &'a Lesson,
    number: u32,
}

impl<'d> EnergyModel<'d> {
    pub fn new(
        data: &'d SchoolData,
        policy: &ExemptionPolicy,
        days: Vec<Weekday>,
        weights: EnergyWeights,
    ) -> Self {
        Self {
            data,
            hard: HardRules::new(data, policy),
            days,
            teaching: data.teaching_period_numbers(),
            numbers: data.periods().iter().map(|p| (p.id, p.number)).collect(),
            weights,
        }
    }

    pub fn weights(&self) -> &EnergyWeights {
        &self.weights
    }

    /// Computes every term for `schedule`. Placements of unknown lessons or
    /// periods are ignored.
    pub fn evaluate(&self, schedule: &[ScheduledLesson]) -> EnergyBreakdown {
        let placed: Vec<Placed<'_>> = schedule
            .iter()
            .filter_map(|s| {
                let lesson = self.data.lesson(s.lesson_id)?;
                let number = *self.numbers.get(&s.period_id)?;
                Some(Placed { s, lesson, number })
            })
            .collect();

        let mut slots: HashMap<(Weekday, PeriodId), Vec<usize>> = HashMap::new();
        let mut teacher_days: HashMap<(TeacherId, Weekday), Vec<u32>> = HashMap::new();
        let mut class_days: HashMap<(ClassId, Weekday), Vec<usize>> = HashMap::new();
        let mut breakdown = EnergyBreakdown::default();

        for (i, p) in placed.iter().enumerate() {
            slots.entry((p.s.day, p.s.period_id)).or_default().push(i);
            for &t in &p.lesson.teacher_ids {
                teacher_days.entry((t, p.s.day)).or_default().push(p.number);
            }
            for &c in &p.lesson.class_ids {
                class_days.entry((c, p.s.day)).or_default().push(i);
            }
            breakdown.hard_conflicts += self.hard.blocked(p.s, p.lesson);
            self.score_availability(p, &mut breakdown);
        }

        for members in slots.values() {
            for (k, &i) in members.iter().enumerate() {
                for &j in &members[k + 1..] {
                    breakdown.hard_conflicts += self
                        .hard
                        .clashes((placed[i].s, placed[i].lesson), (placed[j].s, placed[j].lesson));
                }
            }
        }

        for (&(teacher_id, _), numbers) in &teacher_days {
            breakdown.teacher_gaps += gap_numbers(numbers, &self.teaching).len() as u32;
            breakdown.hard_conflicts += self.hard.teacher_overrun(teacher_id, numbers);
        }

        for (&(class_id, _), members) in &class_days {
            let mut day: Vec<&Placed<'_>> = members.iter().map(|&i| &placed[i]).collect();
            day.sort_by_key(|p| p.number);
            let numbers: Vec<u32> = day.iter().map(|p| p.number).collect();
            breakdown.student_gaps += gap_numbers(&numbers, &self.teaching).len() as u32;
            breakdown.room_changes += day
                .windows(2)
                .filter(|w| matches!((w[0].s.room_id, w[1].s.room_id), (Some(a), Some(b)) if a != b))
                .count() as u32;
            breakdown.hard_conflicts += self.hard.class_overrun(class_id, &numbers);
            let lessons: Vec<(&Lesson, u32)> = day.iter().map(|p| (p.lesson, p.number)).collect();
            breakdown.consecutive_same_subject += self.hard.subject_overrun(class_id, &lessons);
        }

        breakdown.day_unevenness = self.unevenness(
            self.data.classes().iter().map(|c| c.id),
            |id, day| class_days.get(&(id, day)).map_or(0, Vec::len),
        );
        breakdown.workload_imbalance = self.unevenness(
            self.data.teachers().iter().map(|t| t.id),
            |id, day| teacher_days.get(&(id, day)).map_or(0, Vec::len),
        );

        breakdown.weighted(&self.weights)
    }

    fn score_availability(&self, p: &Placed<'_>, breakdown: &mut EnergyBreakdown) {
        let a = &self.data.availability;
        let (day, period) = (p.s.day, p.s.period_id);
        let importances = p
            .lesson
            .teacher_ids
            .iter()
            .map(|t| a.teachers.importance(*t, day, period))
            .chain(
                p.lesson
                    .class_ids
                    .iter()
                    .map(|c| a.classes.importance(*c, day, period)),
            );

        let mut disliked = false;
        for importance in importances {
            if importance.is_dislike() {
                disliked = true;
            } else if importance.is_preference() {
                breakdown.availability_score += i64::from(importance.value());
            }
        }
        breakdown.non_preferred_slots += u32::from(disliked);
    }

    fn unevenness(&self, ids: impl Iterator<Item = u32>, count: impl Fn(u32, Weekday) -> usize) -> f64 {
        ids.map(|id| {
            let per_day: Vec<u32> = self.days.iter().map(|&d| count(id, d) as u32).collect();
            if per_day.iter().all(|&c| c == 0) {
                0.0
            } else {
                variance(&per_day)
            }
        })
        .sum()
    }
}
