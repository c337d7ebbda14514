//! Timetable quality metrics.
//!
//! Counts non-teaching periods (NTPs): empty teaching periods strictly
//! between an entity's first and last lesson of a day. Computed once after
//! a run from the final placements.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Teacher NTPs | Sum over teachers and days |
//! | Class NTPs | Sum over classes and days |
//! | Max NTPs | (teachers + classes) × days × max(periods − 2, 0) |
//! | Score | 100 − total × 100 / max, clamped to 0..=100 |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{
    gap_numbers, ClassId, Lesson, ScheduledLesson, SchoolData, TeacherId, Weekday,
};

/// Gap counts and overall score of a timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// NTPs per teacher.
    pub teacher_gaps: BTreeMap<TeacherId, u32>,
    /// NTPs per class.
    pub class_gaps: BTreeMap<ClassId, u32>,
    pub total_teacher_gaps: u32,
    pub total_class_gaps: u32,
    /// Upper estimate of possible NTPs.
    pub max_possible_gaps: u32,
    /// 0..=100, higher is better.
    pub score: f64,
}

/// NTPs of the entity selected by `has` over `days`.
fn entity_gaps(
    data: &SchoolData,
    placements: &[(&ScheduledLesson, &Lesson)],
    days: &[Weekday],
    teaching: &[u32],
    has: impl Fn(&Lesson) -> bool,
) -> u32 {
    days.iter()
        .map(|&day| {
            let numbers: Vec<u32> = placements
                .iter()
                .filter(|(s, l)| s.day == day && has(*l))
                .filter_map(|(s, _)| data.period_number(s.period_id))
                .collect();
            gap_numbers(&numbers, teaching).len() as u32
        })
        .sum()
}

impl QualityMetrics {
    /// Computes metrics for `schedule` over `days`.
    pub fn calculate(data: &SchoolData, schedule: &[ScheduledLesson], days: &[Weekday]) -> Self {
        let teaching = data.teaching_period_numbers();
        let placements: Vec<(&ScheduledLesson, &Lesson)> = schedule
            .iter()
            .filter_map(|s| data.lesson(s.lesson_id).map(|l| (s, l)))
            .collect();

        let teacher_gaps: BTreeMap<TeacherId, u32> = data
            .teachers()
            .iter()
            .map(|t| {
                let gaps = entity_gaps(data, &placements, days, &teaching, |l| l.has_teacher(t.id));
                (t.id, gaps)
            })
            .collect();
        let class_gaps: BTreeMap<ClassId, u32> = data
            .classes()
            .iter()
            .map(|c| {
                let gaps = entity_gaps(data, &placements, days, &teaching, |l| l.has_class(c.id));
                (c.id, gaps)
            })
            .collect();

        let total_teacher_gaps: u32 = teacher_gaps.values().sum();
        let total_class_gaps: u32 = class_gaps.values().sum();
        let entities = (teacher_gaps.len() + class_gaps.len()) as u32;
        let per_day = (teaching.len() as u32).saturating_sub(2);
        let max_possible_gaps = entities * days.len() as u32 * per_day;

        let score = if max_possible_gaps == 0 {
            100.0
        } else {
            let total = f64::from(total_teacher_gaps + total_class_gaps);
            (100.0 - total * 100.0 / f64::from(max_possible_gaps)).clamp(0.0, 100.0)
        };

        Self {
            teacher_gaps,
            class_gaps,
            total_teacher_gaps,
            total_class_gaps,
            max_possible_gaps,
            score,
        }
    }

    /// Teacher plus class NTPs.
    pub fn total_gaps(&self) -> u32 {
        self.total_teacher_gaps + self.total_class_gaps
    }

    /// Checks whether the score reaches `min_score`.
    pub fn meets_threshold(&self, min_score: f64) -> bool {
        self.score >= min_score
    }
}
