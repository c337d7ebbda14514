//! Scheduling input and output shared by all engines.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ordering::LessonOrdering;
use super::quality::QualityMetrics;
use crate::error::{TimetableError, TimetableResult};
use crate::models::{Lesson, LessonId, ScheduledLesson, SchoolData, TimetableId, Weekday};
use crate::validation::ensure_schedulable;

/// Input of one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingRequest {
    /// Timetable to generate.
    pub timetable_id: TimetableId,
    /// Week number stamped on new placements.
    pub week_number: u32,
    /// Placements from a previous run. Locked placements of this timetable
    /// are carried over unchanged; everything else is replaced.
    pub existing: Vec<ScheduledLesson>,
}

impl SchedulingRequest {
    /// A fresh generation for `timetable_id`.
    pub fn new(timetable_id: TimetableId) -> Self {
        Self {
            timetable_id,
            week_number: 1,
            existing: Vec::new(),
        }
    }

    pub fn with_week(mut self, week_number: u32) -> Self {
        self.week_number = week_number;
        self
    }

    /// Sets the placements of a previous run.
    pub fn with_existing(mut self, existing: Vec<ScheduledLesson>) -> Self {
        self.existing = existing;
        self
    }

    /// Locked placements of the requested timetable.
    pub fn locked(&self) -> Vec<ScheduledLesson> {
        self.existing
            .iter()
            .filter(|s| s.locked && s.timetable_id == self.timetable_id)
            .cloned()
            .collect()
    }
}

/// Instance counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStats {
    /// Instances the run had to place (locked ones excluded).
    pub instances_total: usize,
    pub instances_scheduled: usize,
    /// Placements carried over as locked.
    pub instances_locked: usize,
}

impl ScheduleStats {
    pub fn instances_unscheduled(&self) -> usize {
        self.instances_total.saturating_sub(self.instances_scheduled)
    }
}

/// Output of one generation run.
///
/// `error = true` means the run could not start (see `errors`); otherwise
/// `success` is true when at least one instance was placed or there was
/// nothing to place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulingResult {
    pub success: bool,
    pub error: bool,
    /// Locked carry-overs first, then new placements.
    pub assignments: Vec<ScheduledLesson>,
    /// Unplaced instances, one line each.
    pub warnings: Vec<String>,
    /// Fatal conditions.
    pub errors: Vec<String>,
    pub metrics: Option<QualityMetrics>,
    pub stats: ScheduleStats,
}

impl SchedulingResult {
    /// A run that could not start.
    pub fn failed(error: &TimetableError) -> Self {
        Self {
            success: false,
            error: true,
            errors: vec![error.to_string()],
            ..Self::default()
        }
    }

    /// New placements only (without locked carry-overs).
    pub fn new_assignments(&self) -> impl Iterator<Item = &ScheduledLesson> {
        self.assignments.iter().filter(|s| !s.locked)
    }

    /// Placements of one lesson.
    pub fn assignments_for(&self, lesson_id: LessonId) -> Vec<&ScheduledLesson> {
        self.assignments
            .iter()
            .filter(|s| s.lesson_id == lesson_id)
            .collect()
    }
}

/// One instance to place: a lesson and its 1-based instance number.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Instance<'d> {
    pub lesson: &'d Lesson,
    pub number: u32,
    pub of: u32,
}

/// Checked input of a run.
#[derive(Debug, Clone)]
pub(crate) struct RunPlan<'d> {
    pub days: Vec<Weekday>,
    pub locked: Vec<ScheduledLesson>,
    /// Instances in placement order.
    pub instances: Vec<Instance<'d>>,
}

/// Validates the input and expands lessons into ordered instances.
///
/// Instances per lesson = weekly frequency − locked placements of it.
pub(crate) fn plan_run<'d>(
    data: &'d SchoolData,
    request: &SchedulingRequest,
    school_days: Vec<Weekday>,
    ordering: &LessonOrdering,
) -> TimetableResult<RunPlan<'d>> {
    ensure_schedulable(data)?;
    if data.timetable(request.timetable_id).is_none() {
        return Err(TimetableError::TimetableNotFound(request.timetable_id));
    }

    let locked = request.locked();
    let mut locked_per_lesson: HashMap<LessonId, u32> = HashMap::new();
    for s in &locked {
        *locked_per_lesson.entry(s.lesson_id).or_default() += 1;
    }

    let mut instances = Vec::new();
    for lesson in ordering.sort(&data.active_lessons()) {
        let done = locked_per_lesson.get(&lesson.id).copied().unwrap_or(0);
        let remaining = lesson.weekly_frequency.saturating_sub(done);
        for k in 1..=remaining {
            instances.push(Instance {
                lesson,
                number: k,
                of: remaining,
            });
        }
    }

    Ok(RunPlan {
        days: school_days,
        locked,
        instances,
    })
}

/// Warning line for an instance that could not be placed.
pub(crate) fn unplaced_warning(data: &SchoolData, instance: &Instance<'_>) -> String {
    format!(
        "Could not schedule {} (instance {} of {}): no feasible slot",
        data.describe_lesson(instance.lesson),
        instance.number,
        instance.of
    )
}
