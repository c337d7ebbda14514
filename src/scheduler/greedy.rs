//! Greedy timetable schedulers.
//!
//! # Algorithm
//!
//! 1. Expand every active lesson into its remaining weekly instances and
//!    order them with a [`LessonOrdering`].
//! 2. For each instance, enumerate every (school day, teaching period).
//! 3. Per slot, try rooms in order (only rooms of the required type if the
//!    lesson has one; otherwise "no room" first, then every room). The first
//!    room passing the hard rules makes the slot feasible.
//! 4. Score every feasible slot: 1000 minus the priority penalty of each
//!    soft violation.
//! 5. Commit the strictly best slot (earliest wins ties). No feasible slot
//!    means the instance is reported as unscheduled; earlier placements are
//!    never revisited.
//!
//! # Complexity
//! O(i × d × p × r) hard checks, where i=instances, d=days, p=periods,
//! r=room candidates, plus one soft pass per feasible slot.

use tracing::{debug, error, info, warn};

use super::ordering::LessonOrdering;
use super::quality::QualityMetrics;
use super::request::{
    plan_run, unplaced_warning, Instance, ScheduleStats, SchedulingRequest, SchedulingResult,
};
use super::TimetableScheduler;
use crate::config::EngineConfig;
use crate::constraints::{
    ConstraintValidator, ValidationContext, ValidationResult, UNMAPPED_PENALTY,
};
use crate::models::{Lesson, Period, RoomId, ScheduledLesson, SchoolData, TimetableId, Weekday};

/// Score of a slot without soft violations.
pub const BASELINE_SCORE: i64 = 1000;

/// Slot score: baseline minus the penalty of every soft violation.
pub fn soft_score(result: &ValidationResult) -> i64 {
    let penalty: i64 = result
        .warnings
        .iter()
        .map(|v| v.priority.map_or(UNMAPPED_PENALTY, |p| p.penalty()))
        .sum();
    BASELINE_SCORE - penalty
}

/// Room candidates for a lesson, in trial order.
fn room_candidates(data: &SchoolData, lesson: &Lesson) -> Vec<Option<RoomId>> {
    match lesson.required_room_type.as_deref() {
        Some(room_type) if lesson.requires_room_type() => data
            .rooms_of_type(room_type)
            .into_iter()
            .map(|r| Some(r.id))
            .collect(),
        _ => std::iter::once(None)
            .chain(data.rooms().iter().map(|r| Some(r.id)))
            .collect(),
    }
}

/// Shared placement loop of both greedy variants.
struct Placer<'v, 'd> {
    validator: &'v ConstraintValidator<'d>,
    days: &'v [Weekday],
    periods: Vec<&'d Period>,
    timetable_id: TimetableId,
    week_number: u32,
    feasibility: ValidationContext,
    scoring: ValidationContext,
}

impl<'v, 'd> Placer<'v, 'd> {
    fn candidate(&self, lesson: &Lesson, day: Weekday, period: &Period, room: Option<RoomId>) -> ScheduledLesson {
        ScheduledLesson::candidate(lesson.id, self.timetable_id, day, period.id)
            .with_room_opt(room)
            .with_week(self.week_number)
    }

    /// Best slot for one instance, or `None` if nothing is feasible.
    fn best_slot(&self, lesson: &Lesson, placed: &[ScheduledLesson]) -> Option<(ScheduledLesson, i64)> {
        let rooms = room_candidates(self.validator.data(), lesson);
        let mut best: Option<(ScheduledLesson, i64)> = None;

        for &day in self.days {
            for period in &self.periods {
                let feasible = rooms.iter().find_map(|&room| {
                    let candidate = self.candidate(lesson, day, period, room);
                    self.validator
                        .validate_hard(&candidate, placed, &self.feasibility)
                        .is_valid()
                        .then_some(candidate)
                });
                let Some(candidate) = feasible else {
                    continue;
                };
                let score = soft_score(&self.validator.validate_soft(&candidate, placed, &self.scoring));
                if best.as_ref().map_or(true, |(_, s)| score > *s) {
                    best = Some((candidate, score));
                }
            }
        }
        best
    }

    /// Places all instances on top of `placed`. Returns the count placed
    /// and the warnings for the rest.
    fn place_all(&self, instances: &[Instance<'_>], placed: &mut Vec<ScheduledLesson>) -> (usize, Vec<String>) {
        let data = self.validator.data();
        let mut scheduled = 0;
        let mut warnings = Vec::new();

        for instance in instances {
            match self.best_slot(instance.lesson, placed) {
                Some((candidate, score)) => {
                    debug!(
                        event = "placed",
                        lesson_id = instance.lesson.id,
                        day = %candidate.day,
                        period_id = candidate.period_id,
                        room_id = ?candidate.room_id,
                        score,
                    );
                    placed.push(candidate);
                    scheduled += 1;
                }
                None => {
                    let message = unplaced_warning(data, instance);
                    warn!(event = "unplaced", lesson_id = instance.lesson.id, %message);
                    warnings.push(message);
                }
            }
        }
        (scheduled, warnings)
    }
}

fn run_greedy(
    engine: &'static str,
    data: &SchoolData,
    request: &SchedulingRequest,
    config: &EngineConfig,
    ordering: &LessonOrdering,
    with_metrics: bool,
) -> SchedulingResult {
    let plan = match plan_run(data, request, config.effective_school_days(), ordering) {
        Ok(plan) => plan,
        Err(e) => {
            error!(event = "run_aborted", engine, error = %e);
            return SchedulingResult::failed(&e);
        }
    };

    info!(
        event = "run_start",
        engine,
        timetable_id = request.timetable_id,
        instances = plan.instances.len(),
        locked = plan.locked.len(),
        days = plan.days.len(),
    );

    let validator = ConstraintValidator::from_config(data, config);
    let placer = Placer {
        validator: &validator,
        days: &plan.days,
        periods: data.teaching_periods(),
        timetable_id: request.timetable_id,
        week_number: request.week_number,
        feasibility: ValidationContext::feasibility(),
        scoring: ValidationContext::new(),
    };

    let mut placed = plan.locked.clone();
    let (scheduled, warnings) = placer.place_all(&plan.instances, &mut placed);

    let stats = ScheduleStats {
        instances_total: plan.instances.len(),
        instances_scheduled: scheduled,
        instances_locked: plan.locked.len(),
    };
    let metrics = with_metrics.then(|| QualityMetrics::calculate(data, &placed, &plan.days));

    info!(
        event = "run_end",
        engine,
        scheduled = stats.instances_scheduled,
        unscheduled = stats.instances_unscheduled(),
        score = metrics.as_ref().map(|m| m.score),
    );

    SchedulingResult {
        success: scheduled > 0 || plan.instances.is_empty(),
        error: false,
        assignments: placed,
        warnings,
        errors: Vec::new(),
        metrics,
        stats,
    }
}

/// Greedy single-pass scheduler.
///
/// Room-type lessons first, then by descending weekly frequency.
#[derive(Debug, Clone)]
pub struct GreedyScheduler {
    config: EngineConfig,
    ordering: LessonOrdering,
}

impl GreedyScheduler {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ordering: LessonOrdering::greedy(),
        }
    }

    /// Replaces the lesson order.
    pub fn with_ordering(mut self, ordering: LessonOrdering) -> Self {
        self.ordering = ordering;
        self
    }
}

impl Default for GreedyScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TimetableScheduler for GreedyScheduler {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn schedule(&self, data: &SchoolData, request: &SchedulingRequest) -> SchedulingResult {
        run_greedy(self.name(), data, request, &self.config, &self.ordering, false)
    }
}

/// Greedy scheduler with duration tie-breaking and quality metrics.
///
/// # Example
///
/// ```
/// use u_timetable::models::{Lesson, Period, SchoolClass, SchoolData, Teacher, Timetable};
/// use u_timetable::scheduler::{PriorityScheduler, SchedulingRequest, TimetableScheduler};
///
/// let data = SchoolData::new()
///     .with_timetable(Timetable::new(1, "Main"))
///     .with_teacher(Teacher::new(1, "J.", "Smith"))
///     .with_class(SchoolClass::new(10, "1A"))
///     .with_period(Period::new(1, 1))
///     .with_period(Period::new(2, 2))
///     .with_lesson(Lesson::new(100).with_teacher(1).with_class(10).with_frequency(3));
///
/// let result = PriorityScheduler::new().schedule(&data, &SchedulingRequest::new(1));
/// assert!(result.success);
/// assert_eq!(result.stats.instances_scheduled, 3);
/// assert!(result.metrics.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct PriorityScheduler {
    config: EngineConfig,
    ordering: LessonOrdering,
}

impl PriorityScheduler {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ordering: LessonOrdering::priority(),
        }
    }

    /// Replaces the lesson order.
    pub fn with_ordering(mut self, ordering: LessonOrdering) -> Self {
        self.ordering = ordering;
        self
    }
}

impl Default for PriorityScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TimetableScheduler for PriorityScheduler {
    fn name(&self) -> &'static str {
        "priority"
    }

    fn schedule(&self, data: &SchoolData, request: &SchedulingRequest) -> SchedulingResult {
        run_greedy(self.name(), data, request, &self.config, &self.ordering, true)
    }
}
