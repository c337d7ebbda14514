//! Annealing scheduler.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::config::{AnnealingConfig, AnnealingPreset};
use super::energy::{EnergyBreakdown, EnergyModel, HardRules};
use super::initial::InitialBuilder;
use super::moves::Neighborhood;
use crate::config::EngineConfig;
use crate::error::{TimetableError, TimetableResult};
use crate::models::{ScheduledLesson, SchoolData};
use crate::scheduler::ordering::LessonOrdering;
use crate::scheduler::quality::QualityMetrics;
use crate::scheduler::request::{
    plan_run, unplaced_warning, ScheduleStats, SchedulingRequest, SchedulingResult,
};
use crate::scheduler::TimetableScheduler;

const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Why the search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Temperature fell below the floor.
    TemperatureFloor,
    /// Too many iterations without a new best.
    NoImprovement,
    /// The best solution has zero penalty. Checked on the penalty, not the
    /// energy: preference bonuses can push the energy below zero while
    /// conflicts remain.
    ZeroPenalty,
    /// Every placement is locked or nothing was placed.
    NothingToMove,
}

/// Search statistics of one annealing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnealingReport {
    pub initial: EnergyBreakdown,
    pub best: EnergyBreakdown,
    /// Best energy after each temperature pass; never increases.
    pub best_energy_history: Vec<f64>,
    pub iterations: usize,
    pub accepted_moves: usize,
    pub final_temperature: f64,
    pub stop_reason: StopReason,
    /// Seed the run used; `None` for an OS-seeded run.
    pub seed: Option<u64>,
}

/// Result plus search statistics. `report` is `None` when the run could
/// not start.
#[derive(Debug, Clone)]
pub struct AnnealingOutcome {
    pub result: SchedulingResult,
    pub report: Option<AnnealingReport>,
}

/// Simulated annealing over complete timetables.
///
/// # Algorithm
///
/// 1. Build a starting timetable with a first-fit greedy pass.
/// 2. Repeat at each temperature T for `iterations_per_temperature` steps:
///    apply a random move, accept it if the energy drops, otherwise with
///    probability exp(-Δ/T). Track the best timetable seen.
/// 3. Multiply T by `cooling_rate` after each pass.
/// 4. Stop below `min_temperature`, after `max_iterations_without_improvement`
///    steps without a new best, or once the best penalty is zero.
///
/// # Example
///
/// ```
/// use u_timetable::models::{Lesson, Period, SchoolClass, SchoolData, Teacher, Timetable};
/// use u_timetable::scheduler::annealing::{AnnealingConfig, AnnealingPreset, AnnealingScheduler};
/// use u_timetable::scheduler::SchedulingRequest;
///
/// let data = SchoolData::new()
///     .with_timetable(Timetable::new(1, "Main"))
///     .with_teacher(Teacher::new(1, "J.", "Smith"))
///     .with_class(SchoolClass::new(10, "1A"))
///     .with_period(Period::new(1, 1))
///     .with_period(Period::new(2, 2))
///     .with_lesson(Lesson::new(100).with_teacher(1).with_class(10).with_frequency(3));
///
/// let scheduler = AnnealingScheduler::new()
///     .with_annealing(AnnealingPreset::Fast.config().with_seed(42));
/// let outcome = scheduler.run(&data, &SchedulingRequest::new(1));
/// assert!(outcome.result.success);
/// assert!(outcome.report.unwrap().best.is_feasible());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnnealingScheduler {
    config: EngineConfig,
    annealing: Option<AnnealingConfig>,
}

impl AnnealingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the annealing section of `config` unless overridden.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            annealing: None,
        }
    }

    /// Overrides the annealing parameters.
    pub fn with_annealing(mut self, annealing: AnnealingConfig) -> Self {
        self.annealing = Some(annealing);
        self
    }

    pub fn with_preset(self, preset: AnnealingPreset) -> Self {
        self.with_annealing(preset.config())
    }

    /// Effective annealing parameters.
    pub fn annealing(&self) -> AnnealingConfig {
        self.annealing
            .clone()
            .unwrap_or_else(|| self.config.annealing.resolve())
    }

    /// Runs the search and returns the result with its statistics.
    pub fn run(&self, data: &SchoolData, request: &SchedulingRequest) -> AnnealingOutcome {
        match self.try_run(data, request) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(event = "run_aborted", engine = self.name(), error = %e);
                AnnealingOutcome {
                    result: SchedulingResult::failed(&e),
                    report: None,
                }
            }
        }
    }

    fn try_run(&self, data: &SchoolData, request: &SchedulingRequest) -> TimetableResult<AnnealingOutcome> {
        let params = self.annealing();
        params.validate().map_err(TimetableError::from)?;
        let plan = plan_run(
            data,
            request,
            self.config.effective_school_days(),
            &LessonOrdering::annealing_seed(),
        )?;

        info!(
            event = "run_start",
            engine = self.name(),
            timetable_id = request.timetable_id,
            instances = plan.instances.len(),
            locked = plan.locked.len(),
            initial_temperature = params.initial_temperature,
            cooling_rate = params.cooling_rate,
            seed = ?params.seed,
        );

        let hard = HardRules::new(data, &self.config.exemptions);
        let initial = InitialBuilder {
            data,
            hard: &hard,
            days: &plan.days,
            periods: data.teaching_periods(),
            timetable_id: request.timetable_id,
            week_number: request.week_number,
        }
        .build(plan.locked.clone(), &plan.instances);

        let mut warnings: Vec<String> = initial
            .unplaced
            .iter()
            .map(|&i| {
                let message = unplaced_warning(data, &plan.instances[i]);
                warn!(event = "unplaced", lesson_id = plan.instances[i].lesson.id, %message);
                message
            })
            .collect();

        let model = EnergyModel::new(data, &self.config.exemptions, plan.days.clone(), params.weights);
        let hood = Neighborhood::new(data, plan.days.clone(), &initial.schedule);
        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let search = anneal(&model, &hood, initial.schedule, &params, &mut rng);

        if !search.report.best.is_feasible() {
            let message = format!(
                "{} hard conflicts remain in the best timetable",
                search.report.best.hard_conflicts
            );
            warn!(event = "infeasible_result", conflicts = search.report.best.hard_conflicts);
            warnings.push(message);
        }

        let stats = ScheduleStats {
            instances_total: plan.instances.len(),
            instances_scheduled: initial.scheduled,
            instances_locked: plan.locked.len(),
        };
        let metrics = QualityMetrics::calculate(data, &search.best, &plan.days);
        let report = AnnealingReport {
            seed: params.seed,
            ..search.report
        };

        info!(
            event = "run_end",
            engine = self.name(),
            scheduled = stats.instances_scheduled,
            unscheduled = stats.instances_unscheduled(),
            iterations = report.iterations,
            initial_energy = report.initial.energy,
            best_energy = report.best.energy,
            stop_reason = ?report.stop_reason,
        );

        Ok(AnnealingOutcome {
            result: SchedulingResult {
                success: stats.instances_scheduled > 0 || plan.instances.is_empty(),
                error: false,
                assignments: search.best,
                warnings,
                errors: Vec::new(),
                metrics: Some(metrics),
                stats,
            },
            report: Some(report),
        })
    }
}

impl TimetableScheduler for AnnealingScheduler {
    fn name(&self) -> &'static str {
        "annealing"
    }

    fn schedule(&self, data: &SchoolData, request: &SchedulingRequest) -> SchedulingResult {
        self.run(data, request).result
    }
}

struct Search {
    best: Vec<ScheduledLesson>,
    report: AnnealingReport,
}

/// Metropolis search from `start`. The rng is owned by the caller's run.
fn anneal<R: Rng>(
    model: &EnergyModel<'_>,
    hood: &Neighborhood<'_>,
    start: Vec<ScheduledLesson>,
    params: &AnnealingConfig,
    rng: &mut R,
) -> Search {
    let initial = model.evaluate(&start);
    let mut current = start;
    let mut current_energy = initial.clone();
    let mut best = current.clone();
    let mut best_energy = initial.clone();
    let mut history = vec![best_energy.energy];

    let mut temperature = params.initial_temperature;
    let mut iterations = 0;
    let mut accepted_moves = 0;
    let mut since_improvement = 0;

    let stop_reason = 'search: loop {
        if hood.is_empty() {
            break 'search StopReason::NothingToMove;
        }
        if best_energy.penalty <= 0.0 {
            break 'search StopReason::ZeroPenalty;
        }
        if temperature < params.min_temperature {
            break 'search StopReason::TemperatureFloor;
        }

        for _ in 0..params.iterations_per_temperature {
            iterations += 1;
            let mut neighbor = current.clone();
            if hood.apply(&mut neighbor, rng).is_some() {
                let energy = model.evaluate(&neighbor);
                let delta = energy.energy - current_energy.energy;
                if delta <= 0.0 || rng.random::<f64>() < (-delta / temperature).exp() {
                    current = neighbor;
                    current_energy = energy;
                    accepted_moves += 1;
                }
            }

            if current_energy.energy < best_energy.energy - IMPROVEMENT_EPSILON {
                best = current.clone();
                best_energy = current_energy.clone();
                since_improvement = 0;
            } else {
                since_improvement += 1;
            }

            if best_energy.penalty <= 0.0 {
                history.push(best_energy.energy);
                break 'search StopReason::ZeroPenalty;
            }
            if since_improvement >= params.max_iterations_without_improvement {
                history.push(best_energy.energy);
                break 'search StopReason::NoImprovement;
            }
        }

        history.push(best_energy.energy);
        debug!(
            event = "temperature_pass",
            temperature,
            current_energy = current_energy.energy,
            best_energy = best_energy.energy,
            accepted_moves,
        );
        temperature *= params.cooling_rate;
    };

    Search {
        best,
        report: AnnealingReport {
            initial,
            best: best_energy,
            best_energy_history: history,
            iterations,
            accepted_moves,
            final_temperature: temperature,
            stop_reason,
            seed: None,
        },
    }
}
