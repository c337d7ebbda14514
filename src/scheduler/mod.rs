//! Timetable engines.
//!
//! Three engines share one request/result contract:
//!
//! | Engine | Strategy | Metrics |
//! |--------|----------|---------|
//! | [`GreedyScheduler`] | single pass, best soft score per instance | no |
//! | [`PriorityScheduler`] | same, duration tie-break | [`QualityMetrics`] |
//! | [`AnnealingScheduler`](annealing::AnnealingScheduler) | first-fit start, simulated annealing | [`QualityMetrics`] |
//!
//! Every engine returns a [`SchedulingResult`]; input errors become an
//! `error = true` result instead of a panic or an `Err`.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod annealing;
mod greedy;
pub mod ordering;
mod quality;
mod request;

pub use annealing::AnnealingScheduler;
pub use greedy::{soft_score, GreedyScheduler, PriorityScheduler, BASELINE_SCORE};
pub use ordering::LessonOrdering;
pub use quality::QualityMetrics;
pub use request::{ScheduleStats, SchedulingRequest, SchedulingResult};

use crate::models::SchoolData;

/// A timetable generation strategy.
pub trait TimetableScheduler {
    /// Engine name used in logs.
    fn name(&self) -> &'static str;

    /// Generates the timetable of `request.timetable_id`.
    fn schedule(&self, data: &SchoolData, request: &SchedulingRequest) -> SchedulingResult;
}
