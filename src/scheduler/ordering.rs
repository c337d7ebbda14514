//! Lesson ordering rules.
//!
//! The engines place lessons one instance at a time, so the order decides
//! which lessons get the scarce slots. Orders are composed from small
//! rules with sequential tie-breaking.
//!
//! # Score Convention
//! **Lower score = placed earlier.**
//!
//! # Usage
//!
//! ```
//! use u_timetable::scheduler::ordering::{self, LessonOrdering};
//! use u_timetable::models::Lesson;
//!
//! let order = LessonOrdering::new()
//!     .with_rule(ordering::RequiresRoomType)
//!     .with_rule(ordering::MostFrequent);
//!
//! let lessons = vec![
//!     Lesson::new(1).with_frequency(2),
//!     Lesson::new(2).with_frequency(4),
//!     Lesson::new(3).with_frequency(1).with_room_type("Lab"),
//! ];
//! let refs: Vec<&Lesson> = lessons.iter().collect();
//! let ids: Vec<u32> = order.sort(&refs).iter().map(|l| l.id).collect();
//! assert_eq!(ids, vec![3, 2, 1]);
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use crate::models::Lesson;

/// Score returned by an ordering rule.
pub type OrderScore = f64;

/// A rule that scores how early a lesson should be placed.
pub trait OrderingRule: Send + Sync + Debug {
    /// Rule name.
    fn name(&self) -> &'static str;

    /// Lower = placed earlier.
    fn evaluate(&self, lesson: &Lesson) -> OrderScore;
}

/// How multiple rules are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvaluationMode {
    /// Apply rules in sequence; use next rule only on ties.
    #[default]
    Sequential,
    /// Compare the weighted sum of all rule scores.
    Weighted,
}

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Keep input order.
    #[default]
    InputOrder,
    /// Ascending lesson id.
    ById,
}

#[derive(Debug, Clone)]
struct WeightedRule {
    rule: Arc<dyn OrderingRule>,
    weight: f64,
}

/// A composable lesson order.
#[derive(Debug, Clone)]
pub struct LessonOrdering {
    rules: Vec<WeightedRule>,
    mode: EvaluationMode,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl LessonOrdering {
    /// An order without rules (input order).
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Sequential,
            tie_breaker: TieBreaker::InputOrder,
            epsilon: 1e-9,
        }
    }

    /// Room-type lessons first, then by descending frequency.
    pub fn greedy() -> Self {
        Self::new()
            .with_rule(RequiresRoomType)
            .with_rule(MostFrequent)
    }

    /// [`greedy`](Self::greedy), then by descending duration.
    pub fn priority() -> Self {
        Self::greedy().with_rule(LongestDuration)
    }

    /// Ascending frequency, then room-type lessons first.
    pub fn annealing_seed() -> Self {
        Self::new()
            .with_rule(LeastFrequent)
            .with_rule(RequiresRoomType)
    }

    /// Adds a rule (weight 1.0).
    pub fn with_rule<R: OrderingRule + 'static>(self, rule: R) -> Self {
        self.with_weighted_rule(rule, 1.0)
    }

    /// Adds a weighted rule; the weight only matters in weighted mode.
    pub fn with_weighted_rule<R: OrderingRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|wr| wr.rule.name()).collect()
    }

    /// Returns the lessons in placement order. The sort is stable.
    pub fn sort<'a>(&self, lessons: &[&'a Lesson]) -> Vec<&'a Lesson> {
        let mut sorted = lessons.to_vec();
        match self.mode {
            EvaluationMode::Sequential => {
                sorted.sort_by(|a, b| self.compare_sequential(a, b));
            }
            EvaluationMode::Weighted => {
                sorted.sort_by(|a, b| {
                    self.weighted_score(a)
                        .partial_cmp(&self.weighted_score(b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| self.final_tie(a, b))
                });
            }
        }
        sorted
    }

    fn compare_sequential(&self, a: &Lesson, b: &Lesson) -> std::cmp::Ordering {
        for wr in &self.rules {
            let score_a = wr.rule.evaluate(a);
            let score_b = wr.rule.evaluate(b);
            if (score_a - score_b).abs() > self.epsilon {
                return score_a
                    .partial_cmp(&score_b)
                    .unwrap_or(std::cmp::Ordering::Equal);
            }
        }
        self.final_tie(a, b)
    }

    fn final_tie(&self, a: &Lesson, b: &Lesson) -> std::cmp::Ordering {
        match self.tie_breaker {
            TieBreaker::InputOrder => std::cmp::Ordering::Equal,
            TieBreaker::ById => a.id.cmp(&b.id),
        }
    }

    fn weighted_score(&self, lesson: &Lesson) -> f64 {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(lesson) * wr.weight)
            .sum()
    }
}

impl Default for LessonOrdering {
    fn default() -> Self {
        Self::new()
    }
}

// ======================== Built-in rules ========================

/// Lessons that need a specific room type first.
#[derive(Debug, Clone, Copy)]
pub struct RequiresRoomType;

impl OrderingRule for RequiresRoomType {
    fn name(&self) -> &'static str {
        "RequiresRoomType"
    }

    fn evaluate(&self, lesson: &Lesson) -> OrderScore {
        if lesson.requires_room_type() {
            0.0
        } else {
            1.0
        }
    }
}

/// Higher weekly frequency first.
#[derive(Debug, Clone, Copy)]
pub struct MostFrequent;

impl OrderingRule for MostFrequent {
    fn name(&self) -> &'static str {
        "MostFrequent"
    }

    fn evaluate(&self, lesson: &Lesson) -> OrderScore {
        -f64::from(lesson.weekly_frequency)
    }
}

/// Lower weekly frequency first.
#[derive(Debug, Clone, Copy)]
pub struct LeastFrequent;

impl OrderingRule for LeastFrequent {
    fn name(&self) -> &'static str {
        "LeastFrequent"
    }

    fn evaluate(&self, lesson: &Lesson) -> OrderScore {
        f64::from(lesson.weekly_frequency)
    }
}

/// Longer lessons first.
#[derive(Debug, Clone, Copy)]
pub struct LongestDuration;

impl OrderingRule for LongestDuration {
    fn name(&self) -> &'static str {
        "LongestDuration"
    }

    fn evaluate(&self, lesson: &Lesson) -> OrderScore {
        -f64::from(lesson.duration)
    }
}
