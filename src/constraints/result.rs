//! Violation and validation result types.
//!
//! Violations are values, not errors: every layer returns them so that the
//! engines can score candidates and the collaborator can render them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::definition::{ConstraintDefinition, ConstraintPriority, ConstraintType};
use crate::models::{LessonId, PeriodId, ScheduledLessonId, TimetableId, Weekday};

/// Machine-readable detail attached to a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Number(i64),
    Ids(Vec<u32>),
    Text(String),
}

impl From<u32> for DetailValue {
    fn from(v: u32) -> Self {
        DetailValue::Number(i64::from(v))
    }
}

impl From<i64> for DetailValue {
    fn from(v: i64) -> Self {
        DetailValue::Number(v)
    }
}

impl From<Vec<u32>> for DetailValue {
    fn from(v: Vec<u32>) -> Self {
        DetailValue::Ids(v)
    }
}

impl From<&str> for DetailValue {
    fn from(v: &str) -> Self {
        DetailValue::Text(v.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(v: String) -> Self {
        DetailValue::Text(v)
    }
}

/// Entity and lesson ids involved in a violation, keyed by role.
pub type Details = BTreeMap<String, DetailValue>;

/// Builds a [`Details`] map from `(key, value)` pairs.
pub fn details<const N: usize>(pairs: [(&str, DetailValue); N]) -> Details {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Outcome of one rule for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleVerdict {
    Satisfied,
    Violated { message: String, details: Details },
}

impl RuleVerdict {
    pub fn violated(message: String, details: Details) -> Self {
        RuleVerdict::Violated { message, details }
    }

    #[inline]
    pub fn is_satisfied(&self) -> bool {
        matches!(self, RuleVerdict::Satisfied)
    }
}

/// A violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub code: String,
    pub name: String,
    pub constraint_type: ConstraintType,
    pub priority: Option<ConstraintPriority>,
    pub message: String,
    pub details: Details,
    /// Evaluation time (ms since the Unix epoch), taken from the context.
    pub timestamp_ms: i64,
}

impl ConstraintViolation {
    pub fn new(
        definition: &ConstraintDefinition,
        message: String,
        details: Details,
        timestamp_ms: i64,
    ) -> Self {
        Self {
            code: definition.code.clone(),
            name: definition.name.clone(),
            constraint_type: definition.constraint_type,
            priority: definition.priority,
            message,
            details,
            timestamp_ms,
        }
    }

    #[inline]
    pub fn is_hard(&self) -> bool {
        self.constraint_type == ConstraintType::Hard
    }
}

/// Result of checking a single constraint code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintResult {
    pub code: String,
    pub satisfied: bool,
    /// Violation message, or an explanation when the code was skipped.
    pub message: Option<String>,
    pub violation: Option<ConstraintViolation>,
}

impl ConstraintResult {
    pub fn satisfied(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            satisfied: true,
            message: None,
            violation: None,
        }
    }

    /// Satisfied with an explanation (e.g. unknown code).
    pub fn skipped(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            message: Some(reason.into()),
            ..Self::satisfied(code)
        }
    }

    pub fn violated(violation: ConstraintViolation) -> Self {
        Self {
            code: violation.code.clone(),
            satisfied: false,
            message: Some(violation.message.clone()),
            violation: Some(violation),
        }
    }
}

/// Errors (hard) and warnings (soft) for one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<ConstraintViolation>,
    pub warnings: Vec<ConstraintViolation>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files a violation under errors or warnings by its type.
    pub fn push(&mut self, violation: ConstraintViolation) {
        if violation.is_hard() {
            self.errors.push(violation);
        } else {
            self.warnings.push(violation);
        }
    }

    /// Appends all violations of `other`.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// No hard violations.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[inline]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Errors followed by warnings.
    pub fn violations(&self) -> impl Iterator<Item = &ConstraintViolation> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Codes of all violations, errors first.
    pub fn codes(&self) -> Vec<&str> {
        self.violations().map(|v| v.code.as_str()).collect()
    }

    pub fn error_messages(&self) -> Vec<&str> {
        self.errors.iter().map(|v| v.message.as_str()).collect()
    }

    pub fn warning_messages(&self) -> Vec<&str> {
        self.warnings.iter().map(|v| v.message.as_str()).collect()
    }

    /// Number of violations with the given code.
    pub fn count_of(&self, code: &str) -> usize {
        self.violations().filter(|v| v.code == code).count()
    }
}

/// Validation of one placement inside a timetable check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementValidation {
    pub scheduled_lesson_id: Option<ScheduledLessonId>,
    pub lesson_id: LessonId,
    pub day: Weekday,
    pub period_id: PeriodId,
    pub result: ValidationResult,
}

/// Result of validating every placement of a timetable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableValidationResult {
    pub timetable_id: TimetableId,
    pub lessons_checked: usize,
    /// Only placements with at least one violation.
    pub placements: Vec<PlacementValidation>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl TimetableValidationResult {
    pub fn new(timetable_id: TimetableId) -> Self {
        Self {
            timetable_id,
            lessons_checked: 0,
            placements: Vec::new(),
            error_count: 0,
            warning_count: 0,
        }
    }

    /// Records the result for one placement.
    pub fn record(&mut self, placement: PlacementValidation) {
        self.lessons_checked += 1;
        self.error_count += placement.result.errors.len();
        self.warning_count += placement.result.warnings.len();
        if !placement.result.errors.is_empty() || !placement.result.warnings.is_empty() {
            self.placements.push(placement);
        }
    }

    /// Publishable: no hard violations anywhere.
    pub fn is_valid(&self) -> bool {
        self.error_count == 0
    }

    /// Distinct violated codes.
    pub fn violated_codes(&self) -> BTreeSet<&str> {
        self.placements
            .iter()
            .flat_map(|p| p.result.codes())
            .collect()
    }

    pub fn error_messages(&self) -> Vec<&str> {
        self.placements
            .iter()
            .flat_map(|p| p.result.error_messages())
            .collect()
    }

    pub fn warning_messages(&self) -> Vec<&str> {
        self.placements
            .iter()
            .flat_map(|p| p.result.warning_messages())
            .collect()
    }
}
