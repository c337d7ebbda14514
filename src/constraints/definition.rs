//! Constraint metadata.
//!
//! A [`ConstraintDefinition`] describes a rule: its code, whether it is
//! hard or soft, its category, the message template used for violations,
//! the entity names exempt from it and, for soft rules, a priority that
//! sizes the scoring penalty. Behavior lives in [`super::rules`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Hard constraints block a placement; soft constraints only lower its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    Hard,
    Soft,
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConstraintType::Hard => "hard",
            ConstraintType::Soft => "soft",
        })
    }
}

/// Constraint grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintCategory {
    /// Double bookings.
    Conflict,
    /// Availability tables.
    Availability,
    /// Time-of-day rules.
    Time,
    /// Rooms.
    Resource,
    /// Per-day load limits.
    Workload,
    /// Teaching quality rules.
    Pedagogical,
}

/// Soft-constraint priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintPriority {
    Low,
    Normal,
    High,
    Critical,
}

/// Score penalty for a soft violation without a priority.
pub const UNMAPPED_PENALTY: i64 = 15;

impl ConstraintPriority {
    /// Points subtracted from a slot score per violation.
    pub fn penalty(self) -> i64 {
        match self {
            ConstraintPriority::Critical => 100,
            ConstraintPriority::High => 50,
            ConstraintPriority::Normal => 20,
            ConstraintPriority::Low => 10,
        }
    }
}

/// Names exempt from a constraint, stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptEntities {
    /// Teacher first names or full names.
    pub teachers: BTreeSet<String>,
    /// Class names.
    pub classes: BTreeSet<String>,
    /// Room numbers.
    pub rooms: BTreeSet<String>,
}

impl ExemptEntities {
    /// Whether any teacher name is exempt.
    pub fn teacher(&self, first_name: &str, full_name: &str) -> bool {
        contains_ci(&self.teachers, first_name) || contains_ci(&self.teachers, full_name)
    }

    pub fn class(&self, name: &str) -> bool {
        contains_ci(&self.classes, name)
    }

    pub fn room(&self, number: &str) -> bool {
        contains_ci(&self.rooms, number)
    }

    pub fn is_empty(&self) -> bool {
        self.teachers.is_empty() && self.classes.is_empty() && self.rooms.is_empty()
    }
}

fn contains_ci(set: &BTreeSet<String>, name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && set.contains(&trimmed.to_lowercase())
}

/// Metadata of one constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDefinition {
    /// Unique code (e.g., "HC-1").
    pub code: String,
    pub name: String,
    pub constraint_type: ConstraintType,
    pub category: ConstraintCategory,
    pub description: String,
    /// Message with positional placeholders `{0}`, `{1}`, ...
    pub message_template: String,
    pub exempt: ExemptEntities,
    /// Soft constraints only.
    pub priority: Option<ConstraintPriority>,
}

impl ConstraintDefinition {
    /// Creates a hard constraint.
    pub fn hard(
        code: impl Into<String>,
        name: impl Into<String>,
        category: ConstraintCategory,
        message_template: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            constraint_type: ConstraintType::Hard,
            category,
            description: String::new(),
            message_template: message_template.into(),
            exempt: ExemptEntities::default(),
            priority: None,
        }
    }

    /// Creates a soft constraint.
    pub fn soft(
        code: impl Into<String>,
        name: impl Into<String>,
        category: ConstraintCategory,
        priority: ConstraintPriority,
        message_template: impl Into<String>,
    ) -> Self {
        Self {
            constraint_type: ConstraintType::Soft,
            priority: Some(priority),
            ..Self::hard(code, name, category, message_template)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_exempt(mut self, exempt: ExemptEntities) -> Self {
        self.exempt = exempt;
        self
    }

    #[inline]
    pub fn is_hard(&self) -> bool {
        self.constraint_type == ConstraintType::Hard
    }

    /// Score penalty of one violation.
    pub fn penalty(&self) -> i64 {
        self.priority.map_or(UNMAPPED_PENALTY, ConstraintPriority::penalty)
    }

    /// Renders the message template.
    pub fn format_message(&self, args: &[&str]) -> String {
        format_template(&self.message_template, args)
    }
}

/// Replaces `{0}`, `{1}`, ... with the matching argument.
///
/// Placeholders without an argument are left untouched.
pub fn format_template(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match key.parse::<usize>().ok().and_then(|i| args.get(i)) {
                    Some(arg) => out.push_str(arg),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
