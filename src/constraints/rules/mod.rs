//! Constraint rules and the code-to-rule table.
//!
//! Each rule is a pure function of a [`RuleInput`]: the candidate placement,
//! its lesson, the placements already on the same day of the same timetable
//! and the rule's own [`ConstraintDefinition`] (for the message template and
//! the exempt names). A rule reports the first violation it finds and stops.
//!
//! Related records that cannot be resolved (an unknown teacher id, a lesson
//! that disappeared) never produce a violation.
//!
//! The table is kept apart from the catalog: a new rule is added by
//! registering its definition in the catalog and its behavior here.

pub mod hard;
pub mod soft;

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use super::definition::ConstraintDefinition;
use super::result::RuleVerdict;
use crate::models::{Lesson, Room, ScheduledLesson, SchoolClass, SchoolData, Teacher};

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub data: &'a SchoolData,
    pub definition: &'a ConstraintDefinition,
    pub candidate: &'a ScheduledLesson,
    pub lesson: &'a Lesson,
    /// Placements on the candidate's day and timetable, candidate excluded.
    pub same_day: &'a [&'a ScheduledLesson],
    /// The whole existing schedule.
    pub schedule: &'a [ScheduledLesson],
    /// Period numbers treated as the lunch window.
    pub lunch_periods: &'a [u32],
}

impl<'a> RuleInput<'a> {
    /// Other placements on the same day, with their resolved lessons.
    pub fn on_day(&self) -> impl Iterator<Item = (&'a ScheduledLesson, &'a Lesson)> + '_ {
        let data = self.data;
        self.same_day
            .iter()
            .filter_map(move |s| data.lesson(s.lesson_id).map(|l| (*s, l)))
    }

    /// Other placements in the candidate's (day, period).
    pub fn at_slot(&self) -> impl Iterator<Item = (&'a ScheduledLesson, &'a Lesson)> + '_ {
        let period_id = self.candidate.period_id;
        self.on_day().filter(move |(s, _)| s.period_id == period_id)
    }

    /// Period numbers occupied on the day by lessons matching `pred`,
    /// candidate included.
    pub fn day_numbers(&self, pred: impl Fn(&Lesson) -> bool) -> Vec<u32> {
        let mut numbers: Vec<u32> = self
            .on_day()
            .filter(|(_, l)| pred(*l))
            .filter_map(|(s, _)| self.data.period_number(s.period_id))
            .collect();
        numbers.extend(self.period_number());
        numbers
    }

    /// Number of placements on the day matching `pred`, candidate included.
    pub fn day_count(&self, pred: impl Fn(&Lesson) -> bool) -> usize {
        self.on_day().filter(|(_, l)| pred(*l)).count() + 1
    }

    pub fn period_number(&self) -> Option<u32> {
        self.data.period_number(self.candidate.period_id)
    }

    pub fn day_name(&self) -> &'static str {
        self.candidate.day.name()
    }

    /// Period label for messages: its number, or the raw id if unknown.
    pub fn period_label(&self) -> String {
        self.period_number()
            .unwrap_or(self.candidate.period_id)
            .to_string()
    }

    /// Resolved, non-exempt teachers of the lesson.
    pub fn teachers(&self) -> impl Iterator<Item = &'a Teacher> + '_ {
        let data = self.data;
        let exempt = &self.definition.exempt;
        self.lesson
            .teacher_ids
            .iter()
            .filter_map(move |id| data.teacher(*id))
            .filter(move |t| !exempt.teacher(&t.first_name, &t.full_name()))
    }

    /// Resolved, non-exempt classes of the lesson.
    pub fn classes(&self) -> impl Iterator<Item = &'a SchoolClass> + '_ {
        let data = self.data;
        let exempt = &self.definition.exempt;
        self.lesson
            .class_ids
            .iter()
            .filter_map(move |id| data.class(*id))
            .filter(move |c| !exempt.class(&c.name))
    }

    /// Resolved, non-exempt rooms of the candidate.
    pub fn rooms(&self) -> Vec<&'a Room> {
        let exempt = &self.definition.exempt;
        self.candidate
            .rooms()
            .into_iter()
            .filter_map(|id| self.data.room(id))
            .filter(|r| !exempt.room(&r.number))
            .collect()
    }

    /// Renders the definition's message template.
    pub fn message(&self, args: &[&str]) -> String {
        self.definition.format_message(args)
    }
}

/// Behavior of one constraint code.
pub trait ConstraintRule: Send + Sync + Debug {
    /// Code this rule implements (e.g., "HC-1").
    fn code(&self) -> &'static str;

    /// Checks the candidate; the first violation found is returned.
    fn check(&self, input: &RuleInput<'_>) -> RuleVerdict;
}

/// Code-to-rule table.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: HashMap<String, Arc<dyn ConstraintRule>>,
}

impl RuleSet {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The 12 hard and 11 soft standard rules.
    pub fn standard() -> Self {
        Self::new()
            .with_rule(hard::TeacherDoubleBooking)
            .with_rule(hard::ClassDoubleBooking)
            .with_rule(hard::RoomDoubleBooking)
            .with_rule(hard::TeacherBlocked)
            .with_rule(hard::ClassBlocked)
            .with_rule(hard::RoomBlocked)
            .with_rule(hard::SubjectBlocked)
            .with_rule(hard::TeacherConsecutive)
            .with_rule(hard::ClassConsecutiveSubject)
            .with_rule(hard::LockedLesson)
            .with_rule(hard::TeacherDailyMax)
            .with_rule(hard::ClassDailyMax)
            .with_rule(soft::TeacherDislike)
            .with_rule(soft::ClassDislike)
            .with_rule(soft::SubjectTimePreference)
            .with_rule(soft::RoomPreference)
            .with_rule(soft::TeacherLunchBreak)
            .with_rule(soft::ClassLunchBreak)
            .with_rule(soft::ClassGap)
            .with_rule(soft::RoomTypeMismatch)
            .with_rule(soft::PreferredSubjectRoom)
            .with_rule(soft::TeacherDailyMin)
            .with_rule(soft::ClassDailyMin)
    }

    /// Registers a rule; an existing rule for the same code is replaced.
    pub fn with_rule<R: ConstraintRule + 'static>(mut self, rule: R) -> Self {
        self.rules.insert(rule.code().to_string(), Arc::new(rule));
        self
    }

    /// Case-insensitive lookup.
    pub fn get(&self, code: &str) -> Option<&Arc<dyn ConstraintRule>> {
        self.rules
            .get(code)
            .or_else(|| self.rules.get(&code.trim().to_uppercase()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut codes: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        codes.sort_unstable();
        f.debug_struct("RuleSet").field("codes", &codes).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintCatalog;

    #[test]
    fn test_standard_covers_catalog() {
        let rules = RuleSet::standard();
        let catalog = ConstraintCatalog::default();
        assert_eq!(rules.len(), catalog.len());
        for d in catalog.all() {
            assert!(rules.get(&d.code).is_some(), "no rule for {}", d.code);
        }
        assert!(rules.get("sc-7").is_some());
        assert!(rules.get("XX-1").is_none());
    }
}
