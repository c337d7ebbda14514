//! Per-invocation validation settings.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use crate::models::{ScheduledLesson, Weekday};

/// Settings for one validation call or one batch of calls.
///
/// Filtering: if `include_codes` is non-empty only those codes are checked
/// and `exclude_codes` is ignored; otherwise every code except the excluded
/// ones is checked.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Allow-list of codes (upper-case).
    pub include_codes: BTreeSet<String>,
    /// Deny-list of codes (upper-case).
    pub exclude_codes: BTreeSet<String>,
    /// Whether `validate_all` runs soft rules.
    pub include_soft: bool,
    /// Stop after the first hard violation.
    pub early_exit: bool,
    /// Timestamp stamped on every violation (ms since the Unix epoch).
    pub as_of_ms: i64,
    cache: RefCell<ScratchCache>,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            include_codes: BTreeSet::new(),
            exclude_codes: BTreeSet::new(),
            include_soft: true,
            early_exit: false,
            as_of_ms: 0,
            cache: RefCell::new(ScratchCache::default()),
        }
    }
}

fn normalized<I, S>(codes: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .map(|c| c.as_ref().trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect()
}

impl ValidationContext {
    /// Full check: every code, soft included, no early exit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hard rules only, stop at the first violation. Used by the engines
    /// during placement search.
    pub fn feasibility() -> Self {
        Self {
            include_soft: false,
            early_exit: true,
            ..Self::default()
        }
    }

    /// Restricts validation to the given codes.
    pub fn only<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.include_codes = normalized(codes);
        self
    }

    /// Skips the given codes.
    pub fn except<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_codes = normalized(codes);
        self
    }

    pub fn with_soft(mut self, include_soft: bool) -> Self {
        self.include_soft = include_soft;
        self
    }

    pub fn with_early_exit(mut self, early_exit: bool) -> Self {
        self.early_exit = early_exit;
        self
    }

    /// Sets the violation timestamp.
    pub fn at(mut self, as_of_ms: i64) -> Self {
        self.as_of_ms = as_of_ms;
        self
    }

    /// Whether `code` passes the allow/deny filter.
    pub fn should_check(&self, code: &str) -> bool {
        let code = code.to_uppercase();
        if !self.include_codes.is_empty() {
            return self.include_codes.contains(&code);
        }
        !self.exclude_codes.contains(&code)
    }

    /// Positions in `schedule` of the placements on `day`.
    pub(crate) fn day_positions(&self, schedule: &[ScheduledLesson], day: Weekday) -> Vec<usize> {
        let mut cache = self.cache.borrow_mut();
        cache.refresh(schedule);
        cache.by_day.get(&day).cloned().unwrap_or_default()
    }
}

/// Per-day index of an existing schedule, reused across the candidates of
/// one batch.
///
/// The index depends only on the day of each position, so it is keyed on
/// that day sequence. Any schedule with the same sequence, whatever its
/// address, shares the index.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScratchCache {
    days: Option<Vec<Weekday>>,
    by_day: HashMap<Weekday, Vec<usize>>,
}

impl ScratchCache {
    fn refresh(&mut self, schedule: &[ScheduledLesson]) {
        let current = schedule.iter().map(|s| s.day);
        if self.days.as_ref().is_some_and(|days| current.clone().eq(days.iter().copied())) {
            return;
        }
        self.by_day.clear();
        for (i, s) in schedule.iter().enumerate() {
            self.by_day.entry(s.day).or_default().push(i);
        }
        self.days = Some(current.collect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_wins() {
        let ctx = ValidationContext::new().only(["hc-1"]).except(["HC-1"]);
        assert!(ctx.should_check("HC-1"));
        assert!(!ctx.should_check("HC-2"));
    }

    #[test]
    fn test_deny_list() {
        let ctx = ValidationContext::new().except(["SC-7", " sc-8 "]);
        assert!(!ctx.should_check("SC-7"));
        assert!(!ctx.should_check("sc-8"));
        assert!(ctx.should_check("HC-1"));
    }

    #[test]
    fn test_feasibility_preset() {
        let ctx = ValidationContext::feasibility();
        assert!(!ctx.include_soft);
        assert!(ctx.early_exit);
    }

    #[test]
    fn test_day_positions_refresh_on_growth() {
        let ctx = ValidationContext::new();
        let mut schedule = vec![ScheduledLesson::candidate(1, 1, Weekday::Monday, 1)];
        assert_eq!(ctx.day_positions(&schedule, Weekday::Monday), vec![0]);
        schedule.push(ScheduledLesson::candidate(2, 1, Weekday::Monday, 2));
        assert_eq!(ctx.day_positions(&schedule, Weekday::Monday), vec![0, 1]);
        assert!(ctx.day_positions(&schedule, Weekday::Friday).is_empty());
    }

    #[test]
    fn test_day_positions_follow_in_place_edit() {
        let ctx = ValidationContext::new();
        let mut schedule = vec![ScheduledLesson::candidate(1, 1, Weekday::Monday, 1)];
        assert_eq!(ctx.day_positions(&schedule, Weekday::Monday), vec![0]);
        schedule[0].day = Weekday::Tuesday;
        assert!(ctx.day_positions(&schedule, Weekday::Monday).is_empty());
        assert_eq!(ctx.day_positions(&schedule, Weekday::Tuesday), vec![0]);
    }

    #[test]
    fn test_day_positions_across_schedules_of_equal_length() {
        let ctx = ValidationContext::new();
        let monday = vec![ScheduledLesson::candidate(1, 1, Weekday::Monday, 2)];
        assert_eq!(ctx.day_positions(&monday, Weekday::Monday), vec![0]);
        drop(monday);
        let tuesday = vec![ScheduledLesson::candidate(1, 1, Weekday::Tuesday, 2)];
        assert!(ctx.day_positions(&tuesday, Weekday::Monday).is_empty());
        assert_eq!(ctx.day_positions(&tuesday, Weekday::Tuesday), vec![0]);
    }
}
