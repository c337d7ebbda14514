//! School week and period grid.
//!
//! A timetable covers a single school week. Each day is divided into the
//! same ordered set of periods; some periods are breaks and never receive
//! lessons.
//!
//! # Time Model
//! Periods are identified by id and ordered by `number` (1-based). Two
//! periods are consecutive iff their numbers differ by exactly one.
//! Start/end times are informational minutes after midnight.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::PeriodId;

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All seven days, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// The default school week (Monday to Friday).
    pub const SCHOOL_WEEK: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Saturday and Sunday never receive lessons.
    #[inline]
    pub fn is_weekend(self) -> bool {
        matches!(self, Weekday::Saturday | Weekday::Sunday)
    }

    /// Zero-based index, Monday = 0.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// English day name.
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Filters a configured day list down to the days that may hold lessons.
///
/// Weekend days are dropped and duplicates removed; order is preserved.
pub fn school_days(configured: &[Weekday]) -> Vec<Weekday> {
    let mut days = Vec::with_capacity(configured.len());
    for &day in configured {
        if !day.is_weekend() && !days.contains(&day) {
            days.push(day);
        }
    }
    days
}

/// A period of the school day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Period {
    /// Unique period identifier.
    pub id: PeriodId,
    /// Ordinal position within the day (1-based).
    pub number: u32,
    /// Display label (e.g., "2nd period").
    pub name: String,
    /// Start time in minutes after midnight.
    pub start_minute: Option<u32>,
    /// End time in minutes after midnight.
    pub end_minute: Option<u32>,
    /// Break periods never receive lessons.
    pub is_break: bool,
}

impl Period {
    /// Creates a teaching period.
    pub fn new(id: PeriodId, number: u32) -> Self {
        Self {
            id,
            number,
            name: format!("Period {number}"),
            start_minute: None,
            end_minute: None,
            is_break: false,
        }
    }

    /// Creates a break period.
    pub fn break_period(id: PeriodId, number: u32) -> Self {
        Self {
            name: format!("Break {number}"),
            is_break: true,
            ..Self::new(id, number)
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets start and end times (minutes after midnight).
    pub fn with_times(mut self, start_minute: u32, end_minute: u32) -> Self {
        self.start_minute = Some(start_minute);
        self.end_minute = Some(end_minute);
        self
    }

    /// Length in minutes, if both times are known.
    pub fn duration_minutes(&self) -> Option<u32> {
        match (self.start_minute, self.end_minute) {
            (Some(s), Some(e)) if e >= s => Some(e - s),
            _ => None,
        }
    }
}

/// Length of the longest run of consecutive period numbers.
///
/// Duplicates are ignored. Returns 0 for an empty input.
pub fn longest_consecutive_run(numbers: &[u32]) -> u32 {
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut best = 0;
    let mut current = 0;
    let mut previous: Option<u32> = None;
    for n in sorted {
        current = match previous {
            Some(p) if n == p + 1 => current + 1,
            _ => 1,
        };
        best = best.max(current);
        previous = Some(n);
    }
    best
}

/// Teaching-period numbers strictly between the earliest and latest
/// occupied number that are not occupied themselves.
///
/// `teaching` is the ordered list of non-break period numbers of the day;
/// breaks inside the span never count as gaps.
pub fn gap_numbers(occupied: &[u32], teaching: &[u32]) -> Vec<u32> {
    let (Some(&min), Some(&max)) = (occupied.iter().min(), occupied.iter().max()) else {
        return Vec::new();
    };
    teaching
        .iter()
        .copied()
        .filter(|n| *n > min && *n < max && !occupied.contains(n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_school_days_drop_weekend() {
        let days = school_days(&Weekday::ALL);
        assert_eq!(days, Weekday::SCHOOL_WEEK.to_vec());
    }

    #[test]
    fn test_school_days_dedup_preserves_order() {
        let days = school_days(&[Weekday::Friday, Weekday::Monday, Weekday::Friday]);
        assert_eq!(days, vec![Weekday::Friday, Weekday::Monday]);
    }

    #[test]
    fn test_period_builders() {
        let p = Period::new(7, 2).with_times(8 * 60 + 50, 9 * 60 + 35);
        assert_eq!(p.name, "Period 2");
        assert!(!p.is_break);
        assert_eq!(p.duration_minutes(), Some(45));

        let b = Period::break_period(8, 3);
        assert!(b.is_break);
        assert_eq!(b.duration_minutes(), None);
    }

    #[test]
    fn test_longest_consecutive_run() {
        assert_eq!(longest_consecutive_run(&[]), 0);
        assert_eq!(longest_consecutive_run(&[3]), 1);
        assert_eq!(longest_consecutive_run(&[1, 2, 4, 5, 6]), 3);
        assert_eq!(longest_consecutive_run(&[6, 5, 5, 4]), 3);
    }

    #[test]
    fn test_gap_numbers() {
        let teaching = [1, 2, 3, 4, 5];
        assert_eq!(gap_numbers(&[1, 3], &teaching), vec![2]);
        assert!(gap_numbers(&[1, 2, 3], &teaching).is_empty());
        assert_eq!(gap_numbers(&[1, 5], &teaching), vec![2, 3, 4]);
        // Break numbers are not part of the teaching list.
        assert!(gap_numbers(&[2, 4], &[1, 2, 4, 5]).is_empty());
    }
}
