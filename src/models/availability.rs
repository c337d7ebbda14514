//! Availability tables.
//!
//! Each teacher, class, room and subject may carry availability records
//! per (day, period). Importance uses a signed 7-point scale:
//!
//! | Value | Meaning |
//! |-------|---------|
//! | -3 | Must not schedule (hard) |
//! | -2, -1 | Dislike (soft, stronger to weaker) |
//! | 0 | Neutral |
//! | +1, +2 | Preference (soft) |
//! | +3 | Must schedule |
//!
//! Hard constraints react to ±3 only; soft constraints to the ranged values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{PeriodId, Weekday};

/// Importance on the -3..=+3 scale. Out-of-range input is clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i8", into = "i8")]
pub struct Importance(i8);

impl Importance {
    pub const MUST_NOT: Importance = Importance(-3);
    pub const NEUTRAL: Importance = Importance(0);
    pub const MUST: Importance = Importance(3);

    /// Creates an importance, clamped to -3..=3.
    pub fn new(value: i8) -> Self {
        Self(value.clamp(-3, 3))
    }

    #[inline]
    pub fn value(self) -> i8 {
        self.0
    }

    /// -3: the entity must not be scheduled here.
    #[inline]
    pub fn is_blocked(self) -> bool {
        self.0 == -3
    }

    /// -2 or -1.
    #[inline]
    pub fn is_dislike(self) -> bool {
        matches!(self.0, -2 | -1)
    }

    /// +1 or +2.
    #[inline]
    pub fn is_preference(self) -> bool {
        matches!(self.0, 1 | 2)
    }
}

impl From<i8> for Importance {
    fn from(value: i8) -> Self {
        Self::new(value)
    }
}

impl From<Importance> for i8 {
    fn from(value: Importance) -> Self {
        value.0
    }
}

/// One availability record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    /// Teacher, class, room or subject id (depending on the table).
    pub entity_id: u32,
    pub day: Weekday,
    pub period_id: PeriodId,
    pub importance: Importance,
}

impl Availability {
    pub fn new(entity_id: u32, day: Weekday, period_id: PeriodId, importance: i8) -> Self {
        Self {
            entity_id,
            day,
            period_id,
            importance: Importance::new(importance),
        }
    }
}

/// Availability lookup for one entity kind.
///
/// Missing entries are neutral. Serializes as a flat record list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Availability>", into = "Vec<Availability>")]
pub struct AvailabilityTable {
    entries: HashMap<(u32, Weekday, PeriodId), Importance>,
}

impl AvailabilityTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from records. Later records overwrite earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = Availability>) -> Self {
        let mut table = Self::new();
        for r in records {
            table.insert(r);
        }
        table
    }

    /// Adds or replaces a record.
    pub fn insert(&mut self, record: Availability) {
        self.entries
            .insert((record.entity_id, record.day, record.period_id), record.importance);
    }

    /// Builder: sets one importance.
    pub fn with(mut self, entity_id: u32, day: Weekday, period_id: PeriodId, importance: i8) -> Self {
        self.insert(Availability::new(entity_id, day, period_id, importance));
        self
    }

    /// Importance at a slot (neutral if unset).
    pub fn importance(&self, entity_id: u32, day: Weekday, period_id: PeriodId) -> Importance {
        self.entries
            .get(&(entity_id, day, period_id))
            .copied()
            .unwrap_or_default()
    }

    /// Whether the slot is marked -3.
    pub fn is_blocked(&self, entity_id: u32, day: Weekday, period_id: PeriodId) -> bool {
        self.importance(entity_id, day, period_id).is_blocked()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<Availability>> for AvailabilityTable {
    fn from(records: Vec<Availability>) -> Self {
        Self::from_records(records)
    }
}

impl From<AvailabilityTable> for Vec<Availability> {
    fn from(table: AvailabilityTable) -> Self {
        let mut records: Vec<Availability> = table
            .entries
            .into_iter()
            .map(|((entity_id, day, period_id), importance)| Availability {
                entity_id,
                day,
                period_id,
                importance,
            })
            .collect();
        records.sort_by_key(|r| (r.entity_id, r.day, r.period_id));
        records
    }
}
