//! Constraint registry.
//!
//! The catalog is the static list of constraint definitions (12 hard,
//! 11 soft). It is built once from an [`ExemptionPolicy`] and never
//! mutated afterwards; lookups hand out shared references only.
//!
//! | Code | Type | Rule |
//! |------|------|------|
//! | HC-1..3 | hard | teacher / class / room double booking |
//! | HC-4..7 | hard | teacher / class / room / subject marked -3 |
//! | HC-8 | hard | teacher consecutive periods ≤ max |
//! | HC-9 | hard | class consecutive same-subject periods ≤ max |
//! | HC-10 | hard | locked placements are immovable |
//! | HC-11, 12 | hard | teacher / class periods per day ≤ max |
//! | SC-1..4 | soft | teacher / class / subject / room dislikes (-2, -1) |
//! | SC-5, 6 | soft | teacher / class lunch window |
//! | SC-7 | soft | no gaps in a class day |
//! | SC-8, 9 | soft | room type, preferred subject room |
//! | SC-10, 11 | soft | teacher / class minimum periods per day |

use std::collections::HashMap;

use super::definition::{
    ConstraintCategory as Cat, ConstraintDefinition as Def, ConstraintPriority as Prio,
    ConstraintType,
};
use super::exemptions::ExemptionPolicy;

/// Immutable catalog of constraint definitions.
#[derive(Debug, Clone)]
pub struct ConstraintCatalog {
    definitions: Vec<Def>,
    index: HashMap<String, usize>,
}

#[rustfmt::skip]
fn standard_definitions() -> Vec<Def> {
    vec![
        Def::hard("HC-1", "Teacher double booking", Cat::Conflict,
            "Teacher {0} is already scheduled on {1}, period {2}")
            .with_description("A teacher cannot give two lessons at the same time."),
        Def::hard("HC-2", "Class double booking", Cat::Conflict,
            "Class {0} is already scheduled on {1}, period {2}")
            .with_description("A class cannot attend two lessons at the same time."),
        Def::hard("HC-3", "Room double booking", Cat::Conflict,
            "Room {0} is already occupied on {1}, period {2}")
            .with_description("A room (primary or additional) holds one lesson at a time."),
        Def::hard("HC-4", "Teacher unavailable", Cat::Availability,
            "Teacher {0} is not available on {1}, period {2}"),
        Def::hard("HC-5", "Class unavailable", Cat::Availability,
            "Class {0} is not available on {1}, period {2}"),
        Def::hard("HC-6", "Room unavailable", Cat::Availability,
            "Room {0} is not available on {1}, period {2}"),
        Def::hard("HC-7", "Subject blocked", Cat::Availability,
            "Subject {0} must not be taught on {1}, period {2}")
            .with_description("Checked for every subject of a multi-subject lesson."),
        Def::hard("HC-8", "Teacher consecutive periods", Cat::Workload,
            "Teacher {0} would teach {1} consecutive periods on {2} (max {3})"),
        Def::hard("HC-9", "Class consecutive subject periods", Cat::Pedagogical,
            "Class {0} would have {1} consecutive periods of {2} on {3} (max {4})"),
        Def::hard("HC-10", "Locked lesson", Cat::Conflict,
            "Lesson {0} is locked and cannot be moved")
            .with_description("Enforced when editing placements, not during generation."),
        Def::hard("HC-11", "Teacher periods per day", Cat::Workload,
            "Teacher {0} would teach {1} periods on {2} (max {3})"),
        Def::hard("HC-12", "Class periods per day", Cat::Workload,
            "Class {0} would have {1} periods on {2} (max {3})"),
        Def::soft("SC-1", "Teacher dislikes slot", Cat::Availability, Prio::High,
            "Teacher {0} prefers not to teach on {1}, period {2}"),
        Def::soft("SC-2", "Class dislikes slot", Cat::Availability, Prio::High,
            "Class {0} should preferably not have lessons on {1}, period {2}"),
        Def::soft("SC-3", "Subject time preference", Cat::Time, Prio::Normal,
            "Subject {0} is preferably not taught on {1}, period {2}"),
        Def::soft("SC-4", "Room preference", Cat::Resource, Prio::Low,
            "Room {0} is preferably not used on {1}, period {2}"),
        Def::soft("SC-5", "Teacher lunch break", Cat::Time, Prio::Normal,
            "Teacher {0} has a lesson in the lunch window on {1}, period {2}"),
        Def::soft("SC-6", "Class lunch break", Cat::Time, Prio::Normal,
            "Class {0} has a lesson in the lunch window on {1}, period {2}"),
        Def::soft("SC-7", "Class schedule gap", Cat::Pedagogical, Prio::High,
            "Class {0} has a gap on {1} in period {2}"),
        Def::soft("SC-8", "Room type mismatch", Cat::Resource, Prio::High,
            "Lesson {0} requires a room of type {1} but is in {2}"),
        Def::soft("SC-9", "Preferred subject room", Cat::Resource, Prio::Low,
            "Subject {0} is preferably taught in room {1}"),
        Def::soft("SC-10", "Teacher minimum periods", Cat::Workload, Prio::Low,
            "Teacher {0} has only {1} periods on {2} (min {3})"),
        Def::soft("SC-11", "Class minimum periods", Cat::Workload, Prio::Low,
            "Class {0} has only {1} periods on {2} (min {3})"),
    ]
}

impl ConstraintCatalog {
    /// The 23 standard definitions with exemptions from `policy`.
    pub fn standard(policy: &ExemptionPolicy) -> Self {
        let definitions = standard_definitions()
            .into_iter()
            .map(|d| {
                let exempt = policy.exempt_for(&d.code);
                d.with_exempt(exempt)
            })
            .collect();
        Self::from_definitions(definitions)
    }

    /// Builds a catalog from explicit definitions. Later duplicates of a
    /// code replace earlier ones.
    pub fn from_definitions(definitions: Vec<Def>) -> Self {
        let mut catalog = Self {
            definitions: Vec::with_capacity(definitions.len()),
            index: HashMap::new(),
        };
        for d in definitions {
            catalog.insert(d);
        }
        catalog
    }

    fn insert(&mut self, definition: Def) {
        match self.index.get(&definition.code) {
            Some(&i) => self.definitions[i] = definition,
            None => {
                self.index
                    .insert(definition.code.clone(), self.definitions.len());
                self.definitions.push(definition);
            }
        }
    }

    /// Returns a catalog extended with `definition`.
    pub fn with_definition(mut self, definition: Def) -> Self {
        self.insert(definition);
        self
    }

    /// Hard constraints in catalog order.
    pub fn hard(&self) -> Vec<&Def> {
        self.of_type(ConstraintType::Hard)
    }

    /// Soft constraints in catalog order.
    pub fn soft(&self) -> Vec<&Def> {
        self.of_type(ConstraintType::Soft)
    }

    fn of_type(&self, t: ConstraintType) -> Vec<&Def> {
        self.definitions
            .iter()
            .filter(|d| d.constraint_type == t)
            .collect()
    }

    /// All constraints in catalog order.
    pub fn all(&self) -> &[Def] {
        &self.definitions
    }

    /// Case-insensitive lookup by code.
    pub fn by_code(&self, code: &str) -> Option<&Def> {
        self.index
            .get(code)
            .or_else(|| self.index.get(&code.trim().to_uppercase()))
            .map(|&i| &self.definitions[i])
    }

    pub fn by_category(&self, category: Cat) -> Vec<&Def> {
        self.definitions
            .iter()
            .filter(|d| d.category == category)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for ConstraintCatalog {
    fn default() -> Self {
        Self::standard(&ExemptionPolicy::default())
    }
}
