//! Constraint registry and validator.
//!
//! The catalog ([`ConstraintCatalog`]) is pure metadata: codes, names,
//! message templates, exemptions and priorities. Behavior lives in the
//! [`rules`] table. [`ConstraintValidator`] joins the two and checks
//! candidate placements.
//!
//! # Usage
//!
//! ```
//! use u_timetable::constraints::{ConstraintCatalog, ConstraintCategory};
//!
//! let catalog = ConstraintCatalog::default();
//! assert_eq!(catalog.hard().len(), 12);
//! assert_eq!(catalog.soft().len(), 11);
//! assert_eq!(catalog.by_category(ConstraintCategory::Conflict).len(), 4);
//! ```

mod catalog;
mod context;
mod definition;
mod exemptions;
mod result;
pub mod rules;
mod validator;

pub use catalog::ConstraintCatalog;
pub use context::ValidationContext;
pub use definition::{
    format_template, ConstraintCategory, ConstraintDefinition, ConstraintPriority,
    ConstraintType, ExemptEntities, UNMAPPED_PENALTY,
};
pub use exemptions::ExemptionPolicy;
pub use result::{
    details, ConstraintResult, ConstraintViolation, DetailValue, Details, PlacementValidation,
    RuleVerdict, TimetableValidationResult, ValidationResult,
};
pub use rules::{ConstraintRule, RuleInput, RuleSet};
pub use validator::{ConstraintValidator, DEFAULT_LUNCH_PERIODS};
