//! Sentinel-entity exemptions.
//!
//! Some synthetic entities are allowed to appear in several slots at once:
//! placeholder ("intern") teachers used for substitution reserve, "reserve"
//! classes that stand for "no lesson yet", team-teaching classes and shared
//! team rooms. Which names are sentinels, and which constraints each kind
//! is exempt from, is configuration. The catalog copies the resulting name
//! sets into every [`ConstraintDefinition`](super::ConstraintDefinition).

use serde::{Deserialize, Serialize};

use super::definition::ExemptEntities;

/// Sentinel names and the constraint codes each sentinel kind is exempt from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExemptionPolicy {
    /// Placeholder teacher names (first name or full name).
    pub intern_teachers: Vec<String>,
    /// Reserve class names.
    pub reserve_classes: Vec<String>,
    /// Team-teaching class names.
    pub team_classes: Vec<String>,
    /// Shared team room numbers.
    pub team_rooms: Vec<String>,
    /// Codes placeholder teachers are exempt from.
    pub intern_teacher_codes: Vec<String>,
    /// Codes reserve classes are exempt from.
    pub reserve_class_codes: Vec<String>,
    /// Codes team classes are exempt from.
    pub team_class_codes: Vec<String>,
    /// Codes team rooms are exempt from.
    pub team_room_codes: Vec<String>,
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for ExemptionPolicy {
    fn default() -> Self {
        Self {
            intern_teachers: vec!["xy".into()],
            reserve_classes: vec!["v-res".into()],
            team_classes: vec!["Team".into()],
            team_rooms: vec!["Teamraum".into()],
            intern_teacher_codes: codes(&[
                "HC-1", "HC-4", "HC-8", "HC-11", "SC-1", "SC-5", "SC-10",
            ]),
            reserve_class_codes: codes(&[
                "HC-2", "HC-5", "HC-9", "HC-12", "SC-2", "SC-6", "SC-7", "SC-11",
            ]),
            // SC-7 (gap check) stays reserve-only.
            team_class_codes: codes(&[
                "HC-2", "HC-5", "HC-9", "HC-12", "SC-2", "SC-6", "SC-11",
            ]),
            team_room_codes: codes(&["HC-3"]),
        }
    }
}

fn lowered(names: &[String]) -> impl Iterator<Item = String> + '_ {
    names
        .iter()
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty())
}

fn applies(codes: &[String], code: &str) -> bool {
    codes.iter().any(|c| c.eq_ignore_ascii_case(code))
}

impl ExemptionPolicy {
    /// A policy without sentinels.
    pub fn none() -> Self {
        Self {
            intern_teachers: Vec::new(),
            reserve_classes: Vec::new(),
            team_classes: Vec::new(),
            team_rooms: Vec::new(),
            ..Self::default()
        }
    }

    /// Exempt names for one constraint code.
    pub fn exempt_for(&self, code: &str) -> ExemptEntities {
        let mut exempt = ExemptEntities::default();
        if applies(&self.intern_teacher_codes, code) {
            exempt.teachers.extend(lowered(&self.intern_teachers));
        }
        if applies(&self.reserve_class_codes, code) {
            exempt.classes.extend(lowered(&self.reserve_classes));
        }
        if applies(&self.team_class_codes, code) {
            exempt.classes.extend(lowered(&self.team_classes));
        }
        if applies(&self.team_room_codes, code) {
            exempt.rooms.extend(lowered(&self.team_rooms));
        }
        exempt
    }

    /// Whether a class name is a reserve sentinel.
    pub fn is_reserve_class(&self, name: &str) -> bool {
        let name = name.trim();
        self.reserve_classes
            .iter()
            .any(|r| r.trim().eq_ignore_ascii_case(name))
    }

    /// Whether a teacher is a placeholder sentinel.
    pub fn is_intern_teacher(&self, first_name: &str, full_name: &str) -> bool {
        self.intern_teachers.iter().any(|n| {
            let n = n.trim();
            n.eq_ignore_ascii_case(first_name.trim()) || n.eq_ignore_ascii_case(full_name.trim())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_intern_scope() {
        let p = ExemptionPolicy::default();
        assert!(p.exempt_for("HC-1").teacher("XY", "XY"));
        assert!(p.exempt_for("HC-11").teacher("xy", "xy"));
        // Placeholder teachers still occupy rooms.
        assert!(!p.exempt_for("HC-3").teacher("xy", "xy"));
    }

    #[test]
    fn test_team_class_not_exempt_from_gap_check() {
        let p = ExemptionPolicy::default();
        assert!(p.exempt_for("SC-7").class("v-res"));
        assert!(!p.exempt_for("SC-7").class("Team"));
        assert!(p.exempt_for("HC-12").class("team"));
    }

    #[test]
    fn test_team_room_only_double_booking() {
        let p = ExemptionPolicy::default();
        assert!(p.exempt_for("HC-3").room("teamraum"));
        assert!(!p.exempt_for("HC-6").room("Teamraum"));
    }

    #[test]
    fn test_custom_sentinels() {
        let p = ExemptionPolicy {
            intern_teachers: vec!["N.N.".into()],
            ..ExemptionPolicy::default()
        };
        assert!(p.exempt_for("HC-1").teacher("n.n.", "n.n."));
        assert!(!p.exempt_for("HC-1").teacher("xy", "xy"));
        assert!(p.is_intern_teacher("N.N.", ""));
    }

    #[test]
    fn test_none_policy_is_empty() {
        let p = ExemptionPolicy::none();
        assert!(p.exempt_for("HC-1").is_empty());
        assert!(!p.is_reserve_class("v-res"));
    }
}
