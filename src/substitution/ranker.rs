//! Substitute ranking.
//!
//! Candidates pass through two stages. Hard preconditions exclude a teacher
//! outright (absent, blocked, teaching elsewhere, over the weekly cap);
//! everyone left is scored additively and sorted.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{Absence, Substitution, SubstitutionConfig};
use crate::config::EngineConfig;
use crate::constraints::ExemptionPolicy;
use crate::error::{TimetableError, TimetableResult};
use crate::models::{Lesson, LessonId, ScheduledLesson, SchoolData, Teacher, TeacherId};

const CO_TEACHER_BONUS: i64 = 250;
const RESERVE_DUTY_BONUS: i64 = 200;
const QUALIFIED_BONUS: i64 = 100;
const NOTES_BONUS: i64 = 50;
const DEPARTMENT_BONUS: i64 = 50;
const WORKLOAD_BONUS: i64 = 40;
const WORKLOAD_STEP: i64 = 4;
const AVAILABLE_BONUS: i64 = 30;
const EXPERIENCE_STEP: i64 = 5;
const EXPERIENCE_CAP: i64 = 20;

/// A scored substitute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub teacher_id: TeacherId,
    pub name: String,
    pub score: i64,
    /// One line per contributing signal.
    pub reasons: Vec<String>,
    pub is_co_teacher: bool,
    pub on_reserve_duty: bool,
    pub qualified: bool,
    /// Substitutions already taken this week.
    pub weekly_substitutions: u32,
}

/// Why a teacher was not considered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    Inactive,
    Placeholder,
    Absent,
    Unavailable,
    TeachingElsewhere(LessonId),
    AlreadySubstituting,
    WeeklyCapReached { max: u32 },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::Inactive => write!(f, "inactive"),
            ExclusionReason::Placeholder => write!(f, "placeholder teacher"),
            ExclusionReason::Absent => write!(f, "absent at this time"),
            ExclusionReason::Unavailable => write!(f, "blocked at this time"),
            ExclusionReason::TeachingElsewhere(id) => write!(f, "teaching lesson {id} at this time"),
            ExclusionReason::AlreadySubstituting => write!(f, "already substituting at this time"),
            ExclusionReason::WeeklyCapReached { max } => {
                write!(f, "reached {max} substitutions this week")
            }
        }
    }
}

/// A teacher removed before scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedCandidate {
    pub teacher_id: TeacherId,
    pub reason: ExclusionReason,
}

/// Candidates for one slot, best first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    pub candidates: Vec<RankedCandidate>,
    pub excluded: Vec<ExcludedCandidate>,
}

impl Ranking {
    pub fn best(&self) -> Option<&RankedCandidate> {
        self.candidates.first()
    }

    pub fn is_excluded(&self, teacher_id: TeacherId) -> bool {
        self.excluded.iter().any(|e| e.teacher_id == teacher_id)
    }
}

/// Ranks substitutes for lessons of absent teachers.
///
/// # Examples
///
/// ```
/// use u_timetable::models::{Lesson, ScheduledLesson, SchoolData, Teacher, Weekday, Period};
/// use u_timetable::substitution::{Absence, SubstituteRanker};
///
/// let data = SchoolData::new()
///     .with_teacher(Teacher::new(1, "Ada", "Absent"))
///     .with_teacher(Teacher::new(2, "Bo", "Co"))
///     .with_period(Period::new(1, 1))
///     .with_lesson(Lesson::new(7).with_teacher(1).with_teacher(2));
/// let schedule = vec![ScheduledLesson::candidate(7, 1, Weekday::Monday, 1).with_id(1)];
/// let absences = vec![Absence::new(1, 1, 1, Weekday::Monday)];
///
/// let ranker = SubstituteRanker::new(&data, &schedule).with_absences(&absences);
/// let ranking = ranker.rank(&absences[0], &schedule[0]).unwrap();
/// assert_eq!(ranking.best().unwrap().teacher_id, 2);
/// ```
#[derive(Debug, Clone)]
pub struct SubstituteRanker<'a> {
    data: &'a SchoolData,
    schedule: &'a [ScheduledLesson],
    absences: &'a [Absence],
    history: &'a [Substitution],
    policy: ExemptionPolicy,
    config: SubstitutionConfig,
}

impl<'a> SubstituteRanker<'a> {
    /// Creates a ranker over the current placements.
    pub fn new(data: &'a SchoolData, schedule: &'a [ScheduledLesson]) -> Self {
        Self {
            data,
            schedule,
            absences: &[],
            history: &[],
            policy: ExemptionPolicy::default(),
            config: SubstitutionConfig::default(),
        }
    }

    /// All recorded absences, used to skip absent candidates.
    pub fn with_absences(mut self, absences: &'a [Absence]) -> Self {
        self.absences = absences;
        self
    }

    /// Past and current substitutions.
    pub fn with_history(mut self, history: &'a [Substitution]) -> Self {
        self.history = history;
        self
    }

    /// Takes sentinel names and the auto-assign threshold from the config.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.policy = config.exemptions.clone();
        self.config = config.substitution.clone();
        self
    }

    pub fn with_substitution_config(mut self, config: SubstitutionConfig) -> Self {
        self.config = config;
        self
    }

    /// Ranks every active teacher for covering `slot` during `absence`.
    pub fn rank(&self, absence: &Absence, slot: &ScheduledLesson) -> TimetableResult<Ranking> {
        let lesson = self
            .data
            .lesson(slot.lesson_id)
            .ok_or(TimetableError::LessonNotFound(slot.lesson_id))?;
        if !absence.covers(slot.week_number, slot.day, slot.period_id) {
            warn!(
                event = "absence_mismatch",
                absence = absence.id,
                lesson = lesson.id,
                day = %slot.day,
                period = slot.period_id
            );
        }
        let absent_teacher = self.data.teacher(absence.teacher_id);

        let mut ranking = Ranking::default();
        for teacher in self.data.teachers() {
            if teacher.id == absence.teacher_id {
                continue;
            }
            match self.exclusion(teacher, lesson, absence, slot) {
                Some(reason) => {
                    debug!(event = "candidate_excluded", teacher = teacher.id, reason = %reason);
                    ranking.excluded.push(ExcludedCandidate {
                        teacher_id: teacher.id,
                        reason,
                    });
                }
                None => ranking
                    .candidates
                    .push(self.score(teacher, lesson, absent_teacher, slot)),
            }
        }

        ranking.candidates.sort_by(compare);
        info!(
            event = "substitutes_ranked",
            lesson = lesson.id,
            absent = absence.teacher_id,
            candidates = ranking.candidates.len(),
            excluded = ranking.excluded.len(),
            best = ranking.best().map(|c| c.score)
        );
        Ok(ranking)
    }

    /// Ranks and assigns the top candidate when it meets the threshold.
    ///
    /// Returns `None` when the slot stays uncovered.
    pub fn auto_assign(
        &self,
        absence: &Absence,
        slot: &ScheduledLesson,
    ) -> TimetableResult<Option<Substitution>> {
        let ranking = self.rank(absence, slot)?;
        let threshold = self.config.min_auto_assign_score;
        match ranking.best() {
            Some(best) if best.score >= threshold => {
                info!(
                    event = "substitute_assigned",
                    lesson = slot.lesson_id,
                    teacher = best.teacher_id,
                    score = best.score
                );
                Ok(Some(Substitution {
                    id: None,
                    absence_id: absence.id,
                    scheduled_lesson_id: slot.id,
                    lesson_id: slot.lesson_id,
                    substitute_teacher_id: best.teacher_id,
                    week_number: slot.week_number,
                    day: slot.day,
                    period_id: slot.period_id,
                    score: best.score,
                }))
            }
            best => {
                warn!(
                    event = "slot_uncovered",
                    lesson = slot.lesson_id,
                    day = %slot.day,
                    period = slot.period_id,
                    best = best.map(|c| c.score),
                    threshold
                );
                Ok(None)
            }
        }
    }

    fn exclusion(
        &self,
        teacher: &Teacher,
        lesson: &Lesson,
        absence: &Absence,
        slot: &ScheduledLesson,
    ) -> Option<ExclusionReason> {
        if !teacher.is_active {
            return Some(ExclusionReason::Inactive);
        }
        if self
            .policy
            .is_intern_teacher(&teacher.first_name, &teacher.full_name())
        {
            return Some(ExclusionReason::Placeholder);
        }
        let (week, day, period) = (slot.week_number, slot.day, slot.period_id);
        if self
            .absences
            .iter()
            .any(|a| a.teacher_id == teacher.id && a.covers(week, day, period))
        {
            return Some(ExclusionReason::Absent);
        }
        if self.data.availability.teachers.is_blocked(teacher.id, day, period) {
            return Some(ExclusionReason::Unavailable);
        }
        if let Some(other) = self.regular_lesson_at(teacher.id, lesson.id, slot) {
            return Some(ExclusionReason::TeachingElsewhere(other));
        }
        if self
            .history
            .iter()
            .any(|s| s.absence_id != absence.id && s.occupies(teacher.id, week, day, period))
        {
            return Some(ExclusionReason::AlreadySubstituting);
        }
        if let Some(max) = teacher.max_substitutions_per_week {
            if self.weekly_load(teacher.id, week) >= max && !lesson.has_teacher(teacher.id) {
                return Some(ExclusionReason::WeeklyCapReached { max });
            }
        }
        None
    }

    fn score(
        &self,
        teacher: &Teacher,
        lesson: &Lesson,
        absent: Option<&Teacher>,
        slot: &ScheduledLesson,
    ) -> RankedCandidate {
        let mut score = 0;
        let mut reasons = Vec::new();
        let mut add = |points: i64, reason: String| {
            score += points;
            reasons.push(format!("+{points} {reason}"));
        };

        let is_co_teacher = lesson.has_teacher(teacher.id);
        if is_co_teacher {
            add(CO_TEACHER_BONUS, "co-teacher of this lesson".into());
        }
        let on_reserve_duty = self.on_reserve_duty(teacher.id, slot);
        if on_reserve_duty {
            add(RESERVE_DUTY_BONUS, "on reserve duty".into());
        }
        let qualified = teacher.is_qualified_for(&lesson.subject_ids);
        if qualified {
            add(QUALIFIED_BONUS, "qualified for the subject".into());
        } else if teacher.has_qualification_notes() {
            add(NOTES_BONUS, "qualification notes on file".into());
        }
        if absent.is_some_and(|a| teacher.same_department(a)) {
            add(DEPARTMENT_BONUS, "same department".into());
        }
        let weekly_substitutions = self.weekly_load(teacher.id, slot.week_number);
        let workload = (WORKLOAD_BONUS - WORKLOAD_STEP * i64::from(weekly_substitutions)).max(0);
        if workload > 0 {
            add(workload, format!("{weekly_substitutions} substitutions this week"));
        }
        add(AVAILABLE_BONUS, "available".into());
        let prior = self.prior_in_subject(teacher.id, lesson);
        if prior > 0 {
            let points = (EXPERIENCE_STEP * prior as i64).min(EXPERIENCE_CAP);
            add(points, format!("{prior} earlier substitutions in the subject"));
        }

        RankedCandidate {
            teacher_id: teacher.id,
            name: teacher.full_name(),
            score,
            reasons,
            is_co_teacher,
            on_reserve_duty,
            qualified,
            weekly_substitutions,
        }
    }

    fn at_slot<'s>(
        &'s self,
        slot: &'s ScheduledLesson,
    ) -> impl Iterator<Item = (&'a ScheduledLesson, &'a Lesson)> + 's {
        let data = self.data;
        self.schedule
            .iter()
            .filter(move |s| s.week_number == slot.week_number && s.same_slot(slot))
            .filter_map(move |s| data.lesson(s.lesson_id).map(|l| (s, l)))
    }

    fn is_reserve_lesson(&self, lesson: &Lesson) -> bool {
        !lesson.class_ids.is_empty()
            && lesson.class_ids.iter().all(|id| {
                self.data
                    .class(*id)
                    .is_some_and(|c| self.policy.is_reserve_class(&c.name))
            })
    }

    /// A non-reserve lesson other than the covered one that `teacher_id`
    /// teaches at the slot.
    fn regular_lesson_at(
        &self,
        teacher_id: TeacherId,
        covered: LessonId,
        slot: &ScheduledLesson,
    ) -> Option<LessonId> {
        self.at_slot(slot)
            .filter(|(_, l)| l.id != covered && l.has_teacher(teacher_id))
            .find(|(_, l)| !self.is_reserve_lesson(l))
            .map(|(_, l)| l.id)
    }

    fn on_reserve_duty(&self, teacher_id: TeacherId, slot: &ScheduledLesson) -> bool {
        self.at_slot(slot)
            .any(|(_, l)| l.has_teacher(teacher_id) && self.is_reserve_lesson(l))
    }

    fn weekly_load(&self, teacher_id: TeacherId, week_number: u32) -> u32 {
        self.history
            .iter()
            .filter(|s| s.substitute_teacher_id == teacher_id && s.week_number == week_number)
            .count() as u32
    }

    fn prior_in_subject(&self, teacher_id: TeacherId, lesson: &Lesson) -> usize {
        self.history
            .iter()
            .filter(|s| s.substitute_teacher_id == teacher_id)
            .filter_map(|s| self.data.lesson(s.lesson_id))
            .filter(|l| l.subject_ids.iter().any(|id| lesson.has_subject(*id)))
            .count()
    }
}

/// Score descending, then workload ascending, then qualified first.
fn compare(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(a.weekly_substitutions.cmp(&b.weekly_substitutions))
        .then(b.qualified.cmp(&a.qualified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, BROWN, ENG_1A, ENG_1B, JONES, MATH_1A, MATH_1B, PLACEHOLDER, SMITH};
    use crate::models::{PeriodId, Weekday};

    fn slot(schedule: &[ScheduledLesson], lesson: LessonId, period: PeriodId) -> ScheduledLesson {
        schedule
            .iter()
            .find(|s| s.lesson_id == lesson && s.period_id == period)
            .cloned()
            .unwrap()
    }

    fn sub(absence_id: u32, teacher: TeacherId, lesson: LessonId, week: u32, period: PeriodId) -> Substitution {
        Substitution {
            id: None,
            absence_id,
            scheduled_lesson_id: None,
            lesson_id: lesson,
            substitute_teacher_id: teacher,
            week_number: week,
            day: Weekday::Wednesday,
            period_id: period,
            score: 0,
        }
    }

    #[test]
    fn test_co_teacher_ranks_first() {
        let data = fixtures::school();
        let schedule = fixtures::busy_monday();
        let absences = vec![Absence::new(1, BROWN, 1, Weekday::Monday)];
        let ranking = SubstituteRanker::new(&data, &schedule)
            .with_absences(&absences)
            .rank(&absences[0], &slot(&schedule, ENG_1B, 3))
            .unwrap();

        let best = ranking.best().unwrap();
        assert_eq!(best.teacher_id, JONES);
        assert!(best.is_co_teacher);
        assert!(best.score >= 250);
        // co-teacher + qualified + workload + available
        assert_eq!(best.score, 250 + 100 + 40 + 30);

        let smith = &ranking.candidates[1];
        assert_eq!(smith.teacher_id, SMITH);
        // same department + workload + available
        assert_eq!(smith.score, 50 + 40 + 30);
        assert!(ranking.is_excluded(PLACEHOLDER));
        assert!(ranking.candidates.iter().all(|c| c.teacher_id != BROWN));
    }

    #[test]
    fn test_reserve_duty_bonus() {
        let data = fixtures::school();
        let mut schedule = fixtures::busy_monday();
        schedule.push(
            ScheduledLesson::candidate(MATH_1B, fixtures::TT, Weekday::Monday, 5)
                .with_id(7)
                .with_room(fixtures::ROOM_A),
        );
        let absences = vec![Absence::new(1, SMITH, 1, Weekday::Monday)];
        let ranking = SubstituteRanker::new(&data, &schedule)
            .with_absences(&absences)
            .rank(&absences[0], &slot(&schedule, MATH_1B, 5))
            .unwrap();

        let best = ranking.best().unwrap();
        assert_eq!(best.teacher_id, BROWN);
        assert!(best.on_reserve_duty);
        assert_eq!(best.score, 200 + 50 + 40 + 30);
        assert_eq!(ranking.candidates[1].teacher_id, JONES);
        assert_eq!(ranking.candidates[1].score, 70);
    }

    #[test]
    fn test_reserve_teacher_already_covering_is_excluded() {
        let data = fixtures::school();
        let mut schedule = fixtures::busy_monday();
        schedule.push(ScheduledLesson::candidate(MATH_1B, fixtures::TT, Weekday::Monday, 5).with_id(7));
        let absences = vec![Absence::new(1, SMITH, 1, Weekday::Monday)];
        let mut other = sub(99, BROWN, ENG_1A, 1, 5);
        other.day = Weekday::Monday;
        let history = vec![other];

        let ranking = SubstituteRanker::new(&data, &schedule)
            .with_absences(&absences)
            .with_history(&history)
            .rank(&absences[0], &slot(&schedule, MATH_1B, 5))
            .unwrap();
        let brown = ranking.excluded.iter().find(|e| e.teacher_id == BROWN).unwrap();
        assert_eq!(brown.reason, ExclusionReason::AlreadySubstituting);
    }

    #[test]
    fn test_busy_blocked_and_absent_teachers_excluded() {
        let data = fixtures::school();
        let schedule = fixtures::busy_monday();
        let absences = vec![
            Absence::new(1, SMITH, 1, Weekday::Monday),
            Absence::new(2, JONES, 1, Weekday::Monday).with_periods(vec![2]),
        ];
        let ranking = SubstituteRanker::new(&data, &schedule)
            .with_absences(&absences)
            .rank(&absences[0], &slot(&schedule, MATH_1B, 2))
            .unwrap();
        assert!(ranking.candidates.is_empty());
        let reason = |t| {
            ranking
                .excluded
                .iter()
                .find(|e| e.teacher_id == t)
                .map(|e| e.reason.clone())
        };
        assert_eq!(reason(BROWN), Some(ExclusionReason::TeachingElsewhere(ENG_1A)));
        assert_eq!(reason(JONES), Some(ExclusionReason::Absent));
        assert_eq!(reason(PLACEHOLDER), Some(ExclusionReason::Placeholder));

        let tuesday = ScheduledLesson::candidate(MATH_1A, fixtures::TT, Weekday::Tuesday, 1);
        let absence = Absence::new(3, SMITH, 1, Weekday::Tuesday);
        let ranking = SubstituteRanker::new(&data, &schedule)
            .rank(&absence, &tuesday)
            .unwrap();
        let jones = ranking.excluded.iter().find(|e| e.teacher_id == JONES).unwrap();
        assert_eq!(jones.reason, ExclusionReason::Unavailable);
        assert_eq!(jones.reason.to_string(), "blocked at this time");
    }

    #[test]
    fn test_weekly_cap_spares_co_teachers() {
        let data = fixtures::school();
        let schedule = fixtures::busy_monday();
        let history: Vec<_> = (1..=3).map(|p| sub(50 + p, BROWN, MATH_1A, 1, p)).collect();

        // Brown is at the cap of three, but co-teaches the English lesson.
        let absences = vec![Absence::new(1, JONES, 1, Weekday::Monday)];
        let ranking = SubstituteRanker::new(&data, &schedule)
            .with_absences(&absences)
            .with_history(&history)
            .rank(&absences[0], &slot(&schedule, ENG_1B, 3))
            .unwrap();
        let brown = ranking.best().unwrap();
        assert_eq!(brown.teacher_id, BROWN);
        assert_eq!(brown.weekly_substitutions, 3);
        assert_eq!(brown.score, 250 + 100 + 28 + 30);

        // Not a co-teacher: excluded.
        let absences = vec![Absence::new(2, SMITH, 1, Weekday::Monday)];
        let ranking = SubstituteRanker::new(&data, &schedule)
            .with_absences(&absences)
            .with_history(&history)
            .rank(&absences[0], &slot(&schedule, MATH_1A, 1))
            .unwrap();
        let excluded = ranking.excluded.iter().find(|e| e.teacher_id == BROWN).unwrap();
        assert_eq!(excluded.reason, ExclusionReason::WeeklyCapReached { max: 3 });
    }

    #[test]
    fn test_experience_is_capped() {
        let data = fixtures::school();
        let schedule = fixtures::busy_monday();
        // Six earlier English covers in past weeks.
        let history: Vec<_> = (1..=6).map(|w| sub(w, SMITH, ENG_1A, w, 1)).collect();
        let absences = vec![Absence::new(10, BROWN, 9, Weekday::Monday)];
        let target = ScheduledLesson::candidate(ENG_1A, fixtures::TT, Weekday::Monday, 6).with_week(9);

        let ranking = SubstituteRanker::new(&data, &schedule)
            .with_absences(&absences)
            .with_history(&history)
            .rank(&absences[0], &target)
            .unwrap();
        let smith = ranking.candidates.iter().find(|c| c.teacher_id == SMITH).unwrap();
        assert_eq!(smith.score, 50 + 40 + 30 + 20);
    }

    #[test]
    fn test_auto_assign_threshold() {
        fixtures::init_tracing();
        let data = fixtures::school();
        let schedule = fixtures::busy_monday();
        let absences = vec![Absence::new(1, SMITH, 1, Weekday::Monday)];
        let ranker = SubstituteRanker::new(&data, &schedule).with_absences(&absences);

        // Brown: department + workload + available = 120.
        let assigned = ranker
            .auto_assign(&absences[0], &slot(&schedule, MATH_1A, 1))
            .unwrap()
            .unwrap();
        assert_eq!(assigned.substitute_teacher_id, BROWN);
        assert_eq!(assigned.scheduled_lesson_id, Some(1));
        assert_eq!(assigned.score, 120);

        // Jones alone scores 70.
        assert_eq!(
            ranker.auto_assign(&absences[0], &slot(&schedule, MATH_1B, 2)).unwrap(),
            None
        );

        let strict = ranker.with_substitution_config(SubstitutionConfig {
            min_auto_assign_score: 500,
        });
        assert_eq!(
            strict.auto_assign(&absences[0], &slot(&schedule, MATH_1A, 1)).unwrap(),
            None
        );
    }

    #[test]
    fn test_unknown_lesson_is_an_error() {
        let data = fixtures::school();
        let absence = Absence::new(1, SMITH, 1, Weekday::Monday);
        let ghost = ScheduledLesson::candidate(999, fixtures::TT, Weekday::Monday, 1);
        let result = SubstituteRanker::new(&data, &[]).rank(&absence, &ghost);
        assert!(matches!(result, Err(TimetableError::LessonNotFound(999))));
    }

    #[test]
    fn test_ties_prefer_lighter_load() {
        let light = RankedCandidate {
            teacher_id: 1,
            name: String::new(),
            score: 100,
            reasons: Vec::new(),
            is_co_teacher: false,
            on_reserve_duty: false,
            qualified: false,
            weekly_substitutions: 0,
        };
        let heavy = RankedCandidate {
            teacher_id: 2,
            weekly_substitutions: 2,
            qualified: true,
            ..light.clone()
        };
        let mut list = vec![heavy.clone(), light.clone()];
        list.sort_by(compare);
        assert_eq!(list[0].teacher_id, 1);

        let qualified = RankedCandidate {
            teacher_id: 3,
            qualified: true,
            ..light.clone()
        };
        let mut list = vec![light, qualified];
        list.sort_by(compare);
        assert_eq!(list[0].teacher_id, 3);
    }
}
