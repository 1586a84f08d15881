//! Core entity structs for the Praxis rewards engine.
//!
//! All reward state is scoped to a single user except the read-only
//! achievement catalog and the per-day [`DailyChallenge`] record, which is
//! shared by every user that day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::enums::{AchievementCategory, AchievementTier, ActionKind, Difficulty};
use crate::ids::{
    ActivityEventId, AttemptId, ChallengeId, ExerciseId, ModuleId, UserId, XpTransactionId,
};

// ---------------------------------------------------------------------------
// Activity ledger
// ---------------------------------------------------------------------------

/// One immutable entry in the append-only activity ledger.
///
/// Entries are never updated or deleted once written; every points total
/// the engine reports is derived by filtering and summing these rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActivityEvent {
    /// Unique entry identifier.
    pub id: ActivityEventId,
    /// The learner who earned the points.
    pub user_id: UserId,
    /// The kind of activity.
    pub action_kind: ActionKind,
    /// Points awarded (always >= 0).
    pub points: u32,
    /// Related entity such as an exercise, lesson, or challenge ID.
    pub related_id: Option<Uuid>,
    /// When the activity occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Points sums over calendar windows relative to "now".
///
/// Windows use calendar semantics (ISO week starting Monday, first of the
/// month), not rolling 7/30-day lookbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PointsSummary {
    /// Points earned today.
    pub today: u64,
    /// Points earned since Monday of the current week.
    pub this_week: u64,
    /// Points earned since the first of the current month.
    pub this_month: u64,
    /// Points earned over all time.
    pub all_time: u64,
}

/// Outcome of a [`record_points`] call.
///
/// [`record_points`]: https://docs.rs/praxis-engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PointsOutcome {
    /// Whether the points were credited. `false` only for a duplicate
    /// daily-login within the same calendar day.
    pub earned: bool,
    /// Points credited (0 when `earned` is `false`).
    pub points: u32,
}

// ---------------------------------------------------------------------------
// XP and levels
// ---------------------------------------------------------------------------

/// Per-user experience state.
///
/// `level` is a pure, monotonic non-decreasing function of `total_xp`;
/// `xp_to_next_level` is always consistent with the level curve applied to
/// `total_xp`. Neither value ever decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct XpState {
    /// The learner this state belongs to.
    pub user_id: UserId,
    /// Cumulative experience points.
    pub total_xp: u64,
    /// Current level (starts at 1).
    pub level: u32,
    /// XP remaining until the next level.
    pub xp_to_next_level: u64,
}

/// Immutable audit row recorded for every XP grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct XpTransaction {
    /// Unique transaction identifier.
    pub id: XpTransactionId,
    /// The learner who received the XP.
    pub user_id: UserId,
    /// Amount granted (always >= 0).
    pub amount: u64,
    /// Human-readable reason (e.g. `"lesson_completed"`).
    pub reason: String,
    /// Related entity such as a lesson or challenge ID.
    pub related_id: Option<Uuid>,
    /// When the grant was recorded.
    pub created_at: DateTime<Utc>,
}

/// Result of an XP grant: the new state plus any levels gained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct XpAward {
    /// The learner's state after the grant.
    pub state: XpState,
    /// Every level newly reached by this grant, in ascending order.
    /// Empty when no threshold was crossed; longer than one element when a
    /// single large grant spans multiple levels.
    pub levels_gained: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Streaks
// ---------------------------------------------------------------------------

/// Per-user consecutive-day activity state.
///
/// Invariant: `longest_streak >= current_streak` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StreakState {
    /// The learner this streak belongs to.
    pub user_id: UserId,
    /// Length of the current run of consecutive active days.
    pub current_streak: u32,
    /// High-water mark over all runs.
    pub longest_streak: u32,
    /// Calendar day of the most recent counted activity.
    pub last_activity_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

/// A catalog achievement definition (read-only at runtime).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AchievementDefinition {
    /// Unique catalog key (e.g. `"lesson_learner"`).
    pub key: String,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Category determining which counter is evaluated.
    pub category: AchievementCategory,
    /// Counter value required for the bronze tier.
    pub base_requirement: u64,
    /// Whether the achievement has four progressive tiers. Untiered
    /// achievements are either locked or unlocked at bronze.
    pub has_levels: bool,
    /// Stable ordering for catalog listings.
    pub order: u32,
}

/// A per-user achievement unlock record.
///
/// Created on first bronze crossing; the `tier` field is only ever mutated
/// upward and the row is never created twice for the same (user, key) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserAchievement {
    /// The learner who unlocked the achievement.
    pub user_id: UserId,
    /// Catalog key of the definition.
    pub key: String,
    /// Highest tier reached so far.
    pub tier: AchievementTier,
    /// When the achievement was first unlocked.
    pub unlocked_at: DateTime<Utc>,
}

/// A definition annotated with the user's unlock status, as returned by
/// the user-achievements listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AchievementStatus {
    /// The catalog definition.
    pub definition: AchievementDefinition,
    /// Whether the user's counter meets the base requirement.
    pub unlocked: bool,
    /// Highest tier met, present only when unlocked and tiered.
    pub tier: Option<AchievementTier>,
    /// When the achievement was first unlocked, if a record exists.
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// A newly unlocked or newly upgraded achievement, returned for
/// notification purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AchievementDelta {
    /// Catalog key of the definition.
    pub key: String,
    /// Display title, carried along so callers can notify without a
    /// second catalog lookup.
    pub title: String,
    /// The tier now held.
    pub tier: AchievementTier,
    /// `true` for a first unlock, `false` for a tier upgrade.
    pub first_unlock: bool,
}

/// Source-of-truth counters an achievement evaluation runs against.
///
/// Recomputed from the raw completion and streak tables on every
/// evaluation; never cached or denormalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserCounters {
    /// Distinct lessons completed.
    pub lessons_completed: u64,
    /// Exercises answered correctly.
    pub exercises_correct: u64,
    /// Longest consecutive-day activity streak.
    pub longest_streak: u64,
    /// Modules completed in full.
    pub modules_completed: u64,
}

// ---------------------------------------------------------------------------
// Exercise catalog and completions
// ---------------------------------------------------------------------------

/// A catalog exercise as seen by the rewards engine.
///
/// The full exercise content lives in the catalog service; the engine only
/// needs difficulty, the correct answer, and module membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Exercise {
    /// Unique exercise identifier.
    pub id: ExerciseId,
    /// The module this exercise belongs to, if any.
    pub module_id: Option<ModuleId>,
    /// Question prompt shown to the learner.
    pub prompt: String,
    /// The correct answer, compared after whitespace trimming.
    pub correct_answer: String,
    /// Difficulty rating determining base points.
    pub difficulty: Difficulty,
}

/// Generalized completion record for catalog and ad hoc exercises.
///
/// Read by the module completion detector and the achievement engine to
/// compute counters. Once recorded correct, stays correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ExerciseCompletion {
    /// The learner who completed the exercise.
    pub user_id: UserId,
    /// The exercise completed.
    pub exercise_id: ExerciseId,
    /// Whether the best recorded attempt was correct.
    pub is_correct: bool,
    /// Points credited for the completion.
    pub points: u32,
    /// When the completion was last updated.
    pub completed_at: DateTime<Utc>,
}

/// Outcome of a module completion check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ModuleCompletionOutcome {
    /// Whether every exercise in the module is now complete.
    pub completed: bool,
    /// Whether the one-time completion bonus was awarded by this call.
    pub bonus_awarded: bool,
}

// ---------------------------------------------------------------------------
// Daily challenge
// ---------------------------------------------------------------------------

/// The shared daily challenge record, one per calendar day.
///
/// Generation is idempotent: regenerating for the same date returns the
/// existing record unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DailyChallenge {
    /// Unique challenge identifier.
    pub id: ChallengeId,
    /// The calendar day this challenge belongs to (unique).
    pub challenge_date: NaiveDate,
    /// The selected exercises, in selection order. Always exactly 3.
    pub exercise_ids: Vec<ExerciseId>,
}

/// One attempt at a daily challenge exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DailyChallengeAttempt {
    /// Unique attempt identifier.
    pub id: AttemptId,
    /// The learner who submitted the answer.
    pub user_id: UserId,
    /// The challenge attempted.
    pub challenge_id: ChallengeId,
    /// The exercise answered.
    pub exercise_id: ExerciseId,
    /// Whether the submitted answer was correct.
    pub is_correct: bool,
    /// Points earned: double the exercise's base points when correct, 0
    /// otherwise.
    pub points_earned: u32,
    /// When the attempt was recorded.
    pub created_at: DateTime<Utc>,
}

/// Outcome of a daily challenge answer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChallengeOutcome {
    /// Whether the submitted answer was correct.
    pub is_correct: bool,
    /// Points earned by this submission (0 for incorrect or duplicate).
    pub points_earned: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_event_roundtrip() {
        let event = ActivityEvent {
            id: ActivityEventId::new(),
            user_id: UserId::new(),
            action_kind: ActionKind::LessonCompleted,
            points: 10,
            related_id: Some(Uuid::now_v7()),
            occurred_at: Utc::now(),
        };
        let json = serde_json::to_string(&event).ok();
        assert!(json.is_some());
        let restored: Result<ActivityEvent, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok().as_ref(), Some(&event));
    }

    #[test]
    fn counters_default_to_zero() {
        let counters = UserCounters::default();
        assert_eq!(counters.lessons_completed, 0);
        assert_eq!(counters.exercises_correct, 0);
        assert_eq!(counters.longest_streak, 0);
        assert_eq!(counters.modules_completed, 0);
    }
}
