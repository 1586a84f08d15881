//! Storage abstraction for reward state.
//!
//! The service layer talks to two traits: [`RewardsStore`] for all
//! engine-owned state and [`Catalog`] for the read-only exercise and
//! module catalog the application maintains elsewhere.
//!
//! Check-then-act sections (daily-login dedup, challenge creation,
//! achievement unlock, module bonus) are expressed as `try_*` operations
//! whose atomicity is the implementation's responsibility: the Postgres
//! store backs them with unique constraints plus `ON CONFLICT`, the
//! in-memory store holds one write lock across the check and the write.
//! A lost race surfaces as [`InsertOutcome::AlreadyExists`], never as an
//! error, so the service can recover idempotently.
//!
//! XP grants and streak touches are read-modify-writes, so they are
//! likewise single `apply_*` operations: the load, the pure transition
//! ([`crate::xp::apply_grant`], [`crate::streak::advance`]), and the
//! write all happen under one guard. Two concurrent grants for the same
//! user serialize instead of both writing from the same stale read.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use praxis_types::{
    AchievementTier, ActivityEvent, ChallengeId, DailyChallenge, DailyChallengeAttempt, Exercise,
    ExerciseCompletion, ExerciseId, ModuleId, PointsSummary, StreakState, UserAchievement,
    UserCounters, UserId, XpState, XpTransaction,
};

use crate::error::EngineError;

/// Result of a guarded insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was written by this call.
    Inserted,
    /// An equivalent row already existed; nothing was written.
    AlreadyExists,
}

/// Result of a guarded challenge-attempt insert.
///
/// A duplicate returns the previously stored attempt so the caller can
/// report the original outcome without granting anything further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptInsert {
    /// The attempt was recorded by this call.
    Inserted,
    /// The user already attempted this exercise in this challenge.
    Duplicate(DailyChallengeAttempt),
}

/// Persistence operations for all engine-owned reward state.
#[async_trait]
pub trait RewardsStore: Send + Sync {
    // -----------------------------------------------------------------
    // Activity ledger
    // -----------------------------------------------------------------

    /// Append one immutable ledger entry.
    async fn append_event(&self, event: ActivityEvent) -> Result<(), EngineError>;

    /// Append a daily-login entry unless one already exists for the user
    /// on `day`. Check and write are atomic.
    async fn try_append_daily_login(
        &self,
        event: ActivityEvent,
        day: NaiveDate,
    ) -> Result<InsertOutcome, EngineError>;

    /// Sum the user's ledger entries into calendar windows anchored at
    /// `today`.
    async fn points_summary(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<PointsSummary, EngineError>;

    // -----------------------------------------------------------------
    // XP
    // -----------------------------------------------------------------

    /// Fetch the user's XP state, if any grants were recorded.
    async fn xp_state(&self, user_id: UserId) -> Result<Option<XpState>, EngineError>;

    /// Atomically grant XP: load (or initialize) the state, apply
    /// [`crate::xp::apply_grant`], and persist, all under one guard.
    /// Returns the new state and the levels newly reached.
    async fn apply_xp_grant(
        &self,
        user_id: UserId,
        amount: u64,
    ) -> Result<(XpState, Vec<u32>), EngineError>;

    /// Append one immutable XP audit row.
    async fn append_xp_transaction(&self, tx: XpTransaction) -> Result<(), EngineError>;

    // -----------------------------------------------------------------
    // Streaks
    // -----------------------------------------------------------------

    /// Fetch the user's streak state, if any activity was recorded.
    async fn streak_state(&self, user_id: UserId) -> Result<Option<StreakState>, EngineError>;

    /// Atomically apply an activity day to the user's streak via
    /// [`crate::streak::advance`], load and write under one guard.
    async fn apply_streak_touch(
        &self,
        user_id: UserId,
        day: NaiveDate,
    ) -> Result<StreakState, EngineError>;

    // -----------------------------------------------------------------
    // Achievements
    // -----------------------------------------------------------------

    /// Fetch all of the user's unlock records.
    async fn user_achievements(&self, user_id: UserId)
        -> Result<Vec<UserAchievement>, EngineError>;

    /// Insert an unlock record unless one exists for (user, key). Check
    /// and write are atomic.
    async fn try_insert_achievement(
        &self,
        record: UserAchievement,
    ) -> Result<InsertOutcome, EngineError>;

    /// Raise the stored tier for (user, key) to `tier`. The write is
    /// monotonic: a stored tier at or above `tier` is left untouched.
    async fn upgrade_achievement_tier(
        &self,
        user_id: UserId,
        key: &str,
        tier: AchievementTier,
    ) -> Result<(), EngineError>;

    /// Recompute the user's counters from the source-of-truth tables
    /// (ledger, completions, streak state, module markers).
    async fn user_counters(&self, user_id: UserId) -> Result<UserCounters, EngineError>;

    // -----------------------------------------------------------------
    // Exercise completions and module markers
    // -----------------------------------------------------------------

    /// Upsert a completion record, keeping the best result: once correct,
    /// stays correct; points keep their maximum.
    async fn upsert_exercise_completion(
        &self,
        completion: ExerciseCompletion,
    ) -> Result<(), EngineError>;

    /// List the exercises the user holds a completion record for.
    async fn completed_exercises(&self, user_id: UserId) -> Result<Vec<ExerciseId>, EngineError>;

    /// Insert the one-time module completion marker unless it exists.
    /// Check and write are atomic.
    async fn try_insert_module_completion(
        &self,
        user_id: UserId,
        module_id: ModuleId,
        completed_at: DateTime<Utc>,
    ) -> Result<InsertOutcome, EngineError>;

    // -----------------------------------------------------------------
    // Daily challenges
    // -----------------------------------------------------------------

    /// Fetch the challenge for a calendar date, if created.
    async fn challenge_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<DailyChallenge>, EngineError>;

    /// Fetch a challenge by ID.
    async fn challenge_by_id(
        &self,
        id: ChallengeId,
    ) -> Result<Option<DailyChallenge>, EngineError>;

    /// Insert a challenge unless one exists for its date. Check and write
    /// are atomic; a lost race leaves the winner's row in place.
    async fn try_insert_challenge(
        &self,
        challenge: DailyChallenge,
    ) -> Result<InsertOutcome, EngineError>;

    /// Record an attempt unless one exists for (user, challenge,
    /// exercise); a duplicate returns the stored attempt.
    async fn try_insert_attempt(
        &self,
        attempt: DailyChallengeAttempt,
    ) -> Result<AttemptInsert, EngineError>;

    /// List the user's attempts against a challenge.
    async fn attempts_for_challenge(
        &self,
        user_id: UserId,
        challenge_id: ChallengeId,
    ) -> Result<Vec<DailyChallengeAttempt>, EngineError>;
}

/// Read-only lookups into the exercise and module catalog.
///
/// The catalog is owned by the rest of the application; the engine only
/// consumes it.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch an exercise by ID.
    async fn exercise(&self, id: ExerciseId) -> Result<Option<Exercise>, EngineError>;

    /// List every exercise eligible for daily-challenge selection.
    async fn all_exercise_ids(&self) -> Result<Vec<ExerciseId>, EngineError>;

    /// List the exercises belonging to a module, or `None` for an unknown
    /// module. An existing module may legitimately be empty.
    async fn module_exercises(
        &self,
        id: ModuleId,
    ) -> Result<Option<Vec<ExerciseId>>, EngineError>;
}
