//! `PostgreSQL` implementation of the engine's persistence trait.
//!
//! Every exactly-once guarantee rides on a uniqueness constraint plus
//! `ON CONFLICT DO NOTHING`: the daily-login partial index, the
//! (user, key) achievement primary key, the challenge-date unique
//! column, the per-exercise attempt constraint, and the module marker
//! primary key. A conflicting write reports zero rows affected, which
//! maps straight onto [`InsertOutcome::AlreadyExists`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use praxis_engine::clock::{month_start, week_start};
use praxis_engine::store::{AttemptInsert, InsertOutcome, RewardsStore};
use praxis_engine::{streak, xp, EngineError};
use praxis_types::{
    AchievementTier, ActionKind, ActivityEvent, AttemptId, ChallengeId, DailyChallenge,
    DailyChallengeAttempt, ExerciseCompletion, ExerciseId, ModuleId, PointsSummary, StreakState,
    UserAchievement, UserCounters, UserId, XpState, XpTransaction,
};

use crate::error::DbError;
use crate::postgres::PostgresPool;

/// Map a [`sqlx::Error`] into the engine's storage error.
fn pg(err: sqlx::Error) -> EngineError {
    DbError::Postgres(err).into()
}

/// Rewards persistence backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgRewardsStore {
    pool: PgPool,
}

impl PgRewardsStore {
    /// Create a store over a connected pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }
}

#[async_trait]
impl RewardsStore for PgRewardsStore {
    async fn append_event(&self, event: ActivityEvent) -> Result<(), EngineError> {
        sqlx::query(
            r"INSERT INTO activity_events (id, user_id, action_kind, points, related_id, occurred_at, occurred_on)
              VALUES ($1, $2, $3::action_kind, $4, $5, $6, $7)",
        )
        .bind(event.id.into_inner())
        .bind(event.user_id.into_inner())
        .bind(action_kind_to_db(event.action_kind))
        .bind(i32::try_from(event.points).unwrap_or(i32::MAX))
        .bind(event.related_id)
        .bind(event.occurred_at)
        .bind(event.occurred_at.date_naive())
        .execute(&self.pool)
        .await
        .map_err(pg)?;
        Ok(())
    }

    async fn try_append_daily_login(
        &self,
        event: ActivityEvent,
        day: NaiveDate,
    ) -> Result<InsertOutcome, EngineError> {
        let result = sqlx::query(
            r"INSERT INTO activity_events (id, user_id, action_kind, points, related_id, occurred_at, occurred_on)
              VALUES ($1, $2, 'daily_login', $3, $4, $5, $6)
              ON CONFLICT (user_id, occurred_on) WHERE action_kind = 'daily_login' DO NOTHING",
        )
        .bind(event.id.into_inner())
        .bind(event.user_id.into_inner())
        .bind(i32::try_from(event.points).unwrap_or(i32::MAX))
        .bind(event.related_id)
        .bind(event.occurred_at)
        .bind(day)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn points_summary(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<PointsSummary, EngineError> {
        let week = week_start(today);
        let month = month_start(today);

        let row = sqlx::query(
            r"SELECT
                COALESCE(SUM(points) FILTER (WHERE occurred_on = $2), 0)::BIGINT AS today,
                COALESCE(SUM(points) FILTER (WHERE occurred_on BETWEEN $3 AND $2), 0)::BIGINT AS this_week,
                COALESCE(SUM(points) FILTER (WHERE occurred_on BETWEEN $4 AND $2), 0)::BIGINT AS this_month,
                COALESCE(SUM(points), 0)::BIGINT AS all_time
              FROM activity_events
              WHERE user_id = $1",
        )
        .bind(user_id.into_inner())
        .bind(today)
        .bind(week)
        .bind(month)
        .fetch_one(&self.pool)
        .await
        .map_err(pg)?;

        Ok(PointsSummary {
            today: sum_to_u64(row.try_get("today").map_err(pg)?),
            this_week: sum_to_u64(row.try_get("this_week").map_err(pg)?),
            this_month: sum_to_u64(row.try_get("this_month").map_err(pg)?),
            all_time: sum_to_u64(row.try_get("all_time").map_err(pg)?),
        })
    }

    async fn xp_state(&self, user_id: UserId) -> Result<Option<XpState>, EngineError> {
        let row = sqlx::query_as::<_, XpStateRow>(
            r"SELECT user_id, total_xp, level, xp_to_next_level
              FROM xp_states WHERE user_id = $1",
        )
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(pg)?;

        Ok(row.map(XpStateRow::into_domain))
    }

    async fn apply_xp_grant(
        &self,
        user_id: UserId,
        amount: u64,
    ) -> Result<(XpState, Vec<u32>), EngineError> {
        let mut tx = self.pool.begin().await.map_err(pg)?;

        // Seed the row so `FOR UPDATE` below has something to lock on a
        // user's first grant. Concurrent seeders serialize on the PK.
        sqlx::query(
            r"INSERT INTO xp_states (user_id, total_xp, level, xp_to_next_level)
              VALUES ($1, 0, 1, $2)
              ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id.into_inner())
        .bind(i64::try_from(xp::BASE_XP_PER_LEVEL).unwrap_or(i64::MAX))
        .execute(&mut *tx)
        .await
        .map_err(pg)?;

        let row = sqlx::query_as::<_, XpStateRow>(
            r"SELECT user_id, total_xp, level, xp_to_next_level
              FROM xp_states WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id.into_inner())
        .fetch_one(&mut *tx)
        .await
        .map_err(pg)?;

        let (next, levels_gained) = xp::apply_grant(&row.into_domain(), amount);

        sqlx::query(
            r"UPDATE xp_states
              SET total_xp = $2, level = $3, xp_to_next_level = $4
              WHERE user_id = $1",
        )
        .bind(user_id.into_inner())
        .bind(i64::try_from(next.total_xp).unwrap_or(i64::MAX))
        .bind(i32::try_from(next.level).unwrap_or(i32::MAX))
        .bind(i64::try_from(next.xp_to_next_level).unwrap_or(i64::MAX))
        .execute(&mut *tx)
        .await
        .map_err(pg)?;

        tx.commit().await.map_err(pg)?;
        Ok((next, levels_gained))
    }

    async fn append_xp_transaction(&self, tx: XpTransaction) -> Result<(), EngineError> {
        sqlx::query(
            r"INSERT INTO xp_transactions (id, user_id, amount, reason, related_id, created_at)
              VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(tx.id.into_inner())
        .bind(tx.user_id.into_inner())
        .bind(i64::try_from(tx.amount).unwrap_or(i64::MAX))
        .bind(&tx.reason)
        .bind(tx.related_id)
        .bind(tx.created_at)
        .execute(&self.pool)
        .await
        .map_err(pg)?;
        Ok(())
    }

    async fn streak_state(&self, user_id: UserId) -> Result<Option<StreakState>, EngineError> {
        let row = sqlx::query_as::<_, StreakRow>(
            r"SELECT user_id, current_streak, longest_streak, last_activity_date
              FROM streak_states WHERE user_id = $1",
        )
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(pg)?;

        Ok(row.map(StreakRow::into_domain))
    }

    async fn apply_streak_touch(
        &self,
        user_id: UserId,
        day: NaiveDate,
    ) -> Result<StreakState, EngineError> {
        let mut tx = self.pool.begin().await.map_err(pg)?;

        // Seed a zero-streak row so the lock exists for first-ever
        // touches. `advance` never produces current_streak = 0, so zero
        // unambiguously means "no real activity recorded yet".
        sqlx::query(
            r"INSERT INTO streak_states (user_id, current_streak, longest_streak, last_activity_date)
              VALUES ($1, 0, 0, $2)
              ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id.into_inner())
        .bind(day)
        .execute(&mut *tx)
        .await
        .map_err(pg)?;

        let row = sqlx::query_as::<_, StreakRow>(
            r"SELECT user_id, current_streak, longest_streak, last_activity_date
              FROM streak_states WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id.into_inner())
        .fetch_one(&mut *tx)
        .await
        .map_err(pg)?;

        let prior = row.into_domain();
        let next = streak::advance(
            (prior.current_streak > 0).then_some(&prior),
            user_id,
            day,
        );

        sqlx::query(
            r"UPDATE streak_states
              SET current_streak = $2, longest_streak = $3, last_activity_date = $4
              WHERE user_id = $1",
        )
        .bind(user_id.into_inner())
        .bind(i32::try_from(next.current_streak).unwrap_or(i32::MAX))
        .bind(i32::try_from(next.longest_streak).unwrap_or(i32::MAX))
        .bind(next.last_activity_date)
        .execute(&mut *tx)
        .await
        .map_err(pg)?;

        tx.commit().await.map_err(pg)?;
        Ok(next)
    }

    async fn user_achievements(
        &self,
        user_id: UserId,
    ) -> Result<Vec<UserAchievement>, EngineError> {
        let rows = sqlx::query_as::<_, AchievementRow>(
            r"SELECT user_id, key, tier::TEXT AS tier, unlocked_at
              FROM user_achievements WHERE user_id = $1",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        rows.into_iter().map(AchievementRow::into_domain).collect()
    }

    async fn try_insert_achievement(
        &self,
        record: UserAchievement,
    ) -> Result<InsertOutcome, EngineError> {
        let result = sqlx::query(
            r"INSERT INTO user_achievements (user_id, key, tier, tier_rank, unlocked_at)
              VALUES ($1, $2, $3::achievement_tier, $4, $5)
              ON CONFLICT (user_id, key) DO NOTHING",
        )
        .bind(record.user_id.into_inner())
        .bind(&record.key)
        .bind(tier_to_db(record.tier))
        .bind(tier_rank(record.tier))
        .bind(record.unlocked_at)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn upgrade_achievement_tier(
        &self,
        user_id: UserId,
        key: &str,
        tier: AchievementTier,
    ) -> Result<(), EngineError> {
        // The rank guard keeps the write monotonic under races.
        sqlx::query(
            r"UPDATE user_achievements
              SET tier = $3::achievement_tier, tier_rank = $4
              WHERE user_id = $1 AND key = $2 AND tier_rank < $4",
        )
        .bind(user_id.into_inner())
        .bind(key)
        .bind(tier_to_db(tier))
        .bind(tier_rank(tier))
        .execute(&self.pool)
        .await
        .map_err(pg)?;
        Ok(())
    }

    async fn user_counters(&self, user_id: UserId) -> Result<UserCounters, EngineError> {
        let row = sqlx::query(
            r"SELECT
                (SELECT COUNT(DISTINCT related_id) FROM activity_events
                 WHERE user_id = $1 AND action_kind = 'lesson_completed' AND related_id IS NOT NULL) AS lessons_completed,
                (SELECT COUNT(*) FROM exercise_completions
                 WHERE user_id = $1 AND is_correct) AS exercises_correct,
                (SELECT COALESCE(MAX(longest_streak), 0) FROM streak_states
                 WHERE user_id = $1) AS longest_streak,
                (SELECT COUNT(*) FROM module_completions
                 WHERE user_id = $1) AS modules_completed",
        )
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(pg)?;

        let longest: i32 = row.try_get("longest_streak").map_err(pg)?;
        Ok(UserCounters {
            lessons_completed: sum_to_u64(row.try_get("lessons_completed").map_err(pg)?),
            exercises_correct: sum_to_u64(row.try_get("exercises_correct").map_err(pg)?),
            longest_streak: sum_to_u64(i64::from(longest)),
            modules_completed: sum_to_u64(row.try_get("modules_completed").map_err(pg)?),
        })
    }

    async fn upsert_exercise_completion(
        &self,
        completion: ExerciseCompletion,
    ) -> Result<(), EngineError> {
        // Keep-best: once correct stays correct, points keep their max.
        sqlx::query(
            r"INSERT INTO exercise_completions (user_id, exercise_id, is_correct, points, completed_at)
              VALUES ($1, $2, $3, $4, $5)
              ON CONFLICT (user_id, exercise_id) DO UPDATE SET
                is_correct = exercise_completions.is_correct OR EXCLUDED.is_correct,
                points = GREATEST(exercise_completions.points, EXCLUDED.points),
                completed_at = EXCLUDED.completed_at",
        )
        .bind(completion.user_id.into_inner())
        .bind(completion.exercise_id.into_inner())
        .bind(completion.is_correct)
        .bind(i32::try_from(completion.points).unwrap_or(i32::MAX))
        .bind(completion.completed_at)
        .execute(&self.pool)
        .await
        .map_err(pg)?;
        Ok(())
    }

    async fn completed_exercises(&self, user_id: UserId) -> Result<Vec<ExerciseId>, EngineError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r"SELECT exercise_id FROM exercise_completions WHERE user_id = $1",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        Ok(ids.into_iter().map(ExerciseId::from).collect())
    }

    async fn try_insert_module_completion(
        &self,
        user_id: UserId,
        module_id: ModuleId,
        completed_at: DateTime<Utc>,
    ) -> Result<InsertOutcome, EngineError> {
        let result = sqlx::query(
            r"INSERT INTO module_completions (user_id, module_id, completed_at)
              VALUES ($1, $2, $3)
              ON CONFLICT (user_id, module_id) DO NOTHING",
        )
        .bind(user_id.into_inner())
        .bind(module_id.into_inner())
        .bind(completed_at)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn challenge_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<DailyChallenge>, EngineError> {
        let row = sqlx::query_as::<_, ChallengeRow>(
            r"SELECT id, challenge_date, exercise_ids
              FROM daily_challenges WHERE challenge_date = $1",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(pg)?;

        Ok(row.map(ChallengeRow::into_domain))
    }

    async fn challenge_by_id(
        &self,
        id: ChallengeId,
    ) -> Result<Option<DailyChallenge>, EngineError> {
        let row = sqlx::query_as::<_, ChallengeRow>(
            r"SELECT id, challenge_date, exercise_ids
              FROM daily_challenges WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(pg)?;

        Ok(row.map(ChallengeRow::into_domain))
    }

    async fn try_insert_challenge(
        &self,
        challenge: DailyChallenge,
    ) -> Result<InsertOutcome, EngineError> {
        let exercise_ids: Vec<Uuid> = challenge
            .exercise_ids
            .iter()
            .copied()
            .map(ExerciseId::into_inner)
            .collect();

        let result = sqlx::query(
            r"INSERT INTO daily_challenges (id, challenge_date, exercise_ids)
              VALUES ($1, $2, $3)
              ON CONFLICT (challenge_date) DO NOTHING",
        )
        .bind(challenge.id.into_inner())
        .bind(challenge.challenge_date)
        .bind(&exercise_ids)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn try_insert_attempt(
        &self,
        attempt: DailyChallengeAttempt,
    ) -> Result<AttemptInsert, EngineError> {
        let result = sqlx::query(
            r"INSERT INTO challenge_attempts (id, user_id, challenge_id, exercise_id, is_correct, points_earned, created_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7)
              ON CONFLICT (user_id, challenge_id, exercise_id) DO NOTHING",
        )
        .bind(attempt.id.into_inner())
        .bind(attempt.user_id.into_inner())
        .bind(attempt.challenge_id.into_inner())
        .bind(attempt.exercise_id.into_inner())
        .bind(attempt.is_correct)
        .bind(i32::try_from(attempt.points_earned).unwrap_or(i32::MAX))
        .bind(attempt.created_at)
        .execute(&self.pool)
        .await
        .map_err(pg)?;

        if result.rows_affected() > 0 {
            return Ok(AttemptInsert::Inserted);
        }

        // Lost to a prior attempt: hand back the stored row.
        let prior = sqlx::query_as::<_, AttemptRow>(
            r"SELECT id, user_id, challenge_id, exercise_id, is_correct, points_earned, created_at
              FROM challenge_attempts
              WHERE user_id = $1 AND challenge_id = $2 AND exercise_id = $3",
        )
        .bind(attempt.user_id.into_inner())
        .bind(attempt.challenge_id.into_inner())
        .bind(attempt.exercise_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(pg)?;

        Ok(AttemptInsert::Duplicate(prior.into_domain()))
    }

    async fn attempts_for_challenge(
        &self,
        user_id: UserId,
        challenge_id: ChallengeId,
    ) -> Result<Vec<DailyChallengeAttempt>, EngineError> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r"SELECT id, user_id, challenge_id, exercise_id, is_correct, points_earned, created_at
              FROM challenge_attempts
              WHERE user_id = $1 AND challenge_id = $2
              ORDER BY created_at",
        )
        .bind(user_id.into_inner())
        .bind(challenge_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(pg)?;

        Ok(rows.into_iter().map(AttemptRow::into_domain).collect())
    }
}

// ---------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct XpStateRow {
    user_id: Uuid,
    total_xp: i64,
    level: i32,
    xp_to_next_level: i64,
}

impl XpStateRow {
    fn into_domain(self) -> XpState {
        XpState {
            user_id: UserId::from(self.user_id),
            total_xp: u64::try_from(self.total_xp).unwrap_or(0),
            level: u32::try_from(self.level).unwrap_or(1),
            xp_to_next_level: u64::try_from(self.xp_to_next_level).unwrap_or(0),
        }
    }
}

#[derive(sqlx::FromRow)]
struct StreakRow {
    user_id: Uuid,
    current_streak: i32,
    longest_streak: i32,
    last_activity_date: NaiveDate,
}

impl StreakRow {
    fn into_domain(self) -> StreakState {
        StreakState {
            user_id: UserId::from(self.user_id),
            current_streak: u32::try_from(self.current_streak).unwrap_or(0),
            longest_streak: u32::try_from(self.longest_streak).unwrap_or(0),
            last_activity_date: self.last_activity_date,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AchievementRow {
    user_id: Uuid,
    key: String,
    tier: String,
    unlocked_at: DateTime<Utc>,
}

impl AchievementRow {
    fn into_domain(self) -> Result<UserAchievement, EngineError> {
        Ok(UserAchievement {
            user_id: UserId::from(self.user_id),
            key: self.key,
            tier: tier_from_db(&self.tier)?,
            unlocked_at: self.unlocked_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ChallengeRow {
    id: Uuid,
    challenge_date: NaiveDate,
    exercise_ids: Vec<Uuid>,
}

impl ChallengeRow {
    fn into_domain(self) -> DailyChallenge {
        DailyChallenge {
            id: ChallengeId::from(self.id),
            challenge_date: self.challenge_date,
            exercise_ids: self.exercise_ids.into_iter().map(ExerciseId::from).collect(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct AttemptRow {
    id: Uuid,
    user_id: Uuid,
    challenge_id: Uuid,
    exercise_id: Uuid,
    is_correct: bool,
    points_earned: i32,
    created_at: DateTime<Utc>,
}

impl AttemptRow {
    fn into_domain(self) -> DailyChallengeAttempt {
        DailyChallengeAttempt {
            id: AttemptId::from(self.id),
            user_id: UserId::from(self.user_id),
            challenge_id: ChallengeId::from(self.challenge_id),
            exercise_id: ExerciseId::from(self.exercise_id),
            is_correct: self.is_correct,
            points_earned: u32::try_from(self.points_earned).unwrap_or(0),
            created_at: self.created_at,
        }
    }
}

// ---------------------------------------------------------------------
// Enum mapping
// ---------------------------------------------------------------------

/// Convert an [`ActionKind`] to its `PostgreSQL` enum string.
const fn action_kind_to_db(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::DailyLogin => "daily_login",
        ActionKind::VideoWatched => "video_watched",
        ActionKind::ExerciseCompleted => "exercise_completed",
        ActionKind::PodcastListened => "podcast_listened",
        ActionKind::TaskCompleted => "task_completed",
        ActionKind::DailyChallengeCompleted => "daily_challenge_completed",
        ActionKind::LessonCompleted => "lesson_completed",
    }
}

/// Convert an [`AchievementTier`] to its `PostgreSQL` enum string.
const fn tier_to_db(tier: AchievementTier) -> &'static str {
    match tier {
        AchievementTier::Bronze => "bronze",
        AchievementTier::Silver => "silver",
        AchievementTier::Gold => "gold",
        AchievementTier::Platinum => "platinum",
    }
}

/// Ordinal rank mirrored into `tier_rank` for the monotonic guard.
const fn tier_rank(tier: AchievementTier) -> i16 {
    match tier {
        AchievementTier::Bronze => 1,
        AchievementTier::Silver => 2,
        AchievementTier::Gold => 3,
        AchievementTier::Platinum => 4,
    }
}

/// Parse a stored tier string back into its domain enum.
fn tier_from_db(value: &str) -> Result<AchievementTier, EngineError> {
    match value {
        "bronze" => Ok(AchievementTier::Bronze),
        "silver" => Ok(AchievementTier::Silver),
        "gold" => Ok(AchievementTier::Gold),
        "platinum" => Ok(AchievementTier::Platinum),
        other => Err(DbError::CorruptRow(format!("unknown achievement tier: {other}")).into()),
    }
}

/// Clamp a `BIGINT` aggregate into the unsigned domain.
fn sum_to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
