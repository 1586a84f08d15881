//! In-memory store and catalog implementations.
//!
//! [`MemoryStore`] backs the engine's unit tests and local development
//! without a database. A single [`RwLock`] write guard spans every
//! check-then-act section, so the atomicity the [`RewardsStore`] contract
//! requires holds trivially.
//!
//! [`MemoryCatalog`] is the matching catalog stub, populated by hand in
//! tests and seed scripts.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use praxis_types::{
    AchievementTier, ActionKind, ActivityEvent, ChallengeId, DailyChallenge, DailyChallengeAttempt,
    Exercise, ExerciseCompletion, ExerciseId, ModuleId, PointsSummary, StreakState,
    UserAchievement, UserCounters, UserId, XpState, XpTransaction,
};

use crate::error::EngineError;
use crate::points;
use crate::store::{AttemptInsert, Catalog, InsertOutcome, RewardsStore};
use crate::streak;
use crate::xp;

/// All engine-owned state, held behind one lock.
#[derive(Debug, Default)]
struct Inner {
    events: Vec<ActivityEvent>,
    xp_states: HashMap<UserId, XpState>,
    xp_transactions: Vec<XpTransaction>,
    streaks: HashMap<UserId, StreakState>,
    achievements: HashMap<(UserId, String), UserAchievement>,
    completions: HashMap<(UserId, ExerciseId), ExerciseCompletion>,
    module_markers: HashMap<(UserId, ModuleId), DateTime<Utc>>,
    challenges_by_date: HashMap<NaiveDate, DailyChallenge>,
    challenge_dates: HashMap<ChallengeId, NaiveDate>,
    attempts: HashMap<(UserId, ChallengeId, ExerciseId), DailyChallengeAttempt>,
}

/// In-memory [`RewardsStore`] for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the total number of ledger entries (test helper).
    pub async fn event_count(&self) -> usize {
        self.inner.read().await.events.len()
    }

    /// Return the total number of XP audit rows (test helper).
    pub async fn xp_transaction_count(&self) -> usize {
        self.inner.read().await.xp_transactions.len()
    }
}

#[async_trait]
impl RewardsStore for MemoryStore {
    async fn append_event(&self, event: ActivityEvent) -> Result<(), EngineError> {
        self.inner.write().await.events.push(event);
        Ok(())
    }

    async fn try_append_daily_login(
        &self,
        event: ActivityEvent,
        day: NaiveDate,
    ) -> Result<InsertOutcome, EngineError> {
        let mut inner = self.inner.write().await;
        let user_events: Vec<ActivityEvent> = inner
            .events
            .iter()
            .filter(|e| e.user_id == event.user_id)
            .cloned()
            .collect();
        if points::has_daily_login_on(&user_events, day) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        inner.events.push(event);
        Ok(InsertOutcome::Inserted)
    }

    async fn points_summary(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<PointsSummary, EngineError> {
        let inner = self.inner.read().await;
        let user_events: Vec<ActivityEvent> = inner
            .events
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        Ok(points::summarize(&user_events, today))
    }

    async fn xp_state(&self, user_id: UserId) -> Result<Option<XpState>, EngineError> {
        Ok(self.inner.read().await.xp_states.get(&user_id).copied())
    }

    async fn apply_xp_grant(
        &self,
        user_id: UserId,
        amount: u64,
    ) -> Result<(XpState, Vec<u32>), EngineError> {
        // The write guard spans read, transition, and write: concurrent
        // grants for one user serialize here.
        let mut inner = self.inner.write().await;
        let prior = inner
            .xp_states
            .get(&user_id)
            .copied()
            .unwrap_or_else(|| xp::initial_state(user_id));
        let (next, levels_gained) = xp::apply_grant(&prior, amount);
        inner.xp_states.insert(user_id, next);
        Ok((next, levels_gained))
    }

    async fn append_xp_transaction(&self, tx: XpTransaction) -> Result<(), EngineError> {
        self.inner.write().await.xp_transactions.push(tx);
        Ok(())
    }

    async fn streak_state(&self, user_id: UserId) -> Result<Option<StreakState>, EngineError> {
        Ok(self.inner.read().await.streaks.get(&user_id).copied())
    }

    async fn apply_streak_touch(
        &self,
        user_id: UserId,
        day: NaiveDate,
    ) -> Result<StreakState, EngineError> {
        let mut inner = self.inner.write().await;
        let next = streak::advance(inner.streaks.get(&user_id), user_id, day);
        inner.streaks.insert(user_id, next);
        Ok(next)
    }

    async fn user_achievements(
        &self,
        user_id: UserId,
    ) -> Result<Vec<UserAchievement>, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner
            .achievements
            .values()
            .filter(|ua| ua.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn try_insert_achievement(
        &self,
        record: UserAchievement,
    ) -> Result<InsertOutcome, EngineError> {
        let mut inner = self.inner.write().await;
        let slot = (record.user_id, record.key.clone());
        if inner.achievements.contains_key(&slot) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        inner.achievements.insert(slot, record);
        Ok(InsertOutcome::Inserted)
    }

    async fn upgrade_achievement_tier(
        &self,
        user_id: UserId,
        key: &str,
        tier: AchievementTier,
    ) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.achievements.get_mut(&(user_id, key.to_owned())) {
            // Monotonic write: never lower a stored tier.
            if record.tier < tier {
                record.tier = tier;
            }
        }
        Ok(())
    }

    async fn user_counters(&self, user_id: UserId) -> Result<UserCounters, EngineError> {
        let inner = self.inner.read().await;

        let lessons: HashSet<_> = inner
            .events
            .iter()
            .filter(|e| e.user_id == user_id && e.action_kind == ActionKind::LessonCompleted)
            .filter_map(|e| e.related_id)
            .collect();

        let exercises_correct = inner
            .completions
            .values()
            .filter(|c| c.user_id == user_id && c.is_correct)
            .count();

        let longest_streak = inner
            .streaks
            .get(&user_id)
            .map_or(0, |s| u64::from(s.longest_streak));

        let modules_completed = inner
            .module_markers
            .keys()
            .filter(|(uid, _)| *uid == user_id)
            .count();

        Ok(UserCounters {
            lessons_completed: u64::try_from(lessons.len()).unwrap_or(u64::MAX),
            exercises_correct: u64::try_from(exercises_correct).unwrap_or(u64::MAX),
            longest_streak,
            modules_completed: u64::try_from(modules_completed).unwrap_or(u64::MAX),
        })
    }

    async fn upsert_exercise_completion(
        &self,
        completion: ExerciseCompletion,
    ) -> Result<(), EngineError> {
        let mut inner = self.inner.write().await;
        let slot = (completion.user_id, completion.exercise_id);
        match inner.completions.get_mut(&slot) {
            Some(existing) => {
                // Keep the best result: once correct, stays correct.
                existing.is_correct = existing.is_correct || completion.is_correct;
                existing.points = existing.points.max(completion.points);
                existing.completed_at = completion.completed_at;
            }
            None => {
                inner.completions.insert(slot, completion);
            }
        }
        Ok(())
    }

    async fn completed_exercises(&self, user_id: UserId) -> Result<Vec<ExerciseId>, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner
            .completions
            .keys()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, exercise)| *exercise)
            .collect())
    }

    async fn try_insert_module_completion(
        &self,
        user_id: UserId,
        module_id: ModuleId,
        completed_at: DateTime<Utc>,
    ) -> Result<InsertOutcome, EngineError> {
        let mut inner = self.inner.write().await;
        let slot = (user_id, module_id);
        if inner.module_markers.contains_key(&slot) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        inner.module_markers.insert(slot, completed_at);
        Ok(InsertOutcome::Inserted)
    }

    async fn challenge_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<DailyChallenge>, EngineError> {
        Ok(self.inner.read().await.challenges_by_date.get(&date).cloned())
    }

    async fn challenge_by_id(
        &self,
        id: ChallengeId,
    ) -> Result<Option<DailyChallenge>, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner
            .challenge_dates
            .get(&id)
            .and_then(|date| inner.challenges_by_date.get(date))
            .cloned())
    }

    async fn try_insert_challenge(
        &self,
        challenge: DailyChallenge,
    ) -> Result<InsertOutcome, EngineError> {
        let mut inner = self.inner.write().await;
        if inner
            .challenges_by_date
            .contains_key(&challenge.challenge_date)
        {
            return Ok(InsertOutcome::AlreadyExists);
        }
        inner
            .challenge_dates
            .insert(challenge.id, challenge.challenge_date);
        inner
            .challenges_by_date
            .insert(challenge.challenge_date, challenge);
        Ok(InsertOutcome::Inserted)
    }

    async fn try_insert_attempt(
        &self,
        attempt: DailyChallengeAttempt,
    ) -> Result<AttemptInsert, EngineError> {
        let mut inner = self.inner.write().await;
        let slot = (attempt.user_id, attempt.challenge_id, attempt.exercise_id);
        if let Some(existing) = inner.attempts.get(&slot) {
            return Ok(AttemptInsert::Duplicate(existing.clone()));
        }
        inner.attempts.insert(slot, attempt);
        Ok(AttemptInsert::Inserted)
    }

    async fn attempts_for_challenge(
        &self,
        user_id: UserId,
        challenge_id: ChallengeId,
    ) -> Result<Vec<DailyChallengeAttempt>, EngineError> {
        let inner = self.inner.read().await;
        Ok(inner
            .attempts
            .values()
            .filter(|a| a.user_id == user_id && a.challenge_id == challenge_id)
            .cloned()
            .collect())
    }
}

/// In-memory [`Catalog`] for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    exercises: RwLock<HashMap<ExerciseId, Exercise>>,
    modules: RwLock<HashSet<ModuleId>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exercise. Its module, if any, is registered automatically.
    pub async fn add_exercise(&self, exercise: Exercise) {
        if let Some(module) = exercise.module_id {
            self.modules.write().await.insert(module);
        }
        self.exercises.write().await.insert(exercise.id, exercise);
    }

    /// Register a module with no exercises yet.
    pub async fn add_module(&self, module_id: ModuleId) {
        self.modules.write().await.insert(module_id);
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn exercise(&self, id: ExerciseId) -> Result<Option<Exercise>, EngineError> {
        Ok(self.exercises.read().await.get(&id).cloned())
    }

    async fn all_exercise_ids(&self) -> Result<Vec<ExerciseId>, EngineError> {
        Ok(self.exercises.read().await.keys().copied().collect())
    }

    async fn module_exercises(
        &self,
        id: ModuleId,
    ) -> Result<Option<Vec<ExerciseId>>, EngineError> {
        if !self.modules.read().await.contains(&id) {
            return Ok(None);
        }
        let exercises = self.exercises.read().await;
        Ok(Some(
            exercises
                .values()
                .filter(|e| e.module_id == Some(id))
                .map(|e| e.id)
                .collect(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use praxis_types::ActivityEventId;

    fn login_event(user: UserId, hour: u32) -> ActivityEvent {
        ActivityEvent {
            id: ActivityEventId::new(),
            user_id: user,
            action_kind: ActionKind::DailyLogin,
            points: 2,
            related_id: None,
            occurred_at: Utc.with_ymd_and_hms(2026, 8, 26, hour, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn daily_login_dedup_is_per_user_and_day() {
        let store = MemoryStore::new();
        let day = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
        let alice = UserId::new();
        let bob = UserId::new();

        let first = store
            .try_append_daily_login(login_event(alice, 8), day)
            .await
            .unwrap();
        assert_eq!(first, InsertOutcome::Inserted);

        let second = store
            .try_append_daily_login(login_event(alice, 20), day)
            .await
            .unwrap();
        assert_eq!(second, InsertOutcome::AlreadyExists);

        // A different user is unaffected.
        let other = store
            .try_append_daily_login(login_event(bob, 9), day)
            .await
            .unwrap();
        assert_eq!(other, InsertOutcome::Inserted);
        assert_eq!(store.event_count().await, 2);
    }

    #[tokio::test]
    async fn achievement_upgrade_never_downgrades() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let record = UserAchievement {
            user_id: user,
            key: "daily_devotion".to_owned(),
            tier: AchievementTier::Gold,
            unlocked_at: Utc::now(),
        };
        store.try_insert_achievement(record).await.unwrap();

        store
            .upgrade_achievement_tier(user, "daily_devotion", AchievementTier::Silver)
            .await
            .unwrap();
        let held = store.user_achievements(user).await.unwrap();
        assert_eq!(held.first().map(|ua| ua.tier), Some(AchievementTier::Gold));

        store
            .upgrade_achievement_tier(user, "daily_devotion", AchievementTier::Platinum)
            .await
            .unwrap();
        let held = store.user_achievements(user).await.unwrap();
        assert_eq!(
            held.first().map(|ua| ua.tier),
            Some(AchievementTier::Platinum)
        );
    }

    #[tokio::test]
    async fn completion_upsert_keeps_best_result() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let exercise = ExerciseId::new();

        let wrong = ExerciseCompletion {
            user_id: user,
            exercise_id: exercise,
            is_correct: false,
            points: 0,
            completed_at: Utc::now(),
        };
        store.upsert_exercise_completion(wrong).await.unwrap();

        let right = ExerciseCompletion {
            user_id: user,
            exercise_id: exercise,
            is_correct: true,
            points: 10,
            completed_at: Utc::now(),
        };
        store.upsert_exercise_completion(right).await.unwrap();

        // A later wrong answer does not erase the correct one.
        let wrong_again = ExerciseCompletion {
            user_id: user,
            exercise_id: exercise,
            is_correct: false,
            points: 0,
            completed_at: Utc::now(),
        };
        store.upsert_exercise_completion(wrong_again).await.unwrap();

        let counters = store.user_counters(user).await.unwrap();
        assert_eq!(counters.exercises_correct, 1);
        assert_eq!(store.completed_exercises(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn challenge_insert_is_first_writer_wins() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
        let winner = DailyChallenge {
            id: ChallengeId::new(),
            challenge_date: date,
            exercise_ids: (0..3).map(|_| ExerciseId::new()).collect(),
        };
        let loser = DailyChallenge {
            id: ChallengeId::new(),
            challenge_date: date,
            exercise_ids: (0..3).map(|_| ExerciseId::new()).collect(),
        };

        assert_eq!(
            store.try_insert_challenge(winner.clone()).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            store.try_insert_challenge(loser).await.unwrap(),
            InsertOutcome::AlreadyExists
        );
        let stored = store.challenge_for_date(date).await.unwrap();
        assert_eq!(stored.map(|c| c.id), Some(winner.id));
    }

    #[tokio::test]
    async fn memory_catalog_distinguishes_unknown_and_empty_modules() {
        let catalog = MemoryCatalog::new();
        let known = ModuleId::new();
        catalog.add_module(known).await;

        assert_eq!(
            catalog.module_exercises(known).await.unwrap(),
            Some(Vec::new())
        );
        assert_eq!(catalog.module_exercises(ModuleId::new()).await.unwrap(), None);
    }
}
