//! The rewards service: request-scoped orchestration of every engine
//! operation.
//!
//! The service owns no state of its own. Each operation loads what it
//! needs from the [`RewardsStore`], applies the pure logic from the
//! domain modules, and persists the result -- ledger appends always happen
//! before downstream recomputation, and recomputation always reads the
//! just-written state.
//!
//! Check-then-act races (two tabs, double-submits) surface from the store
//! as [`InsertOutcome::AlreadyExists`] and are recovered here with an
//! idempotent re-read; callers never see a conflict error.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use praxis_types::{
    AchievementDefinition, AchievementDelta, AchievementStatus, ActionKind, ActivityEvent,
    ActivityEventId, AttemptId, ChallengeId, ChallengeOutcome, DailyChallenge,
    DailyChallengeAttempt, Exercise, ExerciseCompletion, ExerciseId, LessonId,
    ModuleCompletionOutcome, ModuleId, PointsOutcome, PointsSummary, StreakState, UserAchievement,
    UserId, XpAward, XpState, XpTransaction, XpTransactionId,
};

use crate::achievements;
use crate::challenge;
use crate::clock::Clock;
use crate::error::EngineError;
use crate::modules;
use crate::store::{AttemptInsert, Catalog, InsertOutcome, RewardsStore};
use crate::xp;

/// Result of recording a lesson or exercise completion: the credited
/// points, the XP grant (when any), and achievements newly unlocked or
/// upgraded by the recomputation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CompletionRecorded {
    /// Points credited by the completion.
    pub points: PointsOutcome,
    /// XP grant applied, absent for an incorrect exercise.
    pub xp: Option<XpAward>,
    /// Achievements newly unlocked or upgraded.
    pub achievements: Vec<AchievementDelta>,
}

/// The progression and rewards service.
///
/// Cheap to clone; all fields are shared handles.
#[derive(Clone)]
pub struct RewardsService {
    store: Arc<dyn RewardsStore>,
    catalog: Arc<dyn Catalog>,
    clock: Arc<dyn Clock>,
}

impl RewardsService {
    /// Create a service over a store, a catalog, and a clock.
    pub fn new(
        store: Arc<dyn RewardsStore>,
        catalog: Arc<dyn Catalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
        }
    }

    // -----------------------------------------------------------------
    // Activity ledger & points
    // -----------------------------------------------------------------

    /// Record a point-earning activity.
    ///
    /// `daily_login` is credited at most once per server-local calendar
    /// day; a repeat returns `earned = false` with 0 points. Every other
    /// kind appends unconditionally -- preventing repetition is the
    /// caller's completion-tracking concern.
    pub async fn record_points(
        &self,
        user_id: UserId,
        action_kind: ActionKind,
        points: u32,
        related_id: Option<Uuid>,
    ) -> Result<PointsOutcome, EngineError> {
        let now = self.clock.now();
        let event = ActivityEvent {
            id: ActivityEventId::new(),
            user_id,
            action_kind,
            points,
            related_id,
            occurred_at: now,
        };

        if action_kind == ActionKind::DailyLogin {
            let day = now.date_naive();
            return match self.store.try_append_daily_login(event, day).await? {
                InsertOutcome::Inserted => {
                    tracing::debug!(%user_id, points, "daily login bonus credited");
                    Ok(PointsOutcome {
                        earned: true,
                        points,
                    })
                }
                InsertOutcome::AlreadyExists => {
                    tracing::debug!(%user_id, %day, "daily login already credited today");
                    Ok(PointsOutcome {
                        earned: false,
                        points: 0,
                    })
                }
            };
        }

        self.store.append_event(event).await?;
        Ok(PointsOutcome {
            earned: true,
            points,
        })
    }

    /// Sum the user's ledger into today / this week / this month /
    /// all-time windows.
    pub async fn get_summary(&self, user_id: UserId) -> Result<PointsSummary, EngineError> {
        self.store
            .points_summary(user_id, self.clock.today())
            .await
    }

    // -----------------------------------------------------------------
    // XP & levels
    // -----------------------------------------------------------------

    /// Grant XP, recomputing the level from the new total and recording
    /// an audit transaction.
    ///
    /// The grant itself is one atomic store operation, so concurrent
    /// grants for the same user all land and the audit trail always sums
    /// to `total_xp`.
    pub async fn award_xp(
        &self,
        user_id: UserId,
        amount: u64,
        reason: &str,
        related_id: Option<Uuid>,
    ) -> Result<XpAward, EngineError> {
        let (state, levels_gained) = self.store.apply_xp_grant(user_id, amount).await?;
        self.store
            .append_xp_transaction(XpTransaction {
                id: XpTransactionId::new(),
                user_id,
                amount,
                reason: reason.to_owned(),
                related_id,
                created_at: self.clock.now(),
            })
            .await?;

        if let Some(level) = levels_gained.last() {
            tracing::info!(%user_id, level, "level up");
        }

        Ok(XpAward {
            state,
            levels_gained,
        })
    }

    /// Fetch the user's XP state; a user with no grants is level 1 at 0 XP.
    pub async fn get_xp_state(&self, user_id: UserId) -> Result<XpState, EngineError> {
        Ok(self
            .store
            .xp_state(user_id)
            .await?
            .unwrap_or_else(|| xp::initial_state(user_id)))
    }

    // -----------------------------------------------------------------
    // Streaks
    // -----------------------------------------------------------------

    /// Apply an activity day to the user's streak.
    ///
    /// Intended to be driven once per session by a login-triggering
    /// event; same-day repeats are no-ops by construction.
    pub async fn touch_streak(
        &self,
        user_id: UserId,
        day: NaiveDate,
    ) -> Result<StreakState, EngineError> {
        self.store.apply_streak_touch(user_id, day).await
    }

    /// Fetch the user's streak state, if any activity was ever recorded.
    pub async fn get_streak(&self, user_id: UserId) -> Result<Option<StreakState>, EngineError> {
        self.store.streak_state(user_id).await
    }

    // -----------------------------------------------------------------
    // Achievements
    // -----------------------------------------------------------------

    /// Return the static achievement catalog in stable order.
    pub fn list_definitions(&self) -> &'static [AchievementDefinition] {
        achievements::catalog()
    }

    /// Annotate every definition with the user's computed unlock status.
    pub async fn get_user_achievements(
        &self,
        user_id: UserId,
    ) -> Result<Vec<AchievementStatus>, EngineError> {
        let counters = self.store.user_counters(user_id).await?;
        let existing = self.store.user_achievements(user_id).await?;
        Ok(achievements::status(&counters, &existing))
    }

    /// Re-evaluate the user's achievements against the source-of-truth
    /// counters, persisting new unlocks and tier upgrades.
    ///
    /// Safe to call redundantly: with unchanged counters the second call
    /// returns an empty list. A concurrent duplicate unlock loses the
    /// insert race and is dropped from the result.
    pub async fn check_and_award(
        &self,
        user_id: UserId,
    ) -> Result<Vec<AchievementDelta>, EngineError> {
        let counters = self.store.user_counters(user_id).await?;
        let existing = self.store.user_achievements(user_id).await?;
        let changes = achievements::evaluate(&counters, &existing);

        let mut deltas = Vec::new();
        for change in changes {
            let def = change.definition;
            if change.first_unlock {
                let record = UserAchievement {
                    user_id,
                    key: def.key.clone(),
                    tier: change.tier,
                    unlocked_at: self.clock.now(),
                };
                match self.store.try_insert_achievement(record).await? {
                    InsertOutcome::Inserted => {
                        tracing::info!(%user_id, key = def.key, tier = change.tier.display_name(), "achievement unlocked");
                        deltas.push(AchievementDelta {
                            key: def.key.clone(),
                            title: def.title.clone(),
                            tier: change.tier,
                            first_unlock: true,
                        });
                    }
                    InsertOutcome::AlreadyExists => {
                        // Benign race with a concurrent evaluation.
                        tracing::debug!(%user_id, key = def.key, "achievement unlock lost insert race");
                    }
                }
            } else {
                self.store
                    .upgrade_achievement_tier(user_id, &def.key, change.tier)
                    .await?;
                tracing::info!(%user_id, key = def.key, tier = change.tier.display_name(), "achievement tier upgraded");
                deltas.push(AchievementDelta {
                    key: def.key.clone(),
                    title: def.title.clone(),
                    tier: change.tier,
                    first_unlock: false,
                });
            }
        }

        Ok(deltas)
    }

    // -----------------------------------------------------------------
    // Completion recording
    // -----------------------------------------------------------------

    /// Record a completed lesson: credits points, grants matching XP, and
    /// re-evaluates achievements.
    pub async fn record_lesson_completion(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        points: u32,
    ) -> Result<CompletionRecorded, EngineError> {
        let related = Some(lesson_id.into_inner());
        let outcome = self
            .record_points(user_id, ActionKind::LessonCompleted, points, related)
            .await?;
        let xp = self
            .award_xp(user_id, u64::from(points), "lesson_completed", related)
            .await?;
        let achievements = self.check_and_award(user_id).await?;
        Ok(CompletionRecorded {
            points: outcome,
            xp: Some(xp),
            achievements,
        })
    }

    /// Record an exercise completion (catalog or ad hoc): upserts the
    /// completion record, appends a ledger entry, grants XP for correct
    /// answers, and re-evaluates achievements.
    pub async fn record_exercise_completion(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
        is_correct: bool,
        points: u32,
    ) -> Result<CompletionRecorded, EngineError> {
        if !is_correct && points > 0 {
            return Err(EngineError::Validation(
                "an incorrect completion cannot credit points".to_owned(),
            ));
        }

        let now = self.clock.now();
        let related = Some(exercise_id.into_inner());
        self.store
            .upsert_exercise_completion(ExerciseCompletion {
                user_id,
                exercise_id,
                is_correct,
                points,
                completed_at: now,
            })
            .await?;
        let outcome = self
            .record_points(user_id, ActionKind::ExerciseCompleted, points, related)
            .await?;

        let xp = if is_correct && points > 0 {
            Some(
                self.award_xp(user_id, u64::from(points), "exercise_completed", related)
                    .await?,
            )
        } else {
            None
        };

        let achievements = self.check_and_award(user_id).await?;
        Ok(CompletionRecorded {
            points: outcome,
            xp,
            achievements,
        })
    }

    // -----------------------------------------------------------------
    // Daily challenge
    // -----------------------------------------------------------------

    /// Fetch today's challenge, creating it if this is the first request
    /// of the day. Concurrent first requests converge on one record: the
    /// selection is deterministic per date and the insert is guarded by a
    /// unique constraint, so a lost race re-reads the winner.
    pub async fn get_today_challenge(
        &self,
    ) -> Result<(DailyChallenge, Vec<Exercise>), EngineError> {
        let today = self.clock.today();

        let challenge = match self.store.challenge_for_date(today).await? {
            Some(existing) => existing,
            None => {
                let pool = self.catalog.all_exercise_ids().await?;
                let exercise_ids = challenge::select_exercises(today, &pool)?;
                let candidate = DailyChallenge {
                    id: ChallengeId::new(),
                    challenge_date: today,
                    exercise_ids,
                };
                match self.store.try_insert_challenge(candidate.clone()).await? {
                    InsertOutcome::Inserted => {
                        tracing::info!(%today, "daily challenge created");
                        candidate
                    }
                    InsertOutcome::AlreadyExists => self
                        .store
                        .challenge_for_date(today)
                        .await?
                        .ok_or_else(|| {
                            EngineError::Store(
                                "daily challenge vanished after losing the insert race".to_owned(),
                            )
                        })?,
                }
            }
        };

        let mut exercises = Vec::with_capacity(challenge.exercise_ids.len());
        for id in &challenge.exercise_ids {
            let exercise = self
                .catalog
                .exercise(*id)
                .await?
                .ok_or_else(|| EngineError::not_found("exercise", id))?;
            exercises.push(exercise);
        }
        Ok((challenge, exercises))
    }

    /// Submit an answer to a daily challenge exercise.
    ///
    /// A correct first attempt earns double the exercise's base points
    /// and matching XP. Incorrect attempts earn nothing. A duplicate
    /// attempt reports the stored correctness with 0 points and grants
    /// nothing further.
    pub async fn submit_challenge_answer(
        &self,
        user_id: UserId,
        challenge_id: ChallengeId,
        exercise_id: ExerciseId,
        answer: &str,
    ) -> Result<ChallengeOutcome, EngineError> {
        let challenge = self
            .store
            .challenge_by_id(challenge_id)
            .await?
            .ok_or_else(|| EngineError::not_found("challenge", challenge_id))?;
        if !challenge.exercise_ids.contains(&exercise_id) {
            return Err(EngineError::Validation(format!(
                "exercise {exercise_id} is not part of challenge {challenge_id}"
            )));
        }
        let exercise = self
            .catalog
            .exercise(exercise_id)
            .await?
            .ok_or_else(|| EngineError::not_found("exercise", exercise_id))?;

        let is_correct = challenge::is_answer_correct(answer, &exercise.correct_answer);
        let points_earned = if is_correct {
            challenge::doubled_points(exercise.difficulty)
        } else {
            0
        };

        let attempt = DailyChallengeAttempt {
            id: AttemptId::new(),
            user_id,
            challenge_id,
            exercise_id,
            is_correct,
            points_earned,
            created_at: self.clock.now(),
        };
        match self.store.try_insert_attempt(attempt).await? {
            AttemptInsert::Duplicate(prior) => {
                tracing::debug!(%user_id, %exercise_id, "duplicate challenge submission ignored");
                Ok(ChallengeOutcome {
                    is_correct: prior.is_correct,
                    points_earned: 0,
                })
            }
            AttemptInsert::Inserted => {
                if is_correct {
                    let related = Some(challenge_id.into_inner());
                    self.record_points(
                        user_id,
                        ActionKind::DailyChallengeCompleted,
                        points_earned,
                        related,
                    )
                    .await?;
                    self.award_xp(user_id, u64::from(points_earned), "daily_challenge", related)
                        .await?;
                }
                Ok(ChallengeOutcome {
                    is_correct,
                    points_earned,
                })
            }
        }
    }

    /// Return whether the user has attempted every exercise in today's
    /// challenge. `false` when no challenge exists for today yet.
    pub async fn has_completed_today(&self, user_id: UserId) -> Result<bool, EngineError> {
        let Some(challenge) = self.store.challenge_for_date(self.clock.today()).await? else {
            return Ok(false);
        };
        let attempts = self
            .store
            .attempts_for_challenge(user_id, challenge.id)
            .await?;
        Ok(challenge
            .exercise_ids
            .iter()
            .all(|id| attempts.iter().any(|a| a.exercise_id == *id)))
    }

    // -----------------------------------------------------------------
    // Module completion
    // -----------------------------------------------------------------

    /// Check whether the user has just completed a module; on the first
    /// full completion, award the one-time bonus and re-evaluate mastery
    /// achievements.
    pub async fn check_module_completion(
        &self,
        user_id: UserId,
        module_id: ModuleId,
    ) -> Result<ModuleCompletionOutcome, EngineError> {
        let required = self
            .catalog
            .module_exercises(module_id)
            .await?
            .ok_or_else(|| EngineError::not_found("module", module_id))?;
        let completed = self.store.completed_exercises(user_id).await?;

        if !modules::is_module_complete(&required, &completed) {
            return Ok(ModuleCompletionOutcome {
                completed: false,
                bonus_awarded: false,
            });
        }

        match self
            .store
            .try_insert_module_completion(user_id, module_id, self.clock.now())
            .await?
        {
            InsertOutcome::AlreadyExists => Ok(ModuleCompletionOutcome {
                completed: true,
                bonus_awarded: false,
            }),
            InsertOutcome::Inserted => {
                let related = Some(module_id.into_inner());
                self.record_points(
                    user_id,
                    ActionKind::TaskCompleted,
                    modules::MODULE_BONUS_POINTS,
                    related,
                )
                .await?;
                self.award_xp(user_id, modules::MODULE_BONUS_XP, "module_completed", related)
                    .await?;
                let _ = self.check_and_award(user_id).await?;
                tracing::info!(%user_id, %module_id, "module completed, bonus awarded");
                Ok(ModuleCompletionOutcome {
                    completed: true,
                    bonus_awarded: true,
                })
            }
        }
    }
}
