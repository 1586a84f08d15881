//! REST API endpoint handlers for the rewards server.
//!
//! All handlers delegate to the [`RewardsService`] in the shared
//! [`AppState`]; no business rules live here. Request bodies are
//! validated with [`validator`] before they reach the engine.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `POST` | `/api/points` | Record a point-earning activity |
//! | `GET` | `/api/points/:user_id/summary` | Points summary windows |
//! | `POST` | `/api/xp` | Grant XP |
//! | `GET` | `/api/xp/:user_id` | Current XP state |
//! | `POST` | `/api/streak` | Apply an activity day to the streak |
//! | `GET` | `/api/streak/:user_id` | Current streak state |
//! | `GET` | `/api/achievements` | Achievement catalog |
//! | `GET` | `/api/achievements/:user_id` | Per-user unlock status |
//! | `POST` | `/api/achievements/:user_id/check` | Re-evaluate and award |
//! | `GET` | `/api/challenge/today` | Today's challenge (answers withheld) |
//! | `POST` | `/api/challenge/submit` | Submit a challenge answer |
//! | `GET` | `/api/challenge/today/:user_id/completed` | Completion check |
//! | `POST` | `/api/modules/:module_id/check` | Module completion check |
//! | `POST` | `/api/completions/exercise` | Record an exercise completion |
//! | `POST` | `/api/completions/lesson` | Record a lesson completion |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use praxis_engine::CompletionRecorded;
use praxis_types::{
    AchievementDefinition, AchievementDelta, AchievementStatus, ActionKind, ChallengeId,
    ChallengeOutcome, Difficulty, ExerciseId, LessonId, ModuleCompletionOutcome, ModuleId,
    PointsOutcome, PointsSummary, StreakState, UserId, XpAward, XpState,
};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body for `POST /api/points`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct RecordPointsRequest {
    /// The acting user.
    pub user_id: Uuid,
    /// What the user did.
    pub action_kind: ActionKind,
    /// Points to credit.
    #[validate(range(max = 10_000))]
    pub points: u32,
    /// Optional related entity (lesson, video, exercise).
    pub related_id: Option<Uuid>,
}

/// Body for `POST /api/xp`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct GrantXpRequest {
    /// The receiving user.
    pub user_id: Uuid,
    /// XP amount to grant. Zero is valid and changes nothing.
    #[validate(range(max = 100_000))]
    pub amount: u64,
    /// Why the XP was granted.
    #[validate(length(min = 1, max = 200))]
    pub reason: String,
    /// Optional related entity.
    pub related_id: Option<Uuid>,
}

/// Body for `POST /api/streak`.
#[derive(Debug, serde::Deserialize)]
pub struct TouchStreakRequest {
    /// The acting user.
    pub user_id: Uuid,
    /// Activity date; defaults to the server-local today.
    pub date: Option<NaiveDate>,
}

/// Body for `POST /api/challenge/submit`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    /// The answering user.
    pub user_id: Uuid,
    /// The challenge being answered.
    pub challenge_id: Uuid,
    /// The exercise within the challenge.
    pub exercise_id: Uuid,
    /// The submitted answer.
    #[validate(length(min = 1, max = 1_000))]
    pub answer: String,
}

/// Body for `POST /api/modules/:module_id/check`.
#[derive(Debug, serde::Deserialize)]
pub struct ModuleCheckRequest {
    /// The user whose progress is checked.
    pub user_id: Uuid,
}

/// Body for `POST /api/completions/exercise`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct ExerciseCompletionRequest {
    /// The acting user.
    pub user_id: Uuid,
    /// The completed exercise.
    pub exercise_id: Uuid,
    /// Whether the answer was correct.
    pub is_correct: bool,
    /// Points to credit; must be 0 for an incorrect answer.
    #[validate(range(max = 10_000))]
    pub points: u32,
}

/// Body for `POST /api/completions/lesson`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct LessonCompletionRequest {
    /// The acting user.
    pub user_id: Uuid,
    /// The completed lesson.
    pub lesson_id: Uuid,
    /// Points to credit.
    #[validate(range(max = 10_000))]
    pub points: u32,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// One challenge exercise as presented to the client. The correct
/// answer never leaves the server.
#[derive(Debug, serde::Serialize)]
pub struct ChallengeExercise {
    /// Exercise ID to submit answers against.
    pub id: ExerciseId,
    /// The question text.
    pub prompt: String,
    /// Difficulty, which determines the doubled point value.
    pub difficulty: Difficulty,
}

/// Response for `GET /api/challenge/today`.
#[derive(Debug, serde::Serialize)]
pub struct TodayChallengeResponse {
    /// Challenge ID to submit answers against.
    pub id: ChallengeId,
    /// The calendar date the challenge belongs to.
    pub challenge_date: NaiveDate,
    /// The selected exercises, answers withheld.
    pub exercises: Vec<ChallengeExercise>,
}

/// Response for `GET /api/challenge/today/:user_id/completed`.
#[derive(Debug, serde::Serialize)]
pub struct ChallengeCompletedResponse {
    /// Whether every exercise in today's challenge has been attempted.
    pub completed: bool,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page listing the API surface.
pub async fn index() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Praxis Rewards API</title>
    <style>
        body {
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }
        h1 { color: #58a6ff; margin-bottom: 0.25rem; }
        .subtitle { color: #8b949e; margin-top: 0; }
        ul { list-style: none; padding: 0; }
        li { padding: 0.3rem 0; }
        code { color: #7ee787; }
        .status { color: #3fb950; font-weight: bold; }
    </style>
</head>
<body>
    <h1>Praxis Rewards API</h1>
    <p class="subtitle">Progression and rewards engine</p>
    <p>Status: <span class="status">RUNNING</span></p>
    <ul>
        <li><code>POST</code> /api/points</li>
        <li><code>GET</code> /api/points/{user_id}/summary</li>
        <li><code>POST</code> /api/xp</li>
        <li><code>GET</code> /api/xp/{user_id}</li>
        <li><code>POST</code> /api/streak</li>
        <li><code>GET</code> /api/streak/{user_id}</li>
        <li><code>GET</code> /api/achievements</li>
        <li><code>GET</code> /api/achievements/{user_id}</li>
        <li><code>POST</code> /api/achievements/{user_id}/check</li>
        <li><code>GET</code> /api/challenge/today</li>
        <li><code>POST</code> /api/challenge/submit</li>
        <li><code>GET</code> /api/challenge/today/{user_id}/completed</li>
        <li><code>POST</code> /api/modules/{module_id}/check</li>
        <li><code>POST</code> /api/completions/exercise</li>
        <li><code>POST</code> /api/completions/lesson</li>
    </ul>
</body>
</html>"#,
    )
}

// ---------------------------------------------------------------------------
// Points
// ---------------------------------------------------------------------------

/// `POST /api/points` -- record a point-earning activity.
pub async fn record_points(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecordPointsRequest>,
) -> Result<Json<PointsOutcome>, ApiError> {
    req.validate()?;
    let outcome = state
        .service
        .record_points(
            UserId::from(req.user_id),
            req.action_kind,
            req.points,
            req.related_id,
        )
        .await?;
    Ok(Json(outcome))
}

/// `GET /api/points/:user_id/summary` -- calendar-window totals.
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PointsSummary>, ApiError> {
    let summary = state.service.get_summary(UserId::from(user_id)).await?;
    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// XP
// ---------------------------------------------------------------------------

/// `POST /api/xp` -- grant XP.
pub async fn grant_xp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GrantXpRequest>,
) -> Result<Json<XpAward>, ApiError> {
    req.validate()?;
    let award = state
        .service
        .award_xp(
            UserId::from(req.user_id),
            req.amount,
            &req.reason,
            req.related_id,
        )
        .await?;
    Ok(Json(award))
}

/// `GET /api/xp/:user_id` -- current XP state.
pub async fn get_xp_state(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<XpState>, ApiError> {
    let xp = state.service.get_xp_state(UserId::from(user_id)).await?;
    Ok(Json(xp))
}

// ---------------------------------------------------------------------------
// Streaks
// ---------------------------------------------------------------------------

/// `POST /api/streak` -- apply an activity day to the streak.
pub async fn touch_streak(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TouchStreakRequest>,
) -> Result<Json<StreakState>, ApiError> {
    let day = req.date.unwrap_or_else(|| state.clock.today());
    let streak = state
        .service
        .touch_streak(UserId::from(req.user_id), day)
        .await?;
    Ok(Json(streak))
}

/// `GET /api/streak/:user_id` -- current streak state, `null` for a
/// user with no recorded activity.
pub async fn get_streak(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Option<StreakState>>, ApiError> {
    let streak = state.service.get_streak(UserId::from(user_id)).await?;
    Ok(Json(streak))
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

/// `GET /api/achievements` -- the static achievement catalog.
pub async fn list_achievements(
    State(state): State<Arc<AppState>>,
) -> Json<&'static [AchievementDefinition]> {
    Json(state.service.list_definitions())
}

/// `GET /api/achievements/:user_id` -- unlock status per definition.
pub async fn get_user_achievements(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<AchievementStatus>>, ApiError> {
    let statuses = state
        .service
        .get_user_achievements(UserId::from(user_id))
        .await?;
    Ok(Json(statuses))
}

/// `POST /api/achievements/:user_id/check` -- re-evaluate and award.
pub async fn check_and_award(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<AchievementDelta>>, ApiError> {
    let deltas = state.service.check_and_award(UserId::from(user_id)).await?;
    Ok(Json(deltas))
}

// ---------------------------------------------------------------------------
// Daily challenge
// ---------------------------------------------------------------------------

/// `GET /api/challenge/today` -- today's challenge with answers
/// withheld.
pub async fn get_today_challenge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TodayChallengeResponse>, ApiError> {
    let (challenge, exercises) = state.service.get_today_challenge().await?;
    Ok(Json(TodayChallengeResponse {
        id: challenge.id,
        challenge_date: challenge.challenge_date,
        exercises: exercises
            .into_iter()
            .map(|e| ChallengeExercise {
                id: e.id,
                prompt: e.prompt,
                difficulty: e.difficulty,
            })
            .collect(),
    }))
}

/// `POST /api/challenge/submit` -- submit an answer.
pub async fn submit_challenge_answer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<ChallengeOutcome>, ApiError> {
    req.validate()?;
    let outcome = state
        .service
        .submit_challenge_answer(
            UserId::from(req.user_id),
            ChallengeId::from(req.challenge_id),
            ExerciseId::from(req.exercise_id),
            &req.answer,
        )
        .await?;
    Ok(Json(outcome))
}

/// `GET /api/challenge/today/:user_id/completed` -- whether the user
/// has attempted every exercise in today's challenge.
pub async fn has_completed_today(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ChallengeCompletedResponse>, ApiError> {
    let completed = state
        .service
        .has_completed_today(UserId::from(user_id))
        .await?;
    Ok(Json(ChallengeCompletedResponse { completed }))
}

// ---------------------------------------------------------------------------
// Modules and completions
// ---------------------------------------------------------------------------

/// `POST /api/modules/:module_id/check` -- detect module completion and
/// award the one-time bonus.
pub async fn check_module_completion(
    State(state): State<Arc<AppState>>,
    Path(module_id): Path<Uuid>,
    Json(req): Json<ModuleCheckRequest>,
) -> Result<Json<ModuleCompletionOutcome>, ApiError> {
    let outcome = state
        .service
        .check_module_completion(UserId::from(req.user_id), ModuleId::from(module_id))
        .await?;
    Ok(Json(outcome))
}

/// `POST /api/completions/exercise` -- record an exercise completion.
pub async fn record_exercise_completion(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExerciseCompletionRequest>,
) -> Result<Json<CompletionRecorded>, ApiError> {
    req.validate()?;
    let recorded = state
        .service
        .record_exercise_completion(
            UserId::from(req.user_id),
            ExerciseId::from(req.exercise_id),
            req.is_correct,
            req.points,
        )
        .await?;
    Ok(Json(recorded))
}

/// `POST /api/completions/lesson` -- record a lesson completion.
pub async fn record_lesson_completion(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LessonCompletionRequest>,
) -> Result<Json<CompletionRecorded>, ApiError> {
    req.validate()?;
    let recorded = state
        .service
        .record_lesson_completion(
            UserId::from(req.user_id),
            LessonId::from(req.lesson_id),
            req.points,
        )
        .await?;
    Ok(Json(recorded))
}
