//! Integration tests for the rewards API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. The engine runs over the in-memory store and
//! catalog with a fixed clock, so routing, serialization, and status
//! mapping are validated end to end without a database.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use praxis_api::router::build_router;
use praxis_api::state::AppState;
use praxis_engine::store::{Catalog, RewardsStore};
use praxis_engine::{Clock, FixedClock, MemoryCatalog, MemoryStore, RewardsService};
use praxis_types::{Difficulty, Exercise, ExerciseId, ModuleId};

struct TestApp {
    router: Router,
    catalog: Arc<MemoryCatalog>,
}

async fn make_test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let catalog = Arc::new(MemoryCatalog::new());
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap(),
    ));
    let service = RewardsService::new(
        store as Arc<dyn RewardsStore>,
        Arc::clone(&catalog) as Arc<dyn Catalog>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    let state = Arc::new(AppState::new(service, clock as Arc<dyn Clock>));
    TestApp {
        router: build_router(state),
        catalog,
    }
}

async fn seed_exercises(catalog: &MemoryCatalog, n: usize) {
    for _ in 0..n {
        catalog
            .add_exercise(Exercise {
                id: ExerciseId::new(),
                module_id: None,
                prompt: "2 + 2 = ?".to_owned(),
                correct_answer: "4".to_owned(),
                difficulty: Difficulty::Moderate,
            })
            .await;
    }
}

fn post_json(path: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn index_serves_status_page() {
    let app = make_test_app().await;
    let response = app.router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn daily_login_dedup_over_http() {
    let app = make_test_app().await;
    let user = Uuid::new_v4();
    let body = json!({
        "user_id": user,
        "action_kind": "daily_login",
        "points": 2,
    });

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/points", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = json_body(response).await;
    assert_eq!(first["earned"], json!(true));
    assert_eq!(first["points"], json!(2));

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/points", &body))
        .await
        .unwrap();
    let repeat = json_body(response).await;
    assert_eq!(repeat["earned"], json!(false));
    assert_eq!(repeat["points"], json!(0));

    let response = app
        .router
        .oneshot(get(&format!("/api/points/{user}/summary")))
        .await
        .unwrap();
    let summary = json_body(response).await;
    assert_eq!(summary["today"], json!(2));
    assert_eq!(summary["all_time"], json!(2));
}

#[tokio::test]
async fn oversized_points_are_rejected() {
    let app = make_test_app().await;
    let body = json!({
        "user_id": Uuid::new_v4(),
        "action_kind": "video_watched",
        "points": 50_000,
    });
    let response = app
        .router
        .oneshot(post_json("/api/points", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn xp_grant_and_state() {
    let app = make_test_app().await;
    let user = Uuid::new_v4();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/xp",
            &json!({ "user_id": user, "amount": 115, "reason": "lesson" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let award = json_body(response).await;
    assert_eq!(award["state"]["level"], json!(2));
    assert_eq!(award["levels_gained"], json!([2]));

    let response = app
        .router
        .oneshot(get(&format!("/api/xp/{user}")))
        .await
        .unwrap();
    let state = json_body(response).await;
    assert_eq!(state["total_xp"], json!(115));
    assert_eq!(state["xp_to_next_level"], json!(185));
}

#[tokio::test]
async fn zero_xp_grant_is_accepted() {
    let app = make_test_app().await;
    let user = Uuid::new_v4();

    // amount >= 0 is valid; a zero grant is a no-op, not a 400.
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/xp",
            &json!({ "user_id": user, "amount": 0, "reason": "calibration" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let award = json_body(response).await;
    assert_eq!(award["state"]["total_xp"], json!(0));
    assert_eq!(award["state"]["level"], json!(1));
    assert_eq!(award["levels_gained"], json!([]));
}

#[tokio::test]
async fn streak_touch_defaults_to_today() {
    let app = make_test_app().await;
    let user = Uuid::new_v4();

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/streak", &json!({ "user_id": user })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let streak = json_body(response).await;
    assert_eq!(streak["current_streak"], json!(1));
    assert_eq!(streak["last_activity_date"], json!("2026-08-26"));

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/api/streak/{user}")))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["longest_streak"], json!(1));

    // Unknown user reads as null rather than 404.
    let response = app
        .router
        .oneshot(get(&format!("/api/streak/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, Value::Null);
}

#[tokio::test]
async fn achievement_catalog_and_check() {
    let app = make_test_app().await;
    let user = Uuid::new_v4();

    let response = app
        .router
        .clone()
        .oneshot(get("/api/achievements"))
        .await
        .unwrap();
    let catalog = json_body(response).await;
    assert_eq!(catalog.as_array().unwrap().len(), 8);

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/api/achievements/{user}")))
        .await
        .unwrap();
    let statuses = json_body(response).await;
    assert_eq!(statuses.as_array().unwrap().len(), 8);
    assert!(statuses
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s["unlocked"] == json!(false)));

    // A fresh user has nothing to award.
    let response = app
        .router
        .oneshot(post_json(
            &format!("/api/achievements/{user}/check"),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn challenge_flow_over_http() {
    let app = make_test_app().await;
    seed_exercises(&app.catalog, 10).await;
    let user = Uuid::new_v4();

    let response = app
        .router
        .clone()
        .oneshot(get("/api/challenge/today"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let challenge = json_body(response).await;
    let exercises = challenge["exercises"].as_array().unwrap();
    assert_eq!(exercises.len(), 3);
    // The correct answer never reaches the client.
    assert!(exercises.iter().all(|e| e.get("correct_answer").is_none()));

    let challenge_id = challenge["id"].clone();
    let exercise_id = exercises[0]["id"].clone();
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/challenge/submit",
            &json!({
                "user_id": user,
                "challenge_id": challenge_id,
                "exercise_id": exercise_id,
                "answer": "4",
            }),
        ))
        .await
        .unwrap();
    let outcome = json_body(response).await;
    assert_eq!(outcome["is_correct"], json!(true));
    assert_eq!(outcome["points_earned"], json!(20));

    let response = app
        .router
        .oneshot(get(&format!("/api/challenge/today/{user}/completed")))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["completed"], json!(false));
}

#[tokio::test]
async fn unknown_module_maps_to_not_found() {
    let app = make_test_app().await;
    let response = app
        .router
        .oneshot(post_json(
            &format!("/api/modules/{}/check", ModuleId::new()),
            &json!({ "user_id": Uuid::new_v4() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lesson_completion_returns_unlocks() {
    let app = make_test_app().await;
    let user = Uuid::new_v4();

    let response = app
        .router
        .oneshot(post_json(
            "/api/completions/lesson",
            &json!({
                "user_id": user,
                "lesson_id": Uuid::new_v4(),
                "points": 10,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let recorded = json_body(response).await;
    assert_eq!(recorded["points"]["earned"], json!(true));
    assert_eq!(recorded["xp"]["state"]["total_xp"], json!(10));
    assert!(recorded["achievements"]
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d["key"] == json!("first_lesson")));
}

#[tokio::test]
async fn incorrect_exercise_with_points_is_bad_request() {
    let app = make_test_app().await;
    let response = app
        .router
        .oneshot(post_json(
            "/api/completions/exercise",
            &json!({
                "user_id": Uuid::new_v4(),
                "exercise_id": Uuid::new_v4(),
                "is_correct": false,
                "points": 5,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
