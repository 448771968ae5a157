//! Performance validation integration tests

use axum::http::StatusCode;
use puzzle_panda_api::routes::{self, AppState};
use puzzle_panda_api::storage::StorageBackend;
use serde_json::{json, Value};

async fn seeded_server() -> (axum_test::TestServer, AppState, String) {
    let state = routes::create_app_state();
    state
        .storage
        .create_quiz("Capital of France?", "Paris,London,Rome,Berlin", "Paris")
        .await
        .unwrap();
    state
        .storage
        .create_quiz("Largest ocean?", "Atlantic,Pacific,Indian,Arctic", "Pacific")
        .await
        .unwrap();

    let app = routes::create_api_router().with_state(state.clone());
    let server = axum_test::TestServer::new(app).unwrap();

    server
        .post("/auth/register")
        .json(&json!({
            "primary_phone": "94771234567",
            "password": "secret123",
            "operator": "dialog",
        }))
        .await;
    let body: Value = server
        .post("/auth/token")
        .json(&json!({"username": "94771234567", "password": "secret123"}))
        .await
        .json();
    let token = body["access_token"].as_str().unwrap().to_string();

    (server, state, token)
}

async fn subscribe(server: &axum_test::TestServer, token: &str) {
    let response = server
        .put("/profile")
        .authorization_bearer(token)
        .json(&json!({"is_subscribed": true}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_validation_requires_subscription() {
    let (server, _state, token) = seeded_server().await;

    let response = server
        .post("/performance/validate")
        .authorization_bearer(&token)
        .json(&json!({"quiz_ids": [1], "user_answers": ["Paris"]}))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let body: Value = response.json();
    assert_eq!(body["error"], "User is not subscribed.");
}

#[tokio::test]
async fn test_first_submission_creates_daily_row() {
    let (server, _state, token) = seeded_server().await;
    subscribe(&server, &token).await;

    let response = server
        .post("/performance/validate")
        .authorization_bearer(&token)
        .json(&json!({
            "quiz_ids": [1, 2],
            "user_answers": ["Paris", "Atlantic"],
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["total_quizzes_played"], 1);
    assert_eq!(body["correct_answers"], 1);
    assert_eq!(body["wrong_answers"], 1);
}

#[tokio::test]
async fn test_second_submission_accumulates() {
    let (server, _state, token) = seeded_server().await;
    subscribe(&server, &token).await;

    server
        .post("/performance/validate")
        .authorization_bearer(&token)
        .json(&json!({"quiz_ids": [1], "user_answers": ["Paris"]}))
        .await;

    let response = server
        .post("/performance/validate")
        .authorization_bearer(&token)
        .json(&json!({
            "quiz_ids": [1, 2],
            "user_answers": ["London", "Pacific"],
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["total_quizzes_played"], 2);
    assert_eq!(body["correct_answers"], 2);
    assert_eq!(body["wrong_answers"], 1);
}

#[tokio::test]
async fn test_unknown_quiz_id_is_rejected() {
    let (server, _state, token) = seeded_server().await;
    subscribe(&server, &token).await;

    let response = server
        .post("/performance/validate")
        .authorization_bearer(&token)
        .json(&json!({"quiz_ids": [999], "user_answers": ["Paris"]}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "Quiz with ID 999 does not exist.");
}

#[tokio::test]
async fn test_empty_submission_is_rejected() {
    let (server, _state, token) = seeded_server().await;
    subscribe(&server, &token).await;

    let response = server
        .post("/performance/validate")
        .authorization_bearer(&token)
        .json(&json!({"quiz_ids": [], "user_answers": []}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_performance_listing() {
    let (server, _state, token) = seeded_server().await;
    subscribe(&server, &token).await;

    server
        .post("/performance/validate")
        .authorization_bearer(&token)
        .json(&json!({"quiz_ids": [1], "user_answers": ["Paris"]}))
        .await;

    let response = server
        .get("/performance")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["correct_answers"], 1);
}
