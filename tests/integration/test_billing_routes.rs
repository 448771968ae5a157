//! Digimart billing integration tests
//!
//! Partner-proxying paths (`unsubscribe`, `status`) are only exercised on
//! their local error branches; everything else would call the aggregator.

use axum::http::StatusCode;
use puzzle_panda_api::models::BillingApp;
use puzzle_panda_api::routes::{self, AppState};
use puzzle_panda_api::storage::StorageBackend;
use serde_json::{json, Value};

fn test_billing_app() -> BillingApp {
    BillingApp {
        api_key: "panda-key".into(),
        api_secret: "panda-secret".into(),
        api_password: "panda-pass".into(),
        app_id: "APP_001".into(),
        redirect_url: "https://puzzlepanda.example/return".into(),
    }
}

async fn authed_server(with_billing_app: bool) -> (axum_test::TestServer, AppState, String) {
    let state = routes::create_app_state();
    if with_billing_app {
        state.storage.set_billing_app(test_billing_app()).await.unwrap();
    }

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

#[tokio::test]
async fn test_subscribe_returns_signed_authorize_url() {
    let (server, _state, token) = authed_server(true).await;

    let response = server
        .post("/billing/subscribe")
        .authorization_bearer(&token)
        .json(&json!({"msisdn": "771234567"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let url = body["api_endpoint"].as_str().unwrap();
    assert!(url.contains("/sdk/subscription/authorize?"));
    assert!(url.contains("apiKey=panda-key"));
    assert!(url.contains("requestId=0000771234567"));
    assert!(url.contains("msisdn=771234567"));
    assert!(url.contains("signature="));
}

#[tokio::test]
async fn test_subscribe_without_configuration() {
    let (server, _state, token) = authed_server(false).await;

    let response = server
        .post("/billing/subscribe")
        .authorization_bearer(&token)
        .json(&json!({"msisdn": "771234567"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert_eq!(body["error"], "DigimartSubscription configuration is missing.");
}

#[tokio::test]
async fn test_subscribe_derives_msisdn_from_profile_phone() {
    let (server, _state, token) = authed_server(true).await;

    // Registered phone is 94771234567; the country prefix is stripped.
    let body: Value = server
        .post("/billing/subscribe")
        .authorization_bearer(&token)
        .json(&json!({}))
        .await
        .json();
    let url = body["api_endpoint"].as_str().unwrap();
    assert!(url.contains("msisdn=771234567"));
    assert!(url.contains("requestId=0000771234567"));
}

#[tokio::test]
async fn test_notify_without_subscriber() {
    let (server, _state, token) = authed_server(true).await;

    let response = server
        .get("/billing/notify")
        .add_query_param("subscriberId", "MASKED_123")
        .add_query_param("status", "REGISTERED")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["error"], "Subscriber not found for the user.");
}

#[tokio::test]
async fn test_notify_registered_flips_profile_subscription() {
    let (server, _state, token) = authed_server(true).await;

    server
        .post("/billing/subscribe")
        .authorization_bearer(&token)
        .json(&json!({"msisdn": "771234567"}))
        .await;

    let response = server
        .get("/billing/notify")
        .add_query_param("subscriberId", "MASKED_123")
        .add_query_param("status", "REGISTERED")
        .add_query_param("applicationId", "APP_001")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let profile: Value = server
        .get("/profile")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(profile["is_subscribed"], true);
    assert_eq!(profile["is_active"], true);
}

#[tokio::test]
async fn test_confirm_requires_subscriber_id() {
    let (server, _state, _token) = authed_server(true).await;

    let response = server
        .post("/billing/confirm")
        .json(&json!({"status": "REGISTERED"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "subscriberId is required.");
}

#[tokio::test]
async fn test_confirm_with_unknown_subscriber_id() {
    let (server, _state, _token) = authed_server(true).await;

    let response = server
        .post("/billing/confirm")
        .json(&json!({"subscriberId": "MASKED_NOPE", "status": "REGISTERED"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_confirm_unregistered_clears_profile_subscription() {
    let (server, _state, token) = authed_server(true).await;

    server
        .post("/billing/subscribe")
        .authorization_bearer(&token)
        .json(&json!({"msisdn": "771234567"}))
        .await;
    server
        .get("/billing/notify")
        .add_query_param("subscriberId", "MASKED_123")
        .add_query_param("status", "REGISTERED")
        .authorization_bearer(&token)
        .await;

    // The confirm webhook is unauthenticated, keyed by the masked msisdn.
    let response = server
        .post("/billing/confirm")
        .json(&json!({"subscriberId": "MASKED_123", "status": "UNREGISTERED"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let profile: Value = server
        .get("/profile")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(profile["is_subscribed"], false);
    assert_eq!(profile["is_active"], false);
}

#[tokio::test]
async fn test_unsubscribe_without_subscriber() {
    let (server, _state, token) = authed_server(true).await;

    let response = server
        .post("/billing/unsubscribe")
        .authorization_bearer(&token)
        .json(&json!({"action": 1}))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["error"], "Subscriber not found.");
}

#[tokio::test]
async fn test_unsubscribe_action_defaults_to_zero() {
    let (server, _state, token) = authed_server(true).await;

    // An empty body is valid; the action field defaults. The lookup still
    // runs, so a user with no subscriber gets the 404 rather than a 422.
    let response = server
        .post("/billing/unsubscribe")
        .authorization_bearer(&token)
        .json(&json!({}))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_without_subscriber() {
    let (server, _state, token) = authed_server(true).await;

    let response = server
        .get("/billing/status")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
