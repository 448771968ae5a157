//! Authentication routes: registration and JWT token management.
//!
//! - Registration creates the account plus an unsubscribed profile; the
//!   primary phone number doubles as the username.
//! - Token obtain/refresh/verify mirror the usual token-pair flow with
//!   time-scoped access tokens (15 minutes) and refresh tokens (7 days).

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::app_state::AppState;
use super::error::ApiError;
use crate::models::{Operator, Profile};
use crate::services::jwt_service::TokenPair;
use crate::services::password;
use crate::storage::StorageError;

/// Create the auth router
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(obtain_token))
        .route("/token/refresh", post(refresh_token))
        .route("/token/verify", post(verify_token))
}

#[derive(Deserialize)]
struct RegisterRequest {
    primary_phone: String,
    password: String,
    operator: String,
}

#[derive(Deserialize)]
struct TokenRequest {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct RefreshTokenRequest {
    refresh_token: String,
}

#[derive(Deserialize)]
struct VerifyTokenRequest {
    token: String,
}

/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if request.primary_phone.trim().is_empty() {
        return Err(ApiError::bad_request("primary_phone is required"));
    }
    if request.password.is_empty() {
        return Err(ApiError::bad_request("password is required"));
    }
    let operator = Operator::parse(&request.operator)
        .ok_or_else(|| ApiError::bad_request(format!("unknown operator: {}", request.operator)))?;

    let password_hash = password::hash_password(&request.password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal("Internal server error")
    })?;

    // The phone number is the username; a duplicate phone is a duplicate
    // account.
    let user = state
        .storage
        .create_user(&request.primary_phone, &password_hash)
        .await
        .map_err(|e| match e {
            StorageError::Conflict(_) => {
                ApiError::conflict("A user with that phone number already exists.")
            }
            other => other.into(),
        })?;

    state
        .storage
        .create_profile(Profile::new(user.id, request.primary_phone.clone(), operator))
        .await?;

    info!("Registered user {}", user.username);
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "User registered successfully"})),
    ))
}

/// POST /auth/token
async fn obtain_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let user = state
        .storage
        .get_user_by_username(&request.username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let valid = password::verify_password(&request.password, &user.password_hash).map_err(|e| {
        tracing::error!("Password verification failed: {}", e);
        ApiError::internal("Internal server error")
    })?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let pair = state
        .jwt_service
        .generate_token_pair(&user.username, user.id)
        .map_err(|e| {
            tracing::error!("Token generation failed: {}", e);
            ApiError::internal("Internal server error")
        })?;
    Ok(Json(pair))
}

/// POST /auth/token/refresh
async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let pair = state
        .jwt_service
        .refresh_access_token(&request.refresh_token)
        .map_err(ApiError::unauthorized)?;
    Ok(Json(pair))
}

/// POST /auth/token/verify
async fn verify_token(
    State(state): State<AppState>,
    Json(request): Json<VerifyTokenRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .jwt_service
        .validate_access_token(&request.token)
        .map_err(ApiError::unauthorized)?;
    Ok(Json(json!({})))
}
