//! Profile routes.
//!
//! `is_active` is derived storage-side from the subscription flag and is
//! never client-writable.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::models::{Operator, Profile};

pub fn profile_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .route("/create", post(create_profile))
}

#[derive(Deserialize)]
struct CreateProfileRequest {
    operator: String,
    #[serde(default)]
    is_subscribed: bool,
    #[serde(default)]
    credits: i64,
}

#[derive(Deserialize)]
struct UpdateProfileRequest {
    operator: Option<String>,
    is_subscribed: Option<bool>,
    credits: Option<i64>,
}

/// GET /profile
async fn get_profile(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .storage
        .get_profile(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(Json(profile))
}

/// POST /profile/create
async fn create_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let operator = Operator::parse(&request.operator)
        .ok_or_else(|| ApiError::bad_request(format!("unknown operator: {}", request.operator)))?;

    let mut profile = Profile::new(auth.user_id, auth.username.clone(), operator);
    profile.is_subscribed = request.is_subscribed;
    profile.credits = request.credits;

    let profile = state
        .storage
        .create_profile(profile)
        .await
        .map_err(|e| match e {
            crate::storage::StorageError::Conflict(_) => {
                ApiError::conflict("Profile already exists")
            }
            other => other.into(),
        })?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// PUT /profile
async fn update_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let mut profile = state
        .storage
        .get_profile(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    if let Some(operator) = request.operator {
        profile.operator = Operator::parse(&operator)
            .ok_or_else(|| ApiError::bad_request(format!("unknown operator: {}", operator)))?;
    }
    if let Some(is_subscribed) = request.is_subscribed {
        profile.is_subscribed = is_subscribed;
        if is_subscribed {
            profile.is_active = true;
        }
    }
    if let Some(credits) = request.credits {
        profile.credits = credits;
    }

    let profile = state.storage.update_profile(profile).await?;
    Ok(Json(profile))
}
