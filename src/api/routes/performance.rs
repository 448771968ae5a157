//! Performance tracking routes.
//!
//! Result validation is server-side: the client submits quiz ids and the
//! user's answers, the server scores them against the stored correct
//! answers and folds the result into the daily performance row.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::models::Performance;

pub fn performance_router() -> Router<AppState> {
    Router::new()
        .route("/", get(user_performance))
        .route("/validate", post(validate_result))
}

#[derive(Deserialize)]
struct ValidateResultRequest {
    #[serde(default)]
    quiz_ids: Vec<i64>,
    #[serde(default)]
    user_answers: Vec<String>,
}

/// GET /performance - the user's rows ordered by date played.
async fn user_performance(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<Performance>>, ApiError> {
    let rows = state.storage.list_performance(auth.user_id).await?;
    Ok(Json(rows))
}

/// POST /performance/validate
async fn validate_result(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<ValidateResultRequest>,
) -> Result<(StatusCode, Json<Performance>), ApiError> {
    let profile = state
        .storage
        .get_profile(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    if !profile.is_subscribed {
        return Err(ApiError::forbidden("User is not subscribed."));
    }

    if request.quiz_ids.is_empty() || request.user_answers.is_empty() {
        return Err(ApiError::bad_request(
            "Quiz IDs and User Answers are required.",
        ));
    }

    let mut correct = 0i64;
    let mut wrong = 0i64;
    for (quiz_id, answer) in request.quiz_ids.iter().zip(request.user_answers.iter()) {
        let quiz = state.storage.get_quiz(*quiz_id).await?.ok_or_else(|| {
            ApiError::bad_request(format!("Quiz with ID {} does not exist.", quiz_id))
        })?;
        if quiz.correct_answer == *answer {
            correct += 1;
        } else {
            wrong += 1;
        }
    }

    let today = Utc::now().date_naive();
    let (row, created) = state
        .storage
        .record_performance(auth.user_id, today, correct, wrong)
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(row)))
}
