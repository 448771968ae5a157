//! Quiz delivery routes.
//!
//! Payload fields travel base64-obfuscated; `options` is split into a
//! list before encoding.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use rand::seq::SliceRandom;
use serde::Serialize;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::models::Quiz;
use crate::services::quiz_codec;

const DEFAULT_QUIZ_COUNT: i64 = 10;

pub fn quizzes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_quizzes))
        .route("/play-again", get(play_again))
}

/// Quiz wire representation, all text fields base64 encoded.
#[derive(Serialize)]
pub struct QuizResponse {
    pub id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuizResponse {
    fn from_quiz(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            question: quiz_codec::encode(&quiz.question),
            options: quiz
                .options_list()
                .iter()
                .map(|o| quiz_codec::encode(o))
                .collect(),
            correct_answer: quiz_codec::encode(&quiz.correct_answer),
        }
    }
}

fn parse_count(params: &HashMap<String, String>) -> Result<i64, ApiError> {
    match params.get("n") {
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| ApiError::bad_request("Invalid value for 'n'")),
        None => Ok(DEFAULT_QUIZ_COUNT),
    }
}

/// GET /quizzes?n=10
async fn list_quizzes(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<QuizResponse>>, ApiError> {
    let n = parse_count(&params)?;
    let quizzes = state.storage.list_quizzes(n).await?;
    Ok(Json(quizzes.iter().map(QuizResponse::from_quiz).collect()))
}

/// GET /quizzes/play-again?n=10 - random sample without replacement,
/// clamped to the number of available quizzes.
async fn play_again(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<QuizResponse>>, ApiError> {
    let n = parse_count(&params)?;
    let total = state.storage.count_quizzes().await?;
    let n = n.min(total);

    let pool = state.storage.list_quizzes(total).await?;
    let sample: Vec<QuizResponse> = pool
        .choose_multiple(&mut rand::thread_rng(), n as usize)
        .map(QuizResponse::from_quiz)
        .collect();

    Ok(Json(sample))
}
