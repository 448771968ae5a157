//! Public content routes: FAQs and promotional sliders.

use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;

use super::app_state::AppState;
use super::error::ApiError;
use crate::models::Faq;

pub fn faqs_router() -> Router<AppState> {
    Router::new().route("/", get(list_faqs))
}

pub fn sliders_router() -> Router<AppState> {
    Router::new().route("/", get(list_sliders))
}

#[derive(Serialize)]
struct SliderResponse {
    id: i64,
    image: String,
    image_url: String,
}

/// GET /faqs
async fn list_faqs(State(state): State<AppState>) -> Result<Json<Vec<Faq>>, ApiError> {
    let faqs = state.storage.list_faqs().await?;
    Ok(Json(faqs))
}

/// GET /sliders
async fn list_sliders(
    State(state): State<AppState>,
) -> Result<Json<Vec<SliderResponse>>, ApiError> {
    let base = state.public_base_url.trim_end_matches('/');
    let sliders = state.storage.list_sliders().await?;
    Ok(Json(
        sliders
            .into_iter()
            .map(|s| SliderResponse {
                image_url: format!("{}/media/{}", base, s.image),
                id: s.id,
                image: s.image,
            })
            .collect(),
    ))
}
