//! Daily spin reward routes.
//!
//! Each user gets five spins per day; coins won on a spin are credited to
//! the profile balance.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::models::Spin;

pub fn spin_router() -> Router<AppState> {
    Router::new().route("/", get(get_spin).post(record_spin))
}

#[derive(Deserialize)]
struct SpinRequest {
    gift: Option<String>,
    #[serde(default)]
    coins: i64,
}

/// GET /spin - today's spin record, created on first access.
async fn get_spin(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Spin>, ApiError> {
    let today = Utc::now().date_naive();
    let spin = state.storage.get_or_create_spin(auth.user_id, today).await?;
    Ok(Json(spin))
}

/// POST /spin - take a spin, crediting any coins won.
async fn record_spin(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<SpinRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let today = Utc::now().date_naive();
    let mut spin = state.storage.get_or_create_spin(auth.user_id, today).await?;

    if spin.limit_reached() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Daily spin limit reached"})),
        ));
    }

    spin.count += 1;
    let spin = state.storage.put_spin(spin).await?;

    if request.coins > 0 {
        match state.storage.add_credits(auth.user_id, request.coins).await {
            Ok(_) => {}
            Err(e) => warn!("Could not credit spin coins for {}: {}", auth.user_id, e),
        }
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Spin count updated successfully",
            "count": spin.count,
            "gift": request.gift,
            "coins": request.coins,
        })),
    ))
}
