//! API routes module - organizes all route handlers.

pub mod app_state;
pub mod auth;
pub mod auth_context;
pub mod billing;
pub mod content;
pub mod error;
pub mod performance;
pub mod profile;
pub mod quizzes;
pub mod spin;

use axum::Router;
pub use app_state::AppState;

/// Create the main API router combining all route modules.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::auth_router())
        .nest("/profile", profile::profile_router())
        .nest("/quizzes", quizzes::quizzes_router())
        .nest("/faqs", content::faqs_router())
        .nest("/sliders", content::sliders_router())
        .nest("/performance", performance::performance_router())
        .nest("/spin", spin::spin_router())
        .nest("/billing", billing::billing_router())
    // Note: State is applied by callers (e.g. TestServer setups) via
    // .with_state(app_state) after creating the router.
}

/// Create the application state (in-memory storage).
pub fn create_app_state() -> AppState {
    AppState::new()
}

/// Create the application state with storage initialization (async).
///
/// This is the preferred method for production use: it switches to
/// PostgreSQL when DATABASE_URL is configured.
pub async fn create_app_state_with_storage() -> Result<AppState, crate::storage::StorageError> {
    let mut state = AppState::new();
    state.init_storage().await?;
    Ok(state)
}
