//! Authentication context utilities.
//!
//! Provides the extractor that turns a Bearer token into the requesting
//! user's identity.

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use uuid::Uuid;

use super::app_state::AppState;
use crate::services::jwt_service::JwtService;

/// Authentication context extracted from the request
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(JwtService::extract_bearer_token)
            .ok_or_else(|| {
                tracing::warn!("No authorization token provided");
                StatusCode::UNAUTHORIZED
            })?;

        let claims = state.jwt_service.validate_access_token(token).map_err(|e| {
            tracing::warn!("JWT validation failed: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

        if claims.sub.is_empty() {
            tracing::warn!("JWT has empty subject claim");
            return Err(StatusCode::BAD_REQUEST);
        }

        Ok(AuthContext {
            user_id: claims.user_id,
            username: claims.sub,
        })
    }
}
