//! Digimart billing routes.
//!
//! The subscription lifecycle: the app requests a signed authorize URL
//! (`subscribe`), the aggregator reports back through `notify` and the
//! public `confirm` webhook, and `unsubscribe`/`status` proxy the
//! partner's registration API. Subscriber state transitions
//! Unknown -> Registered -> Unregistered are driven entirely by the
//! aggregator's callbacks.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiError;
use crate::models::{BillingApp, Subscriber, SubscriptionStatus};

pub fn billing_router() -> Router<AppState> {
    Router::new()
        .route("/subscribe", post(subscribe))
        .route("/notify", get(notify))
        .route("/confirm", post(confirm))
        .route("/unsubscribe", post(unsubscribe))
        .route("/status", get(subscription_status))
}

#[derive(Deserialize)]
struct SubscribeRequest {
    msisdn: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotifyParams {
    time_stamp: Option<String>,
    subscriber_id: Option<String>,
    application_id: Option<String>,
    version: Option<String>,
    frequency: Option<String>,
    status: Option<String>,
    subscriber_request_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmRequest {
    time_stamp: Option<String>,
    subscriber_id: Option<String>,
    application_id: Option<String>,
    version: Option<String>,
    frequency: Option<String>,
    status: Option<String>,
}

#[derive(Deserialize)]
struct UnsubscribeRequest {
    #[serde(default)]
    action: i32,
}

async fn billing_app(state: &AppState) -> Result<BillingApp, ApiError> {
    state
        .storage
        .get_billing_app()
        .await?
        .ok_or_else(|| ApiError::internal("DigimartSubscription configuration is missing."))
}

/// POST /billing/subscribe - build the signed authorize URL for the
/// mobile client and remember the msisdn being subscribed.
async fn subscribe(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<Value>, ApiError> {
    let msisdn = match request.msisdn.filter(|m| !m.is_empty()) {
        Some(m) => m,
        None => {
            // Fall back to the profile phone with the country-code prefix
            // (two leading characters) stripped.
            let profile = state.storage.get_profile(auth.user_id).await?;
            profile
                .and_then(|p| p.primary_phone.get(2..).map(|s| s.to_string()))
                .filter(|m| !m.is_empty())
                .ok_or_else(|| {
                    ApiError::bad_request("msisdn is required and not found in profile")
                })?
        }
    };

    let app = billing_app(&state).await?;
    let api_endpoint = state.digimart.authorize_url(&app, &msisdn, Utc::now());

    let subscriber = match state.storage.get_subscriber(auth.user_id).await? {
        Some(mut existing) => {
            existing.plain_msisdn = msisdn.clone();
            existing
        }
        None => Subscriber::new(auth.user_id, msisdn.clone()),
    };
    state.storage.upsert_subscriber(subscriber).await?;

    info!("Issued Digimart authorize URL for msisdn {}", msisdn);
    Ok(Json(json!({"api_endpoint": api_endpoint})))
}

/// GET /billing/notify - aggregator notification for the requesting user.
async fn notify(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(params): Query<NotifyParams>,
) -> Result<Json<Value>, ApiError> {
    let mut subscriber = state
        .storage
        .get_subscriber(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Subscriber not found for the user."))?;

    if let Some(subscriber_id) = params.subscriber_id.as_deref().filter(|s| !s.is_empty()) {
        subscriber.masked_msisdn = subscriber_id.to_string();
    }
    if params.status.as_deref() == Some("REGISTERED") {
        subscriber.status = SubscriptionStatus::Registered;
        // A registered subscriber is a paying user; flip the profile too.
        if let Some(mut profile) = state.storage.get_profile(auth.user_id).await? {
            profile.is_subscribed = true;
            profile.is_active = true;
            state.storage.update_profile(profile).await?;
        }
    }

    let payload = json!({
        "timeStamp": params.time_stamp,
        "subscriberId": params.subscriber_id,
        "applicationId": params.application_id,
        "version": params.version,
        "frequency": params.frequency,
        "status": params.status,
        "subscriberRequestId": params.subscriber_request_id,
    });
    subscriber.notification = payload.to_string();
    state.storage.upsert_subscriber(subscriber).await?;

    Ok(Json(json!({
        "message": "Subscription notification updated successfully."
    })))
}

/// POST /billing/confirm - public webhook, keyed by the masked msisdn the
/// aggregator assigned.
async fn confirm(
    State(state): State<AppState>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<Value>, ApiError> {
    let subscriber_id = request
        .subscriber_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("subscriberId is required."))?;

    let mut subscriber = state
        .storage
        .get_subscriber_by_masked_msisdn(subscriber_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Subscriber not found for the subscriberId."))?;

    match request.status.as_deref() {
        Some("REGISTERED") => {
            subscriber.status = SubscriptionStatus::Registered;
        }
        Some("UNREGISTERED") => {
            subscriber.status = SubscriptionStatus::Unregistered;
            if let Some(mut profile) = state.storage.get_profile(subscriber.user_id).await? {
                profile.is_subscribed = false;
                state.storage.update_profile(profile).await?;
            }
        }
        _ => {}
    }

    let payload = json!({
        "timeStamp": request.time_stamp,
        "subscriberId": request.subscriber_id,
        "applicationId": request.application_id,
        "version": request.version,
        "frequency": request.frequency,
        "status": request.status,
    });
    subscriber.confirmation = payload.to_string();
    state.storage.upsert_subscriber(subscriber).await?;

    Ok(Json(json!({
        "message": "Subscription confirmation notification updated successfully."
    })))
}

/// POST /billing/unsubscribe - proxy to the partner unregistration API,
/// passing the partner's status code and body through.
async fn unsubscribe(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<UnsubscribeRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let subscriber = state
        .storage
        .get_subscriber(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Subscriber not found."))?;
    let app = billing_app(&state).await?;

    let (status, body) = state
        .digimart
        .unregister(&app, &subscriber.masked_msisdn, request.action)
        .await
        .map_err(|e| {
            warn!("Digimart unregistration failed: {}", e);
            ApiError::bad_gateway(e.to_string())
        })?;

    Ok((
        StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
        Json(json!({"message": body})),
    ))
}

/// GET /billing/status - proxy to the partner charging-info API.
async fn subscription_status(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let subscriber = state
        .storage
        .get_subscriber(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Subscriber not found."))?;
    let app = billing_app(&state).await?;

    let (status, body) = state
        .digimart
        .charging_info(&app, &subscriber.masked_msisdn)
        .await
        .map_err(|e| {
            warn!("Digimart charging info failed: {}", e);
            ApiError::bad_gateway(e.to_string())
        })?;

    Ok((
        StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
        Json(json!({"message": body})),
    ))
}
