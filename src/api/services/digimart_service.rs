//! Digimart billing aggregator client.
//!
//! Builds the signed subscription authorize URL and proxies the
//! unregistration / charging-info calls to the partner API.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sha2::{Digest, Sha512};
use tracing::info;

const DEFAULT_SDK_BASE_URL: &str = "https://user.digimart.store";
const DEFAULT_API_BASE_URL: &str = "https://api.digimart.store";

use crate::models::BillingApp;

#[derive(Clone)]
pub struct DigimartService {
    http_client: reqwest::Client,
    sdk_base_url: String,
    api_base_url: String,
}

impl DigimartService {
    pub fn new(sdk_base_url: String, api_base_url: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            sdk_base_url,
            api_base_url,
        }
    }

    /// Partner base URLs, overridable for staging environments.
    pub fn from_env() -> Self {
        let sdk_base_url = std::env::var("DIGIMART_SDK_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_SDK_BASE_URL.to_string());
        let api_base_url = std::env::var("DIGIMART_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        Self::new(sdk_base_url, api_base_url)
    }

    /// Request id the aggregator expects: the msisdn zero-padded with a
    /// fixed four-character prefix.
    pub fn request_id(msisdn: &str) -> String {
        format!("0000{}", msisdn)
    }

    /// UTC timestamp with millisecond precision, e.g.
    /// `2024-05-01T09:30:00.123Z`.
    pub fn format_request_time(time: DateTime<Utc>) -> String {
        time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }

    /// SHA-512 hex digest over `apiKey|requestTime|apiSecret`.
    pub fn signature(api_key: &str, request_time: &str, api_secret: &str) -> String {
        let data = format!("{}|{}|{}", api_key, request_time, api_secret);
        let digest = Sha512::digest(data.as_bytes());
        hex::encode(digest)
    }

    /// Build the signed SDK authorize URL the mobile client opens to
    /// complete a subscription.
    pub fn authorize_url(&self, app: &BillingApp, msisdn: &str, now: DateTime<Utc>) -> String {
        let request_time = Self::format_request_time(now);
        let signature = Self::signature(&app.api_key, &request_time, &app.api_secret);
        format!(
            "{}/sdk/subscription/authorize?apiKey={}&requestId={}&requestTime={}&signature={}&redirectUrl={}&msisdn={}",
            self.sdk_base_url,
            urlencoding::encode(&app.api_key),
            urlencoding::encode(&Self::request_id(msisdn)),
            urlencoding::encode(&request_time),
            signature,
            urlencoding::encode(&app.redirect_url),
            urlencoding::encode(msisdn),
        )
    }

    /// POST to the partner unregistration endpoint; returns the partner's
    /// status code and JSON body untouched.
    pub async fn unregister(
        &self,
        app: &BillingApp,
        subscriber_id: &str,
        action: i32,
    ) -> Result<(u16, Value)> {
        let payload = json!({
            "applicationId": app.app_id,
            "password": app.api_password,
            "subscriberId": subscriber_id,
            "action": action,
        });

        let response = self
            .http_client
            .post(format!("{}/subs/unregistration", self.api_base_url))
            .json(&payload)
            .send()
            .await
            .context("Failed to send unregistration request to Digimart")?;

        let status = response.status().as_u16();
        let body: Value = response
            .json()
            .await
            .context("Failed to parse Digimart unregistration response")?;
        info!("Digimart unregistration responded with status {}", status);
        Ok((status, body))
    }

    /// POST to the partner charging-info endpoint; returns status and body.
    pub async fn charging_info(
        &self,
        app: &BillingApp,
        subscriber_id: &str,
    ) -> Result<(u16, Value)> {
        let payload = json!({
            "applicationId": app.app_id,
            "password": app.api_password,
            "subscriberId": subscriber_id,
        });

        let response = self
            .http_client
            .post(format!(
                "{}/subscription/subscriberChargingInfo",
                self.api_base_url
            ))
            .json(&payload)
            .send()
            .await
            .context("Failed to send charging info request to Digimart")?;

        let status = response.status().as_u16();
        let body: Value = response
            .json()
            .await
            .context("Failed to parse Digimart charging info response")?;
        info!("Digimart charging info responded with status {}", status);
        Ok((status, body))
    }
}
