//! Digimart billing records: aggregator credentials and per-user
//! subscriber state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Credentials for the Digimart aggregator application. The latest record
/// is authoritative.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BillingApp {
    pub api_key: String,
    pub api_secret: String,
    pub api_password: String,
    pub app_id: String,
    pub redirect_url: String,
}

/// Subscription state reported by the aggregator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionStatus {
    Registered,
    Unregistered,
    Unknown,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Registered => "Registered",
            SubscriptionStatus::Unregistered => "Unregistered",
            SubscriptionStatus::Unknown => "Unknown",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Registered" => Some(SubscriptionStatus::Registered),
            "Unregistered" => Some(SubscriptionStatus::Unregistered),
            "Unknown" => Some(SubscriptionStatus::Unknown),
            _ => None,
        }
    }
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        SubscriptionStatus::Unknown
    }
}

/// Per-user billing state tracked across the subscribe/notify/confirm
/// webhook flow. The notification payloads are stored verbatim as JSON
/// text for troubleshooting with the aggregator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Subscriber {
    pub user_id: Uuid,
    pub plain_msisdn: String,
    pub masked_msisdn: String,
    #[serde(default)]
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub notification: String,
    #[serde(default)]
    pub confirmation: String,
}

impl Subscriber {
    pub fn new(user_id: Uuid, plain_msisdn: String) -> Self {
        Self {
            user_id,
            plain_msisdn,
            masked_msisdn: String::new(),
            status: SubscriptionStatus::Unknown,
            notification: String::new(),
            confirmation: String::new(),
        }
    }
}
