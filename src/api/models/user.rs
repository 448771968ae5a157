//! User accounts and profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Telecom operators supported for registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Dialog,
    Mobitel,
    Hutch,
    Airtel,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Dialog => "dialog",
            Operator::Mobitel => "mobitel",
            Operator::Hutch => "hutch",
            Operator::Airtel => "airtel",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "dialog" => Some(Operator::Dialog),
            "mobitel" => Some(Operator::Mobitel),
            "hutch" => Some(Operator::Hutch),
            "airtel" => Some(Operator::Airtel),
            _ => None,
        }
    }
}

/// Registered account. The username is the primary phone number.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Per-user profile: phone, operator, subscription flag and credit balance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub primary_phone: String,
    pub operator: Operator,
    #[serde(default)]
    pub is_subscribed: bool,
    #[serde(default)]
    pub credits: i64,
    #[serde(default)]
    pub is_active: bool,
}

impl Profile {
    pub fn new(user_id: Uuid, primary_phone: String, operator: Operator) -> Self {
        Self {
            user_id,
            primary_phone,
            operator,
            is_subscribed: false,
            credits: 0,
            is_active: false,
        }
    }

    /// An unsubscribed profile can never be active. Storage backends call
    /// this before every write.
    pub fn normalized(mut self) -> Self {
        if !self.is_subscribed {
            self.is_active = false;
        }
        self
    }
}
