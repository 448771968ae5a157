//! Daily spin reward tracking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum spins a user may take per day.
pub const DAILY_SPIN_LIMIT: i32 = 5;

/// Spin counter, one row per user per day.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Spin {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub count: i32,
}

impl Spin {
    pub fn new(user_id: Uuid, date: NaiveDate) -> Self {
        Self {
            user_id,
            date,
            count: 0,
        }
    }

    pub fn limit_reached(&self) -> bool {
        self.count >= DAILY_SPIN_LIMIT
    }
}
