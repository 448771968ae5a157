//! Daily performance tracking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row per user per day. Counters accumulate across submissions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Performance {
    pub user_id: Uuid,
    pub date_played: NaiveDate,
    pub total_quizzes_played: i64,
    pub correct_answers: i64,
    pub wrong_answers: i64,
}
