//! Storage trait definitions for the API storage backends.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{BillingApp, Faq, Performance, Profile, Quiz, Slider, Spin, Subscriber, User};

/// Storage backend trait for database operations.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    // --- users ---

    /// Create a user account. Fails with Conflict on a duplicate username.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, super::StorageError>;

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, super::StorageError>;

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, super::StorageError>;

    // --- profiles ---

    /// Create a profile for a user. Fails with Conflict if one exists.
    async fn create_profile(&self, profile: Profile) -> Result<Profile, super::StorageError>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, super::StorageError>;

    /// Persist a profile. Backends apply `Profile::normalized` so an
    /// unsubscribed profile is never stored active.
    async fn update_profile(&self, profile: Profile) -> Result<Profile, super::StorageError>;

    /// Add (or with a negative amount, remove) credits on a profile.
    async fn add_credits(
        &self,
        user_id: Uuid,
        amount: i64,
    ) -> Result<Profile, super::StorageError>;

    // --- quizzes ---

    async fn create_quiz(
        &self,
        question: &str,
        options: &str,
        correct_answer: &str,
    ) -> Result<Quiz, super::StorageError>;

    /// First `limit` quizzes in id order.
    async fn list_quizzes(&self, limit: i64) -> Result<Vec<Quiz>, super::StorageError>;

    async fn count_quizzes(&self) -> Result<i64, super::StorageError>;

    async fn get_quiz(&self, quiz_id: i64) -> Result<Option<Quiz>, super::StorageError>;

    async fn get_quizzes_by_ids(&self, ids: &[i64]) -> Result<Vec<Quiz>, super::StorageError>;

    // --- content ---

    async fn create_faq(&self, question: &str, answer: &str) -> Result<Faq, super::StorageError>;

    async fn list_faqs(&self) -> Result<Vec<Faq>, super::StorageError>;

    async fn create_slider(&self, image: &str) -> Result<Slider, super::StorageError>;

    async fn list_sliders(&self) -> Result<Vec<Slider>, super::StorageError>;

    // --- performance ---

    async fn get_performance(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Performance>, super::StorageError>;

    /// Record one play session: creates the daily row with
    /// `total_quizzes_played = 1`, or increments it and adds the counters.
    /// Returns the row and whether it was created.
    async fn record_performance(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        correct: i64,
        wrong: i64,
    ) -> Result<(Performance, bool), super::StorageError>;

    /// All performance rows for a user, ordered by date played.
    async fn list_performance(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Performance>, super::StorageError>;

    // --- spins ---

    /// Today's spin row, created with count 0 on first access.
    async fn get_or_create_spin(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Spin, super::StorageError>;

    async fn put_spin(&self, spin: Spin) -> Result<Spin, super::StorageError>;

    // --- billing ---

    /// Replace the aggregator credentials record.
    async fn set_billing_app(&self, app: BillingApp) -> Result<BillingApp, super::StorageError>;

    /// The latest aggregator credentials, if configured.
    async fn get_billing_app(&self) -> Result<Option<BillingApp>, super::StorageError>;

    async fn get_subscriber(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Subscriber>, super::StorageError>;

    /// Look up a subscriber by the masked msisdn the aggregator assigned.
    async fn get_subscriber_by_masked_msisdn(
        &self,
        masked_msisdn: &str,
    ) -> Result<Option<Subscriber>, super::StorageError>;

    /// Insert or replace the billing state for a user.
    async fn upsert_subscriber(
        &self,
        subscriber: Subscriber,
    ) -> Result<Subscriber, super::StorageError>;
}
