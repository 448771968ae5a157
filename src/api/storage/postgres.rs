//! PostgreSQL storage backend.
//!
//! Queries are bound at runtime so the crate builds without a live
//! database. Schema lives in `migrations/`.

use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{StorageBackend, StorageError};
use crate::models::{
    BillingApp, Faq, Operator, Performance, Profile, Quiz, Slider, Spin, Subscriber,
    SubscriptionStatus, User,
};

pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and run pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StorageError::ConnectionError(format!("connect failed: {}", e)))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StorageError::ConnectionError(format!("migration failed: {}", e)))?;
        Ok(Self::new(pool))
    }
}

fn map_db_err(e: sqlx::Error) -> StorageError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return StorageError::Conflict(db_err.message().to_string());
        }
    }
    StorageError::Other(e.to_string())
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> Result<User, StorageError> {
    Ok(User {
        id: row.try_get("id").map_err(map_db_err)?,
        username: row.try_get("username").map_err(map_db_err)?,
        password_hash: row.try_get("password_hash").map_err(map_db_err)?,
        created_at: row.try_get("created_at").map_err(map_db_err)?,
    })
}

fn profile_from_row(row: &sqlx::postgres::PgRow) -> Result<Profile, StorageError> {
    let operator: String = row.try_get("operator").map_err(map_db_err)?;
    let operator = Operator::parse(&operator)
        .ok_or_else(|| StorageError::Other(format!("unknown operator {}", operator)))?;
    Ok(Profile {
        user_id: row.try_get("user_id").map_err(map_db_err)?,
        primary_phone: row.try_get("primary_phone").map_err(map_db_err)?,
        operator,
        is_subscribed: row.try_get("is_subscribed").map_err(map_db_err)?,
        credits: row.try_get("credits").map_err(map_db_err)?,
        is_active: row.try_get("is_active").map_err(map_db_err)?,
    })
}

fn quiz_from_row(row: &sqlx::postgres::PgRow) -> Result<Quiz, StorageError> {
    Ok(Quiz {
        id: row.try_get("id").map_err(map_db_err)?,
        question: row.try_get("question").map_err(map_db_err)?,
        options: row.try_get("options").map_err(map_db_err)?,
        correct_answer: row.try_get("correct_answer").map_err(map_db_err)?,
    })
}

fn performance_from_row(row: &sqlx::postgres::PgRow) -> Result<Performance, StorageError> {
    Ok(Performance {
        user_id: row.try_get("user_id").map_err(map_db_err)?,
        date_played: row.try_get("date_played").map_err(map_db_err)?,
        total_quizzes_played: row.try_get("total_quizzes_played").map_err(map_db_err)?,
        correct_answers: row.try_get("correct_answers").map_err(map_db_err)?,
        wrong_answers: row.try_get("wrong_answers").map_err(map_db_err)?,
    })
}

fn subscriber_from_row(row: &sqlx::postgres::PgRow) -> Result<Subscriber, StorageError> {
    let status: String = row.try_get("status").map_err(map_db_err)?;
    let status = SubscriptionStatus::parse(&status)
        .ok_or_else(|| StorageError::Other(format!("unknown subscription status {}", status)))?;
    Ok(Subscriber {
        user_id: row.try_get("user_id").map_err(map_db_err)?,
        plain_msisdn: row.try_get("plain_msisdn").map_err(map_db_err)?,
        masked_msisdn: row.try_get("masked_msisdn").map_err(map_db_err)?,
        status,
        notification: row.try_get("notification").map_err(map_db_err)?,
        confirmation: row.try_get("confirmation").map_err(map_db_err)?,
    })
}

#[async_trait::async_trait]
impl StorageBackend for PostgresStorage {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, StorageError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        user_from_row(&row)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn create_profile(&self, profile: Profile) -> Result<Profile, StorageError> {
        let profile = profile.normalized();
        let row = sqlx::query(
            r#"
            INSERT INTO profiles (user_id, primary_phone, operator, is_subscribed, credits, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING user_id, primary_phone, operator, is_subscribed, credits, is_active
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.primary_phone)
        .bind(profile.operator.as_str())
        .bind(profile.is_subscribed)
        .bind(profile.credits)
        .bind(profile.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        profile_from_row(&row)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, primary_phone, operator, is_subscribed, credits, is_active
            FROM profiles WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.as_ref().map(profile_from_row).transpose()
    }

    async fn update_profile(&self, profile: Profile) -> Result<Profile, StorageError> {
        let profile = profile.normalized();
        let row = sqlx::query(
            r#"
            UPDATE profiles
            SET primary_phone = $2, operator = $3, is_subscribed = $4, credits = $5, is_active = $6
            WHERE user_id = $1
            RETURNING user_id, primary_phone, operator, is_subscribed, credits, is_active
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.primary_phone)
        .bind(profile.operator.as_str())
        .bind(profile.is_subscribed)
        .bind(profile.credits)
        .bind(profile.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        match row {
            Some(row) => profile_from_row(&row),
            None => Err(StorageError::not_found("profile", profile.user_id)),
        }
    }

    async fn add_credits(&self, user_id: Uuid, amount: i64) -> Result<Profile, StorageError> {
        let row = sqlx::query(
            r#"
            UPDATE profiles SET credits = credits + $2
            WHERE user_id = $1
            RETURNING user_id, primary_phone, operator, is_subscribed, credits, is_active
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        match row {
            Some(row) => profile_from_row(&row),
            None => Err(StorageError::not_found("profile", user_id)),
        }
    }

    async fn create_quiz(
        &self,
        question: &str,
        options: &str,
        correct_answer: &str,
    ) -> Result<Quiz, StorageError> {
        let row = sqlx::query(
            r#"
            INSERT INTO quizzes (question, options, correct_answer)
            VALUES ($1, $2, $3)
            RETURNING id, question, options, correct_answer
            "#,
        )
        .bind(question)
        .bind(options)
        .bind(correct_answer)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        quiz_from_row(&row)
    }

    async fn list_quizzes(&self, limit: i64) -> Result<Vec<Quiz>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, question, options, correct_answer FROM quizzes ORDER BY id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        rows.iter().map(quiz_from_row).collect()
    }

    async fn count_quizzes(&self) -> Result<i64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM quizzes")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)?;
        row.try_get("count").map_err(map_db_err)
    }

    async fn get_quiz(&self, quiz_id: i64) -> Result<Option<Quiz>, StorageError> {
        let row = sqlx::query(
            "SELECT id, question, options, correct_answer FROM quizzes WHERE id = $1",
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.as_ref().map(quiz_from_row).transpose()
    }

    async fn get_quizzes_by_ids(&self, ids: &[i64]) -> Result<Vec<Quiz>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, question, options, correct_answer FROM quizzes WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        rows.iter().map(quiz_from_row).collect()
    }

    async fn create_faq(&self, question: &str, answer: &str) -> Result<Faq, StorageError> {
        let row = sqlx::query(
            "INSERT INTO faqs (question, answer) VALUES ($1, $2) RETURNING id, question, answer",
        )
        .bind(question)
        .bind(answer)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(Faq {
            id: row.try_get("id").map_err(map_db_err)?,
            question: row.try_get("question").map_err(map_db_err)?,
            answer: row.try_get("answer").map_err(map_db_err)?,
        })
    }

    async fn list_faqs(&self) -> Result<Vec<Faq>, StorageError> {
        let rows = sqlx::query("SELECT id, question, answer FROM faqs ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        rows.iter()
            .map(|row| {
                Ok(Faq {
                    id: row.try_get("id").map_err(map_db_err)?,
                    question: row.try_get("question").map_err(map_db_err)?,
                    answer: row.try_get("answer").map_err(map_db_err)?,
                })
            })
            .collect()
    }

    async fn create_slider(&self, image: &str) -> Result<Slider, StorageError> {
        let row = sqlx::query("INSERT INTO sliders (image) VALUES ($1) RETURNING id, image")
            .bind(image)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(Slider {
            id: row.try_get("id").map_err(map_db_err)?,
            image: row.try_get("image").map_err(map_db_err)?,
        })
    }

    async fn list_sliders(&self) -> Result<Vec<Slider>, StorageError> {
        let rows = sqlx::query("SELECT id, image FROM sliders ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        rows.iter()
            .map(|row| {
                Ok(Slider {
                    id: row.try_get("id").map_err(map_db_err)?,
                    image: row.try_get("image").map_err(map_db_err)?,
                })
            })
            .collect()
    }

    async fn get_performance(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Performance>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, date_played, total_quizzes_played, correct_answers, wrong_answers
            FROM performance WHERE user_id = $1 AND date_played = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.as_ref().map(performance_from_row).transpose()
    }

    async fn record_performance(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        correct: i64,
        wrong: i64,
    ) -> Result<(Performance, bool), StorageError> {
        // The daily row is keyed (user_id, date_played); ON CONFLICT folds
        // repeated submissions into the counters.
        let row = sqlx::query(
            r#"
            INSERT INTO performance (user_id, date_played, total_quizzes_played, correct_answers, wrong_answers)
            VALUES ($1, $2, 1, $3, $4)
            ON CONFLICT (user_id, date_played) DO UPDATE SET
                total_quizzes_played = performance.total_quizzes_played + 1,
                correct_answers = performance.correct_answers + EXCLUDED.correct_answers,
                wrong_answers = performance.wrong_answers + EXCLUDED.wrong_answers
            RETURNING user_id, date_played, total_quizzes_played, correct_answers, wrong_answers,
                      (xmax = 0) AS created
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(correct)
        .bind(wrong)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        let created: bool = row.try_get("created").map_err(map_db_err)?;
        Ok((performance_from_row(&row)?, created))
    }

    async fn list_performance(&self, user_id: Uuid) -> Result<Vec<Performance>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, date_played, total_quizzes_played, correct_answers, wrong_answers
            FROM performance WHERE user_id = $1 ORDER BY date_played
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        rows.iter().map(performance_from_row).collect()
    }

    async fn get_or_create_spin(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Spin, StorageError> {
        let row = sqlx::query(
            r#"
            INSERT INTO spins (user_id, date, count)
            VALUES ($1, $2, 0)
            ON CONFLICT (user_id, date) DO UPDATE SET count = spins.count
            RETURNING user_id, date, count
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(Spin {
            user_id: row.try_get("user_id").map_err(map_db_err)?,
            date: row.try_get("date").map_err(map_db_err)?,
            count: row.try_get("count").map_err(map_db_err)?,
        })
    }

    async fn put_spin(&self, spin: Spin) -> Result<Spin, StorageError> {
        let row = sqlx::query(
            r#"
            INSERT INTO spins (user_id, date, count)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, date) DO UPDATE SET count = EXCLUDED.count
            RETURNING user_id, date, count
            "#,
        )
        .bind(spin.user_id)
        .bind(spin.date)
        .bind(spin.count)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(Spin {
            user_id: row.try_get("user_id").map_err(map_db_err)?,
            date: row.try_get("date").map_err(map_db_err)?,
            count: row.try_get("count").map_err(map_db_err)?,
        })
    }

    async fn set_billing_app(&self, app: BillingApp) -> Result<BillingApp, StorageError> {
        sqlx::query(
            r#"
            INSERT INTO billing_apps (api_key, api_secret, api_password, app_id, redirect_url)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&app.api_key)
        .bind(&app.api_secret)
        .bind(&app.api_password)
        .bind(&app.app_id)
        .bind(&app.redirect_url)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(app)
    }

    async fn get_billing_app(&self) -> Result<Option<BillingApp>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT api_key, api_secret, api_password, app_id, redirect_url
            FROM billing_apps ORDER BY id DESC LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.map(|row| {
            Ok(BillingApp {
                api_key: row.try_get("api_key").map_err(map_db_err)?,
                api_secret: row.try_get("api_secret").map_err(map_db_err)?,
                api_password: row.try_get("api_password").map_err(map_db_err)?,
                app_id: row.try_get("app_id").map_err(map_db_err)?,
                redirect_url: row.try_get("redirect_url").map_err(map_db_err)?,
            })
        })
        .transpose()
    }

    async fn get_subscriber(&self, user_id: Uuid) -> Result<Option<Subscriber>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, plain_msisdn, masked_msisdn, status, notification, confirmation
            FROM subscribers WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.as_ref().map(subscriber_from_row).transpose()
    }

    async fn get_subscriber_by_masked_msisdn(
        &self,
        masked_msisdn: &str,
    ) -> Result<Option<Subscriber>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, plain_msisdn, masked_msisdn, status, notification, confirmation
            FROM subscribers WHERE masked_msisdn = $1
            "#,
        )
        .bind(masked_msisdn)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.as_ref().map(subscriber_from_row).transpose()
    }

    async fn upsert_subscriber(&self, subscriber: Subscriber) -> Result<Subscriber, StorageError> {
        let row = sqlx::query(
            r#"
            INSERT INTO subscribers (user_id, plain_msisdn, masked_msisdn, status, notification, confirmation)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                plain_msisdn = EXCLUDED.plain_msisdn,
                masked_msisdn = EXCLUDED.masked_msisdn,
                status = EXCLUDED.status,
                notification = EXCLUDED.notification,
                confirmation = EXCLUDED.confirmation
            RETURNING user_id, plain_msisdn, masked_msisdn, status, notification, confirmation
            "#,
        )
        .bind(subscriber.user_id)
        .bind(&subscriber.plain_msisdn)
        .bind(&subscriber.masked_msisdn)
        .bind(subscriber.status.as_str())
        .bind(&subscriber.notification)
        .bind(&subscriber.confirmation)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        subscriber_from_row(&row)
    }
}
