//! In-memory storage backend.
//!
//! Used when `DATABASE_URL` is not set and by the test suite. All maps
//! live behind a single RwLock; the request volume this serves does not
//! warrant anything finer grained.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StorageBackend, StorageError};
use crate::models::{BillingApp, Faq, Performance, Profile, Quiz, Slider, Spin, Subscriber, User};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, Profile>,
    quizzes: Vec<Quiz>,
    faqs: Vec<Faq>,
    sliders: Vec<Slider>,
    performance: HashMap<(Uuid, NaiveDate), Performance>,
    spins: HashMap<(Uuid, NaiveDate), Spin>,
    billing_app: Option<BillingApp>,
    subscribers: HashMap<Uuid, Subscriber>,
    next_quiz_id: i64,
    next_faq_id: i64,
    next_slider_id: i64,
}

pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                next_quiz_id: 1,
                next_faq_id: 1,
                next_slider_id: 1,
                ..Tables::default()
            }),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryStorage {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(StorageError::Conflict(format!(
                "user {} already exists",
                username
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, StorageError> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_profile(&self, profile: Profile) -> Result<Profile, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.profiles.contains_key(&profile.user_id) {
            return Err(StorageError::Conflict(format!(
                "profile for user {} already exists",
                profile.user_id
            )));
        }
        let profile = profile.normalized();
        tables.profiles.insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StorageError> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn update_profile(&self, profile: Profile) -> Result<Profile, StorageError> {
        let mut tables = self.tables.write().await;
        if !tables.profiles.contains_key(&profile.user_id) {
            return Err(StorageError::not_found("profile", profile.user_id));
        }
        let profile = profile.normalized();
        tables.profiles.insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn add_credits(&self, user_id: Uuid, amount: i64) -> Result<Profile, StorageError> {
        let mut tables = self.tables.write().await;
        let profile = tables
            .profiles
            .get_mut(&user_id)
            .ok_or_else(|| StorageError::not_found("profile", user_id))?;
        profile.credits += amount;
        Ok(profile.clone())
    }

    async fn create_quiz(
        &self,
        question: &str,
        options: &str,
        correct_answer: &str,
    ) -> Result<Quiz, StorageError> {
        let mut tables = self.tables.write().await;
        let quiz = Quiz {
            id: tables.next_quiz_id,
            question: question.to_string(),
            options: options.to_string(),
            correct_answer: correct_answer.to_string(),
        };
        tables.next_quiz_id += 1;
        tables.quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn list_quizzes(&self, limit: i64) -> Result<Vec<Quiz>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .quizzes
            .iter()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_quizzes(&self) -> Result<i64, StorageError> {
        Ok(self.tables.read().await.quizzes.len() as i64)
    }

    async fn get_quiz(&self, quiz_id: i64) -> Result<Option<Quiz>, StorageError> {
        Ok(self
            .tables
            .read()
            .await
            .quizzes
            .iter()
            .find(|q| q.id == quiz_id)
            .cloned())
    }

    async fn get_quizzes_by_ids(&self, ids: &[i64]) -> Result<Vec<Quiz>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .quizzes
            .iter()
            .filter(|q| ids.contains(&q.id))
            .cloned()
            .collect())
    }

    async fn create_faq(&self, question: &str, answer: &str) -> Result<Faq, StorageError> {
        let mut tables = self.tables.write().await;
        let faq = Faq {
            id: tables.next_faq_id,
            question: question.to_string(),
            answer: answer.to_string(),
        };
        tables.next_faq_id += 1;
        tables.faqs.push(faq.clone());
        Ok(faq)
    }

    async fn list_faqs(&self) -> Result<Vec<Faq>, StorageError> {
        Ok(self.tables.read().await.faqs.clone())
    }

    async fn create_slider(&self, image: &str) -> Result<Slider, StorageError> {
        let mut tables = self.tables.write().await;
        let slider = Slider {
            id: tables.next_slider_id,
            image: image.to_string(),
        };
        tables.next_slider_id += 1;
        tables.sliders.push(slider.clone());
        Ok(slider)
    }

    async fn list_sliders(&self) -> Result<Vec<Slider>, StorageError> {
        Ok(self.tables.read().await.sliders.clone())
    }

    async fn get_performance(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Performance>, StorageError> {
        Ok(self
            .tables
            .read()
            .await
            .performance
            .get(&(user_id, date))
            .cloned())
    }

    async fn record_performance(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        correct: i64,
        wrong: i64,
    ) -> Result<(Performance, bool), StorageError> {
        let mut tables = self.tables.write().await;
        match tables.performance.get_mut(&(user_id, date)) {
            Some(row) => {
                row.total_quizzes_played += 1;
                row.correct_answers += correct;
                row.wrong_answers += wrong;
                Ok((row.clone(), false))
            }
            None => {
                let row = Performance {
                    user_id,
                    date_played: date,
                    total_quizzes_played: 1,
                    correct_answers: correct,
                    wrong_answers: wrong,
                };
                tables.performance.insert((user_id, date), row.clone());
                Ok((row, true))
            }
        }
    }

    async fn list_performance(&self, user_id: Uuid) -> Result<Vec<Performance>, StorageError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Performance> = tables
            .performance
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.date_played);
        Ok(rows)
    }

    async fn get_or_create_spin(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Spin, StorageError> {
        let mut tables = self.tables.write().await;
        let spin = tables
            .spins
            .entry((user_id, date))
            .or_insert_with(|| Spin::new(user_id, date));
        Ok(spin.clone())
    }

    async fn put_spin(&self, spin: Spin) -> Result<Spin, StorageError> {
        let mut tables = self.tables.write().await;
        tables.spins.insert((spin.user_id, spin.date), spin.clone());
        Ok(spin)
    }

    async fn set_billing_app(&self, app: BillingApp) -> Result<BillingApp, StorageError> {
        let mut tables = self.tables.write().await;
        tables.billing_app = Some(app.clone());
        Ok(app)
    }

    async fn get_billing_app(&self) -> Result<Option<BillingApp>, StorageError> {
        Ok(self.tables.read().await.billing_app.clone())
    }

    async fn get_subscriber(&self, user_id: Uuid) -> Result<Option<Subscriber>, StorageError> {
        Ok(self.tables.read().await.subscribers.get(&user_id).cloned())
    }

    async fn get_subscriber_by_masked_msisdn(
        &self,
        masked_msisdn: &str,
    ) -> Result<Option<Subscriber>, StorageError> {
        Ok(self
            .tables
            .read()
            .await
            .subscribers
            .values()
            .find(|s| s.masked_msisdn == masked_msisdn)
            .cloned())
    }

    async fn upsert_subscriber(&self, subscriber: Subscriber) -> Result<Subscriber, StorageError> {
        let mut tables = self.tables.write().await;
        tables
            .subscribers
            .insert(subscriber.user_id, subscriber.clone());
        Ok(subscriber)
    }
}
