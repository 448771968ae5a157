//! Unit tests for the in-memory storage backend.

use chrono::NaiveDate;
use puzzle_panda_api::models::{Operator, Profile, Subscriber, SubscriptionStatus};
use puzzle_panda_api::storage::{MemoryStorage, StorageBackend, StorageError};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let storage = MemoryStorage::new();
    storage.create_user("94771234567", "hash").await.unwrap();
    let err = storage.create_user("94771234567", "hash").await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
async fn users_are_fetchable_by_id() {
    let storage = MemoryStorage::new();
    let created = storage.create_user("94771234567", "hash").await.unwrap();

    let fetched = storage
        .get_user(created.id)
        .await
        .unwrap()
        .expect("user should be found");
    assert_eq!(fetched.username, "94771234567");
    assert_eq!(fetched.id, created.id);

    assert!(storage.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn unsubscribed_profile_is_stored_inactive() {
    let storage = MemoryStorage::new();
    let user = storage.create_user("94771234567", "hash").await.unwrap();

    let mut profile = Profile::new(user.id, "94771234567".into(), Operator::Dialog);
    profile.is_active = true; // not subscribed, must not stick
    let stored = storage.create_profile(profile).await.unwrap();
    assert!(!stored.is_active);

    let mut subscribed = stored.clone();
    subscribed.is_subscribed = true;
    subscribed.is_active = true;
    let stored = storage.update_profile(subscribed).await.unwrap();
    assert!(stored.is_active);

    let mut lapsed = stored.clone();
    lapsed.is_subscribed = false;
    let stored = storage.update_profile(lapsed).await.unwrap();
    assert!(!stored.is_active);
}

#[tokio::test]
async fn add_credits_accumulates() {
    let storage = MemoryStorage::new();
    let user = storage.create_user("94771234567", "hash").await.unwrap();
    storage
        .create_profile(Profile::new(user.id, "94771234567".into(), Operator::Hutch))
        .await
        .unwrap();

    storage.add_credits(user.id, 10).await.unwrap();
    let profile = storage.add_credits(user.id, 5).await.unwrap();
    assert_eq!(profile.credits, 15);
}

#[tokio::test]
async fn add_credits_without_profile_is_not_found() {
    let storage = MemoryStorage::new();
    let err = storage.add_credits(Uuid::new_v4(), 10).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[tokio::test]
async fn quiz_listing_and_lookup() {
    let storage = MemoryStorage::new();
    for i in 1..=5 {
        storage
            .create_quiz(&format!("Q{}", i), "A,B,C,D", "A")
            .await
            .unwrap();
    }

    assert_eq!(storage.count_quizzes().await.unwrap(), 5);
    assert_eq!(storage.list_quizzes(3).await.unwrap().len(), 3);
    assert_eq!(storage.list_quizzes(100).await.unwrap().len(), 5);

    let subset = storage.get_quizzes_by_ids(&[2, 4, 99]).await.unwrap();
    let ids: Vec<i64> = subset.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![2, 4]);

    assert!(storage.get_quiz(1).await.unwrap().is_some());
    assert!(storage.get_quiz(42).await.unwrap().is_none());
}

#[tokio::test]
async fn performance_upsert_increments_counters() {
    let storage = MemoryStorage::new();
    let user = storage.create_user("94771234567", "hash").await.unwrap();
    let today = date(2024, 5, 1);

    let (row, created) = storage
        .record_performance(user.id, today, 3, 2)
        .await
        .unwrap();
    assert!(created);
    assert_eq!(row.total_quizzes_played, 1);
    assert_eq!(row.correct_answers, 3);
    assert_eq!(row.wrong_answers, 2);

    let (row, created) = storage
        .record_performance(user.id, today, 1, 4)
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(row.total_quizzes_played, 2);
    assert_eq!(row.correct_answers, 4);
    assert_eq!(row.wrong_answers, 6);

    // A new day gets its own row.
    let (row, created) = storage
        .record_performance(user.id, date(2024, 5, 2), 5, 0)
        .await
        .unwrap();
    assert!(created);
    assert_eq!(row.total_quizzes_played, 1);

    let history = storage.list_performance(user.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].date_played < history[1].date_played);
}

#[tokio::test]
async fn performance_lookup_by_date() {
    let storage = MemoryStorage::new();
    let user = storage.create_user("94771234567", "hash").await.unwrap();
    let played = date(2024, 5, 1);

    storage
        .record_performance(user.id, played, 4, 1)
        .await
        .unwrap();

    let row = storage
        .get_performance(user.id, played)
        .await
        .unwrap()
        .expect("row for the played date");
    assert_eq!(row.correct_answers, 4);
    assert_eq!(row.wrong_answers, 1);

    // An unplayed date has no row.
    assert!(storage
        .get_performance(user.id, date(2024, 5, 2))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn spin_rows_are_per_user_per_day() {
    let storage = MemoryStorage::new();
    let user = storage.create_user("94771234567", "hash").await.unwrap();
    let today = date(2024, 5, 1);

    let spin = storage.get_or_create_spin(user.id, today).await.unwrap();
    assert_eq!(spin.count, 0);

    let mut spin = spin;
    spin.count += 1;
    storage.put_spin(spin).await.unwrap();

    // Re-fetching does not reset the counter.
    let spin = storage.get_or_create_spin(user.id, today).await.unwrap();
    assert_eq!(spin.count, 1);

    let tomorrow = storage
        .get_or_create_spin(user.id, date(2024, 5, 2))
        .await
        .unwrap();
    assert_eq!(tomorrow.count, 0);
}

#[tokio::test]
async fn subscriber_lookup_by_masked_msisdn() {
    let storage = MemoryStorage::new();
    let user = storage.create_user("94771234567", "hash").await.unwrap();

    let mut subscriber = Subscriber::new(user.id, "771234567".into());
    subscriber.masked_msisdn = "MASK_XYZ".into();
    storage.upsert_subscriber(subscriber).await.unwrap();

    let found = storage
        .get_subscriber_by_masked_msisdn("MASK_XYZ")
        .await
        .unwrap()
        .expect("subscriber should be found");
    assert_eq!(found.user_id, user.id);
    assert_eq!(found.status, SubscriptionStatus::Unknown);

    assert!(storage
        .get_subscriber_by_masked_msisdn("MASK_OTHER")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn latest_billing_app_wins() {
    use puzzle_panda_api::models::BillingApp;

    let storage = MemoryStorage::new();
    assert!(storage.get_billing_app().await.unwrap().is_none());

    let first = BillingApp {
        api_key: "k1".into(),
        api_secret: "s1".into(),
        api_password: "p1".into(),
        app_id: "app1".into(),
        redirect_url: "https://one.example".into(),
    };
    let second = BillingApp {
        api_key: "k2".into(),
        ..first.clone()
    };
    storage.set_billing_app(first).await.unwrap();
    storage.set_billing_app(second).await.unwrap();

    let app = storage.get_billing_app().await.unwrap().unwrap();
    assert_eq!(app.api_key, "k2");
}
