//! Unit tests for the Digimart URL signing helpers.

use chrono::{TimeZone, Utc};
use puzzle_panda_api::models::BillingApp;
use puzzle_panda_api::services::digimart_service::DigimartService;
use sha2::{Digest, Sha512};

fn test_app() -> BillingApp {
    BillingApp {
        api_key: "panda-key".into(),
        api_secret: "panda-secret".into(),
        api_password: "panda-pass".into(),
        app_id: "APP_001".into(),
        redirect_url: "https://puzzlepanda.example/return".into(),
    }
}

#[test]
fn request_id_has_fixed_prefix() {
    assert_eq!(DigimartService::request_id("771234567"), "0000771234567");
}

#[test]
fn request_time_is_utc_with_millis() {
    let t = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    assert_eq!(
        DigimartService::format_request_time(t),
        "2024-05-01T09:30:00.000Z"
    );
}

#[test]
fn signature_is_sha512_of_pipe_joined_fields() {
    let sig = DigimartService::signature("key", "2024-05-01T09:30:00.000Z", "secret");
    let expected = hex::encode(Sha512::digest(
        "key|2024-05-01T09:30:00.000Z|secret".as_bytes(),
    ));
    assert_eq!(sig, expected);
    assert_eq!(sig.len(), 128);
}

#[test]
fn signature_depends_on_every_field() {
    let time = "2024-05-01T09:30:00.000Z";
    let base = DigimartService::signature("key", time, "secret");
    assert_ne!(DigimartService::signature("key2", time, "secret"), base);
    assert_ne!(DigimartService::signature("key", time, "secret2"), base);
}

#[test]
fn authorize_url_carries_all_parameters() {
    let service = DigimartService::new(
        "https://sdk.example".into(),
        "https://api.example".into(),
    );
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    let url = service.authorize_url(&test_app(), "771234567", now);

    assert!(url.starts_with("https://sdk.example/sdk/subscription/authorize?"));
    assert!(url.contains("apiKey=panda-key"));
    assert!(url.contains("requestId=0000771234567"));
    assert!(url.contains("requestTime=2024-05-01T09%3A30%3A00.000Z"));
    assert!(url.contains("msisdn=771234567"));
    assert!(url.contains("redirectUrl=https%3A%2F%2Fpuzzlepanda.example%2Freturn"));

    let expected_sig =
        DigimartService::signature("panda-key", "2024-05-01T09:30:00.000Z", "panda-secret");
    assert!(url.contains(&format!("signature={}", expected_sig)));
}
