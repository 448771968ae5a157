//! Public content (FAQ and slider) integration tests

use axum::http::StatusCode;
use puzzle_panda_api::routes;
use puzzle_panda_api::storage::StorageBackend;
use serde_json::Value;

async fn seeded_server() -> axum_test::TestServer {
    let state = routes::create_app_state();
    state
        .storage
        .create_faq("How do I subscribe?", "Use the subscribe button in the app.")
        .await
        .unwrap();
    state
        .storage
        .create_faq("How many spins do I get?", "Five per day.")
        .await
        .unwrap();
    state.storage.create_slider("promos/spring.png").await.unwrap();

    let app = routes::create_api_router().with_state(state);
    axum_test::TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_faqs_are_public() {
    let server = seeded_server().await;

    let response = server.get("/faqs").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let faqs = body.as_array().unwrap();
    assert_eq!(faqs.len(), 2);
    assert_eq!(faqs[0]["question"], "How do I subscribe?");
    assert_eq!(faqs[1]["answer"], "Five per day.");
}

#[tokio::test]
async fn test_sliders_carry_absolute_image_urls() {
    let server = seeded_server().await;

    let response = server.get("/sliders").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let sliders = body.as_array().unwrap();
    assert_eq!(sliders.len(), 1);
    assert_eq!(sliders[0]["image"], "promos/spring.png");

    let image_url = sliders[0]["image_url"].as_str().unwrap();
    assert!(image_url.ends_with("/media/promos/spring.png"));
    assert!(image_url.starts_with("http"));
}
