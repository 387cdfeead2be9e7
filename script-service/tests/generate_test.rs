//! `POST /generate` end to end against the router, with a scripted provider.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use script_service::models::CachedResult;
use script_service::services::providers::mock::MockReply;
use script_service::services::providers::{HealthStatus, MockProvider, ProviderError};
use script_service::services::ScriptCache;
use script_service::startup::router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn generate_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/generate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn cat_video() -> Value {
    json!({"topic": "Cat Video", "vibe": "cat", "platform": "tiktok"})
}

#[tokio::test]
async fn cache_hit_replays_stored_json_without_provider_call() {
    let cache = memory_cache();
    let stored = sample_script(9);
    cache
        .store(&CachedResult::new(
            "cat video-cat-tiktok-30-60-v0",
            stored.clone(),
            "gpt-4o-mini",
        ))
        .await
        .unwrap();

    let app = test_app(MockProvider::with_object(sample_script(1)), cache);
    let response = router(app.state.clone())
        .oneshot(generate_request(cat_video()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-cache-status"], "HIT");
    assert_eq!(response.headers()["x-model"], "gpt-4o-mini");
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
    let response_time = response.headers()["x-response-time"].to_str().unwrap();
    assert!(response_time.ends_with("ms"));

    let text = body_text(response).await;
    assert!(text.contains('\n'), "cached JSON is pretty-printed");
    assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), stored);
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn cache_miss_calls_provider_once_and_stores_result() {
    let cache = memory_cache();
    let app = test_app(MockProvider::with_object(sample_script(8)), cache.clone());

    let response = router(app.state.clone())
        .oneshot(generate_request(cat_video()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-cache-status"], "MISS");
    assert_eq!(response.headers()["x-web-context"], "NONE");
    assert!(response.headers().get("x-response-time").is_none());

    let text = body_text(response).await;
    assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), sample_script(8));

    assert_eq!(app.provider.calls(), 1);
    let prompt = &app.provider.prompts()[0];
    assert!(prompt.contains("Cat Video"));
    assert!(prompt.contains("tiktok"));

    let entry = wait_for_entry(&cache, "cat video-cat-tiktok-30-60-v0")
        .await
        .expect("result was not cached");
    assert_eq!(entry.data, sample_script(8));
    assert_eq!(entry.model_used, "gpt-4o-mini");
}

#[tokio::test]
async fn second_request_is_served_from_cache() {
    let cache = memory_cache();
    let app = test_app(MockProvider::with_object(sample_script(7)), cache.clone());

    let first = router(app.state.clone())
        .oneshot(generate_request(cat_video()))
        .await
        .unwrap();
    body_text(first).await;
    wait_for_entry(&cache, "cat video-cat-tiktok-30-60-v0").await;

    let second = router(app.state.clone())
        .oneshot(generate_request(json!({
            "topic": "  cat video  ",
            "vibe": "cat",
            "platform": "tiktok",
            "duration": "30-60"
        })))
        .await
        .unwrap();

    assert_eq!(second.headers()["x-cache-status"], "HIT");
    assert_eq!(app.provider.calls(), 1);
}

#[tokio::test]
async fn web_context_reaches_the_prompt() {
    let app = test_app_with_search(
        MockProvider::with_object(sample_script(8)),
        memory_cache(),
        Some(Arc::new(StaticSearch(Some(
            "SUMMARY: Cats sleep 16 hours a day".to_string(),
        )))),
    );

    let response = router(app.state.clone())
        .oneshot(generate_request(cat_video()))
        .await
        .unwrap();

    assert_eq!(response.headers()["x-web-context"], "FOUND");
    body_text(response).await;
    assert!(app.provider.prompts()[0].contains("SUMMARY: Cats sleep 16 hours a day"));
}

#[tokio::test]
async fn missing_fields_are_rejected_before_provider_call() {
    let app = test_app(MockProvider::with_object(sample_script(8)), memory_cache());

    let response = router(app.state.clone())
        .oneshot(generate_request(json!({"topic": "cats", "vibe": "funny"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "Missing required fields: topic, vibe, platform");
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn unknown_duration_and_malformed_json_are_bad_requests() {
    let app = test_app(MockProvider::with_object(sample_script(8)), memory_cache());

    let response = router(app.state.clone())
        .oneshot(generate_request(json!({
            "topic": "cats", "vibe": "funny", "platform": "tiktok", "duration": "5-10"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let malformed = Request::builder()
        .method("POST")
        .uri("/generate")
        .header("content-type", "application/json")
        .body(Body::from("{\"topic\": "))
        .unwrap();
    let response = router(app.state.clone()).oneshot(malformed).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn failed_startup_probe_returns_503_without_provider_call() {
    let app = test_app(
        MockProvider::with_object(sample_script(8))
            .with_health(HealthStatus::unhealthy("Incorrect API key provided")),
        memory_cache(),
    );
    assert!(!app.state.generator.check_ai_health().await.ok);

    let response = router(app.state.clone())
        .oneshot(generate_request(cat_video()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "AI service is unavailable");
    assert_eq!(body["details"], "Incorrect API key provided");
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn provider_failure_returns_500_and_caches_nothing() {
    let cache = memory_cache();
    let app = test_app(
        MockProvider::new(MockReply::Error(ProviderError::RateLimited)),
        cache.clone(),
    );

    let response = router(app.state.clone())
        .oneshot(generate_request(cat_video()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "Failed to generate content");
    assert_eq!(body["message"], "Rate limited");
    assert!(cache.is_empty());
}

#[tokio::test]
async fn invalid_output_is_streamed_but_never_cached() {
    let cache = memory_cache();
    let app = test_app(MockProvider::with_object(sample_script(11)), cache.clone());

    let response = router(app.state.clone())
        .oneshot(generate_request(cat_video()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_text(response).await;

    assert!(wait_for_entry(&cache, "cat video-cat-tiktok-30-60-v0")
        .await
        .is_none());
}

#[tokio::test]
async fn cache_outage_does_not_block_generation() {
    let app = test_app(
        MockProvider::with_object(sample_script(6)),
        Arc::new(BrokenCache),
    );

    let response = router(app.state.clone())
        .oneshot(generate_request(cat_video()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-cache-status"], "MISS");
    let text = body_text(response).await;
    assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), sample_script(6));
    assert_eq!(app.provider.calls(), 1);
}

#[tokio::test]
async fn visuals_flag_changes_key_and_prompt() {
    let cache = memory_cache();
    let mut script = sample_script(8);
    script["visualPrompt"] = json!("Close-up of a cat's whiskers, soft morning light");
    let app = test_app(MockProvider::with_object(script.clone()), cache.clone());

    let response = router(app.state.clone())
        .oneshot(generate_request(json!({
            "topic": "Cat Video",
            "vibe": "cat",
            "platform": "tiktok",
            "includeVisuals": true
        })))
        .await
        .unwrap();
    body_text(response).await;

    assert!(app.provider.prompts()[0].contains("visualPrompt"));
    let entry = wait_for_entry(&cache, "cat video-cat-tiktok-30-60-v1")
        .await
        .expect("visual result was not cached");
    assert_eq!(entry.data["visualPrompt"], script["visualPrompt"]);
}
