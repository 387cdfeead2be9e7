//! Health, readiness and metrics endpoints on a live server.

mod common;

use common::*;
use reqwest::Client;
use script_service::services::metrics::init_metrics;
use script_service::services::providers::{HealthStatus, MockProvider};
use script_service::startup::{AppState, Application};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Spawn the application on a random port and return the port number.
async fn spawn_app(state: AppState) -> u16 {
    let app = Application::build_with_state(state, 0)
        .await
        .expect("Failed to build application");

    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    // Wait for server and startup probe
    tokio::time::sleep(Duration::from_millis(100)).await;

    port
}

async fn get(port: u16, path: &str) -> reqwest::Response {
    Client::new()
        .get(format!("http://localhost:{}{}", port, path))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
async fn health_check_returns_healthy() {
    let app = test_app(MockProvider::with_object(sample_script(8)), memory_cache());
    let port = spawn_app(app.state).await;

    let response = get(port, "/health").await;
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
    for check in ["apiKey", "database", "databaseConnection", "aiProvider"] {
        assert_eq!(body["checks"][check]["status"], "ok", "check {}", check);
    }
}

#[tokio::test]
async fn failed_probe_makes_health_unhealthy() {
    let app = test_app(
        MockProvider::with_object(sample_script(8))
            .with_health(HealthStatus::unhealthy("quota exceeded")),
        memory_cache(),
    );
    app.state.generator.check_ai_health().await;
    let port = spawn_app(app.state).await;

    let response = get(port, "/health").await;
    assert_eq!(response.status(), 503);

    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"]["aiProvider"]["status"], "error");
    assert_eq!(body["checks"]["aiProvider"]["message"], "quota exceeded");
}

#[tokio::test]
async fn readiness_follows_cache_connectivity() {
    let healthy = test_app(MockProvider::with_object(sample_script(8)), memory_cache());
    let port = spawn_app(healthy.state).await;
    assert_eq!(get(port, "/ready").await.status(), 200);

    let broken = test_app(MockProvider::with_object(sample_script(8)), Arc::new(BrokenCache));
    let port = spawn_app(broken.state).await;
    assert_eq!(get(port, "/ready").await.status(), 503);

    let body: Value = get(port, "/health").await.json().await.unwrap();
    assert_eq!(body["checks"]["databaseConnection"]["status"], "error");
}

#[tokio::test]
async fn metrics_are_exposed() {
    init_metrics().expect("Failed to init metrics");
    let app = test_app(MockProvider::with_object(sample_script(8)), memory_cache());
    let port = spawn_app(app.state).await;

    let response = get(port, "/metrics").await;
    assert_eq!(response.status(), 200);
    let text = response.text().await.unwrap();
    assert!(text.contains("script_"));
}

#[tokio::test]
async fn health_check_starts_only_after_bind() {
    let taken = tokio::net::TcpListener::bind("0.0.0.0:0")
        .await
        .expect("Failed to bind");
    let port = taken.local_addr().unwrap().port();

    let app = test_app(MockProvider::with_object(sample_script(8)), memory_cache());
    assert!(Application::build_with_state(app.state.clone(), port)
        .await
        .is_err());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(app.state.generator.health_status().is_none());

    spawn_app(app.state.clone()).await;
    assert_eq!(app.state.generator.health_status(), Some(HealthStatus::healthy()));
}
