//! Shared fixtures for script-service integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::response::Response;
use http_body_util::BodyExt;
use script_service::models::CachedResult;
use script_service::prompts::PromptRegistry;
use script_service::services::providers::{LlmProvider, MockProvider};
use script_service::services::{
    GeneratorOptions, InMemoryScriptCache, ScriptCache, ScriptGenerator, WebSearch,
    WebSearchError,
};
use script_service::startup::{AppState, RuntimeSettings};
use serde_json::{json, Value};
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Duration;

pub fn sample_script(score: i64) -> Value {
    json!({
        "hook": "Đừng lướt qua nếu bạn nuôi mèo!",
        "script": "Ai cũng nghĩ mèo lười.\n• Mèo ngủ 16 tiếng để săn mồi\n• Tai xoay 180 độ\n• Ria đo được khe hẹp",
        "cta": "Follow để xem phần 2",
        "analysis": {
            "hookPsychology": "Curiosity gap",
            "viralScore": score,
            "audienceInsight": "Gen Z nuôi mèo",
            "viralFramework": "Curiosity Gap"
        },
        "scenarioDetected": "KNOWLEDGE"
    })
}

/// Web search returning a fixed context.
pub struct StaticSearch(pub Option<String>);

#[async_trait]
impl WebSearch for StaticSearch {
    async fn search_context(&self, _topic: &str) -> Result<Option<String>, WebSearchError> {
        Ok(self.0.clone())
    }
}

/// Cache whose every operation fails.
pub struct BrokenCache;

#[async_trait]
impl ScriptCache for BrokenCache {
    async fn lookup(&self, _cache_key: &str) -> Result<Option<CachedResult>, AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!("connection refused")))
    }

    async fn store(&self, _entry: &CachedResult) -> Result<(), AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!("connection refused")))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!("connection refused")))
    }

    fn backend(&self) -> &'static str {
        "broken"
    }
}

pub struct TestApp {
    pub state: AppState,
    pub provider: Arc<MockProvider>,
}

pub fn test_app(provider: MockProvider, cache: Arc<dyn ScriptCache>) -> TestApp {
    test_app_with_search(provider, cache, None)
}

pub fn test_app_with_search(
    provider: MockProvider,
    cache: Arc<dyn ScriptCache>,
    web_search: Option<Arc<dyn WebSearch>>,
) -> TestApp {
    let provider = Arc::new(provider);
    let mut state = state_with_provider(provider.clone(), cache);
    state.web_search = web_search;

    TestApp { state, provider }
}

/// State around any provider, with default generator options.
pub fn state_with_provider(provider: Arc<dyn LlmProvider>, cache: Arc<dyn ScriptCache>) -> AppState {
    let generator = Arc::new(ScriptGenerator::new(
        provider,
        Arc::new(PromptRegistry::with_defaults()),
        GeneratorOptions::default(),
    ));

    AppState {
        generator,
        cache,
        web_search: None,
        settings: RuntimeSettings {
            replay_delay: Duration::ZERO,
            ..RuntimeSettings::default()
        },
    }
}

pub fn memory_cache() -> Arc<InMemoryScriptCache> {
    Arc::new(InMemoryScriptCache::new())
}

pub async fn body_text(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

/// Poll until the background cache write for `key` lands.
pub async fn wait_for_entry(cache: &InMemoryScriptCache, key: &str) -> Option<CachedResult> {
    for _ in 0..50 {
        if let Ok(Some(entry)) = cache.lookup(key).await {
            return Some(entry);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    None
}
