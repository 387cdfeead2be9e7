//! Scripted provider for tests and local runs without API keys.

use super::{HealthStatus, LlmProvider, ObjectRequest, ObjectStream, ProviderError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// What the mock answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Stream this object's JSON in chunks.
    Object(Value),
    /// Stream raw text, valid JSON or not.
    Raw(String),
    /// Fail before streaming.
    Error(ProviderError),
    /// Stream part of the text, then fail.
    FailMidStream(String, ProviderError),
}

/// Mock provider replaying a fixed reply and recording calls.
pub struct MockProvider {
    reply: MockReply,
    health: HealthStatus,
    chunk_size: usize,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            health: HealthStatus::healthy(),
            chunk_size: 16,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_object(value: Value) -> Self {
        Self::new(MockReply::Object(value))
    }

    pub fn with_health(mut self, health: HealthStatus) -> Self {
        self.health = health;
        self
    }

    /// Number of `stream_object` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

fn chunks(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|c| c.iter().collect())
        .collect()
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn stream_object(&self, request: ObjectRequest) -> Result<ObjectStream, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt);
        }

        let (text, failure) = match &self.reply {
            MockReply::Error(e) => return Err(e.clone()),
            MockReply::Object(value) => (value.to_string(), None),
            MockReply::Raw(text) => (text.clone(), None),
            MockReply::FailMidStream(text, e) => (text.clone(), Some(e.clone())),
        };

        let (mut sink, stream) = ObjectStream::channel();
        let parts = chunks(&text, self.chunk_size);

        tokio::spawn(async move {
            for part in parts {
                sink.push(&part);
                tokio::task::yield_now().await;
            }
            match failure {
                Some(e) => sink.fail(e),
                None => sink.finish(),
            }
        });

        Ok(stream)
    }

    async fn health_check(&self) -> HealthStatus {
        self.health.clone()
    }
}
