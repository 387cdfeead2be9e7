//! LLM provider abstractions and implementations.
//!
//! Every backend streams a structured JSON object for a prompt. One call
//! yields two outputs: the raw JSON text as it arrives and a future for the
//! complete parsed object (see [`ObjectStream`]).

pub mod factory;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod sse;
pub mod stream;

pub use factory::{ProviderFactory, ProviderKeys};
pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use openai::OpenAiProvider;
pub use stream::{ObjectFuture, ObjectStream, TextStream};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Output truncated at the token limit")]
    Truncated,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode provider output: {0}")]
    Decode(String),

    #[error("Stream closed before completion")]
    StreamClosed,
}

impl ProviderError {
    /// Short label used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::Api { .. } => "api",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::Truncated => "truncated",
            ProviderError::Network(_) => "network",
            ProviderError::Decode(_) => "decode",
            ProviderError::StreamClosed => "stream_closed",
        }
    }

    /// Client-facing description. Carries no provider payload, URLs or
    /// credentials; the full error is only logged.
    pub fn public_message(&self) -> String {
        match self {
            ProviderError::NotConfigured(_) => "AI provider is not configured".to_string(),
            ProviderError::Api { status, .. } => format!("AI provider returned status {}", status),
            ProviderError::Network(_) => "Could not reach the AI provider".to_string(),
            ProviderError::Decode(_) => "AI provider returned malformed output".to_string(),
            ProviderError::RateLimited
            | ProviderError::ContentFiltered
            | ProviderError::Truncated
            | ProviderError::StreamClosed => self.to_string(),
        }
    }

    /// Map a non-success HTTP status to an error.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            ProviderError::RateLimited
        } else {
            ProviderError::Api {
                status: status.as_u16(),
                message: body,
            }
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        // Request URLs may carry credentials.
        ProviderError::Network(e.without_url().to_string())
    }
}

/// Cost/quality tier; each provider maps every tier to a model id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    #[default]
    Fast,
    Balanced,
    Premium,
}

impl FromStr for ModelTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(ModelTier::Fast),
            "balanced" => Ok(ModelTier::Balanced),
            "premium" => Ok(ModelTier::Premium),
            other => Err(format!("Unknown model tier: {}", other)),
        }
    }
}

/// Supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    #[default]
    OpenAi,
    Gemini,
}

impl ProviderName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::OpenAi => "openai",
            ProviderName::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderName::OpenAi),
            "gemini" | "google" => Ok(ProviderName::Gemini),
            other => Err(format!("Unknown provider: {}", other)),
        }
    }
}

/// Concrete model id for a provider and tier.
pub fn model_id(provider: ProviderName, tier: ModelTier) -> &'static str {
    match (provider, tier) {
        (ProviderName::OpenAi, ModelTier::Fast) => "gpt-4o-mini",
        (ProviderName::OpenAi, ModelTier::Balanced) => "gpt-4o",
        (ProviderName::OpenAi, ModelTier::Premium) => "gpt-4o",
        (ProviderName::Gemini, ModelTier::Fast) => "gemini-2.0-flash",
        (ProviderName::Gemini, ModelTier::Balanced) => "gemini-2.5-flash",
        (ProviderName::Gemini, ModelTier::Premium) => "gemini-2.5-pro",
    }
}

/// JSON Schema the provider must constrain its output to.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    /// Identifier sent to providers that name their schemas.
    pub name: String,

    pub schema: Value,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Schema used by the health probe: `{status: string}`.
    pub fn status_probe() -> Self {
        Self::new(
            "status_probe",
            json!({
                "type": "object",
                "properties": { "status": { "type": "string" } },
                "required": ["status"],
                "additionalProperties": false
            }),
        )
    }
}

/// Parameters for one structured generation.
#[derive(Debug, Clone)]
pub struct ObjectRequest {
    pub schema: OutputSchema,

    pub prompt: String,

    /// Overrides the provider's default tier.
    pub tier: Option<ModelTier>,

    /// Temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Maximum output tokens.
    pub max_tokens: Option<u32>,
}

impl ObjectRequest {
    pub fn new(schema: OutputSchema, prompt: impl Into<String>) -> Self {
        Self {
            schema,
            prompt: prompt.into(),
            tier: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_tier(mut self, tier: ModelTier) -> Self {
        self.tier = Some(tier);
        self
    }
}

/// Outcome of a provider probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Uniform interface over LLM backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Start a streaming structured generation.
    ///
    /// Errors returned here happen before any output (bad status, network);
    /// later failures surface through the returned [`ObjectStream`].
    async fn stream_object(&self, request: ObjectRequest) -> Result<ObjectStream, ProviderError>;

    /// Verify credentials and connectivity with a trivial generation.
    async fn health_check(&self) -> HealthStatus {
        let request = ObjectRequest::new(OutputSchema::status_probe(), r#"Reply with status: "ok""#)
            .with_tier(ModelTier::Fast);

        let stream = match self.stream_object(request).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "Provider health check failed");
                return HealthStatus::unhealthy(e.public_message());
            }
        };

        match stream.object.await {
            Ok(value) if value.get("status").and_then(Value::as_str) == Some("ok") => {
                HealthStatus::healthy()
            }
            Ok(value) => HealthStatus::unhealthy(format!("Unexpected probe response: {}", value)),
            Err(e) => {
                tracing::warn!(error = %e, "Provider health check failed");
                HealthStatus::unhealthy(e.public_message())
            }
        }
    }
}
