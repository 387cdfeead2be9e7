//! OpenAI provider implementation.
//!
//! Uses streaming chat completions with a strict `json_schema` response format.

use super::stream::{spawn_sse_pump, Chunk};
use super::{model_id, LlmProvider, ModelTier, ObjectRequest, ObjectStream, ProviderError, ProviderName};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use service_core::observability::WithTraceContext;
use std::time::Duration;

/// OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub default_tier: ModelTier,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_API_BASE.to_string(),
            default_tier: ModelTier::Fast,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "OPENAI_API_KEY not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn stream_object(&self, request: ObjectRequest) -> Result<ObjectStream, ProviderError> {
        let tier = request.tier.unwrap_or(self.config.default_tier);
        let model = model_id(ProviderName::OpenAi, tier);

        let body = ChatCompletionRequest {
            model,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
            stream: true,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: &request.schema.name,
                    strict: true,
                    schema: &request.schema.schema,
                },
            },
        };

        tracing::debug!(
            model = %model,
            tier = ?tier,
            prompt_len = request.prompt.len(),
            "Starting streaming request to OpenAI API"
        );

        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.config.api_key)
            .with_trace_context()
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "OpenAI API returned an error");
            return Err(ProviderError::from_status(status, error_text));
        }

        Ok(spawn_sse_pump(response, parse_event))
    }
}

/// Parse one chat-completion stream event.
pub(crate) fn parse_event(data: &str) -> Result<Chunk, ProviderError> {
    if data.trim() == "[DONE]" {
        return Ok(Chunk {
            text: None,
            done: true,
        });
    }

    let chunk: ChatCompletionChunk =
        serde_json::from_str(data).map_err(|e| ProviderError::Decode(e.to_string()))?;

    if let Some(error) = chunk.error {
        return Err(ProviderError::Api {
            status: 500,
            message: error.message,
        });
    }

    let Some(choice) = chunk.choices.into_iter().next() else {
        return Ok(Chunk::default());
    };

    match choice.finish_reason.as_deref() {
        Some("length") => return Err(ProviderError::Truncated),
        Some("content_filter") => return Err(ProviderError::ContentFiltered),
        _ => {}
    }

    if let Some(refusal) = choice.delta.refusal.filter(|r| !r.is_empty()) {
        return Err(ProviderError::Api {
            status: 200,
            message: format!("Model refused: {}", refusal),
        });
    }

    Ok(Chunk {
        text: choice.delta.content,
        done: false,
    })
}

// ============================================================================
// OpenAI API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
