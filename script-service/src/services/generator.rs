//! Script generation: prompt, schema and provider behind one call.
//!
//! The generator also owns the startup health gate. The first probe result
//! is kept for the life of the process; if it failed, every generation is
//! rejected without contacting the provider.

use crate::models::{GenerationRequest, ScriptResult};
use crate::prompts::{estimate_tokens, PromptBuilder, PromptError, PromptRegistry, DEFAULT_HOOK_EXAMPLES};
use crate::schemas::{get_script_schema, SchemaError};
use crate::services::metrics;
use crate::services::providers::{
    HealthStatus, LlmProvider, ModelTier, ObjectRequest, ObjectStream, ProviderError, TextStream,
};
use futures::Future;
use service_core::error::AppError;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("AI service is unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to build prompt: {0}")]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Unavailable(details) => {
                AppError::unavailable("AI service is unavailable", Some(details))
            }
            GenerationError::Provider(e) => AppError::UpstreamFailure {
                error: "Failed to generate content".to_string(),
                message: e.public_message(),
            },
            other => AppError::UpstreamFailure {
                error: "Failed to generate content".to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// The validated script, available once the provider stream ends.
pub type ScriptFuture = Pin<Box<dyn Future<Output = Result<ScriptResult, GenerationError>> + Send>>;

/// Raw JSON text plus the decoded result of one generation.
pub struct ScriptStream {
    pub text: TextStream,
    pub result: ScriptFuture,
    pub prompt_tokens: usize,
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub tier: ModelTier,

    /// Provider name, used as a metrics label.
    pub provider_label: String,

    /// Model id reported to clients in `X-Model`.
    pub model_label: String,

    pub hook_examples: usize,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            tier: ModelTier::Fast,
            provider_label: "openai".to_string(),
            model_label: "gpt-4o-mini".to_string(),
            hook_examples: DEFAULT_HOOK_EXAMPLES,
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Write-once record of the startup probe.
#[derive(Debug, Default)]
struct HealthGate {
    status: OnceLock<HealthStatus>,
}

impl HealthGate {
    /// Keep `status` unless a result is already recorded; returns the kept one.
    fn record(&self, status: HealthStatus) -> &HealthStatus {
        self.status.get_or_init(|| status)
    }

    fn get(&self) -> Option<&HealthStatus> {
        self.status.get()
    }
}

pub struct ScriptGenerator {
    provider: Arc<dyn LlmProvider>,
    builder: PromptBuilder,
    options: GeneratorOptions,
    gate: HealthGate,
}

impl ScriptGenerator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: Arc<PromptRegistry>,
        options: GeneratorOptions,
    ) -> Self {
        let builder = PromptBuilder::new(registry).with_hook_examples(options.hook_examples);
        Self {
            provider,
            builder,
            options,
            gate: HealthGate::default(),
        }
    }

    pub fn model_label(&self) -> &str {
        &self.options.model_label
    }

    pub fn prompt_builder(&self) -> &PromptBuilder {
        &self.builder
    }

    /// Probe the provider and record the outcome in the health gate.
    pub async fn check_ai_health(&self) -> HealthStatus {
        let status = self.provider.health_check().await;

        if status.ok {
            tracing::info!(provider = %self.options.provider_label, "AI provider health check passed");
        } else {
            metrics::record_health_probe_failure();
            tracing::error!(
                provider = %self.options.provider_label,
                error = status.error.as_deref().unwrap_or("unknown"),
                "AI provider health check failed; generation disabled until restart"
            );
        }

        self.gate.record(status).clone()
    }

    /// Recorded probe result, if a probe has run.
    pub fn health_status(&self) -> Option<HealthStatus> {
        self.gate.get().cloned()
    }

    /// Fails only when a probe ran and failed.
    pub fn ensure_available(&self) -> Result<(), GenerationError> {
        match self.gate.get() {
            Some(status) if !status.ok => Err(GenerationError::Unavailable(
                status
                    .error
                    .clone()
                    .unwrap_or_else(|| "Startup health check failed".to_string()),
            )),
            _ => Ok(()),
        }
    }

    /// Start a streaming generation for `request`.
    ///
    /// Errors returned here mean nothing was streamed. Failures after the
    /// provider accepted the call resolve through [`ScriptStream::result`].
    pub async fn generate_script(
        &self,
        request: &GenerationRequest,
    ) -> Result<ScriptStream, GenerationError> {
        self.ensure_available()?;

        let schema = get_script_schema(request.include_visuals);
        let prompt = self.builder.build(request)?;
        let prompt_tokens = estimate_tokens(&prompt);

        tracing::info!(
            schema = schema.name(),
            prompt_tokens,
            tier = ?self.options.tier,
            "Generating script"
        );
        metrics::record_prompt_tokens(&self.options.provider_label, prompt_tokens);

        let mut object_request =
            ObjectRequest::new(schema.output_schema(), prompt).with_tier(self.options.tier);
        object_request.temperature = self.options.temperature;
        object_request.max_tokens = self.options.max_tokens;

        let started = Instant::now();
        let provider_label = self.options.provider_label.clone();
        let model_label = self.options.model_label.clone();

        let ObjectStream { text, object } = match self.provider.stream_object(object_request).await
        {
            Ok(stream) => stream,
            Err(e) => {
                metrics::record_provider_error(&provider_label, e.kind());
                tracing::error!(error = %e, "Provider rejected generation request");
                return Err(e.into());
            }
        };

        let result: ScriptFuture = Box::pin(async move {
            let value = object.await.map_err(|e| {
                metrics::record_provider_error(&provider_label, e.kind());
                tracing::error!(error = %e, "Provider stream failed");
                GenerationError::Provider(e)
            })?;

            metrics::record_provider_latency(
                &provider_label,
                &model_label,
                started.elapsed().as_secs_f64(),
            );

            schema.decode(value).map_err(|e| {
                metrics::record_provider_error(&provider_label, "schema");
                tracing::warn!(error = %e, "Provider output failed schema validation");
                GenerationError::Schema(e)
            })
        });

        Ok(ScriptStream {
            text,
            result,
            prompt_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::{MockProvider, MockReply};
    use futures::StreamExt;
    use serde_json::{json, Value};

    fn script(score: i64, visual: Option<&str>) -> Value {
        let mut value = json!({
            "hook": "Khoan, đừng lướt!",
            "script": "• Ý 1\n• Ý 2\n• Ý 3",
            "cta": "Follow để xem tiếp",
            "analysis": {
                "hookPsychology": "Curiosity gap",
                "viralScore": score,
                "audienceInsight": "Pet owners",
                "viralFramework": "Reveal"
            },
            "scenarioDetected": "KNOWLEDGE"
        });
        if let Some(v) = visual {
            value["visualPrompt"] = json!(v);
        }
        value
    }

    fn generator(mock: Arc<MockProvider>) -> ScriptGenerator {
        ScriptGenerator::new(
            mock,
            Arc::new(PromptRegistry::with_defaults()),
            GeneratorOptions::default(),
        )
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("cat video", "cat", "tiktok")
    }

    #[tokio::test]
    async fn streams_text_and_decodes_result() {
        let mock = Arc::new(MockProvider::with_object(script(8, None)));
        let generator = generator(mock.clone());

        let stream = generator.generate_script(&request()).await.unwrap();
        assert!(stream.prompt_tokens > 0);

        let text: String = stream.text.map(|r| r.unwrap()).collect::<Vec<_>>().await.concat();
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), script(8, None));

        let result = stream.result.await.unwrap();
        assert_eq!(result.analysis.viral_score, 8);
        assert_eq!(mock.calls(), 1);
        assert!(mock.prompts()[0].contains("cat video"));
    }

    #[tokio::test]
    async fn out_of_range_score_is_a_schema_failure() {
        let mock = Arc::new(MockProvider::with_object(script(11, None)));
        let stream = generator(mock).generate_script(&request()).await.unwrap();
        assert!(matches!(stream.result.await, Err(GenerationError::Schema(_))));
    }

    #[tokio::test]
    async fn visuals_request_requires_visual_prompt() {
        let mock = Arc::new(MockProvider::with_object(script(7, None)));
        let stream = generator(mock)
            .generate_script(&request().with_visuals(true))
            .await
            .unwrap();
        assert!(matches!(
            stream.result.await,
            Err(GenerationError::Schema(SchemaError::MissingVisualPrompt))
        ));
    }

    #[tokio::test]
    async fn provider_errors_surface_before_and_during_streaming() {
        let before = Arc::new(MockProvider::new(MockReply::Error(ProviderError::RateLimited)));
        let err = generator(before).generate_script(&request()).await.err();
        assert!(matches!(err, Some(GenerationError::Provider(ProviderError::RateLimited))));

        let during = Arc::new(MockProvider::new(MockReply::FailMidStream(
            "{\"hook\":".to_string(),
            ProviderError::Truncated,
        )));
        let stream = generator(during).generate_script(&request()).await.unwrap();
        assert!(matches!(
            stream.result.await,
            Err(GenerationError::Provider(ProviderError::Truncated))
        ));
    }

    #[tokio::test]
    async fn failed_probe_blocks_generation_without_provider_call() {
        let mock = Arc::new(
            MockProvider::with_object(script(8, None))
                .with_health(HealthStatus::unhealthy("invalid api key")),
        );
        let generator = generator(mock.clone());

        assert!(generator.ensure_available().is_ok());
        assert!(!generator.check_ai_health().await.ok);

        let err = generator.generate_script(&request()).await.err();
        match err {
            Some(GenerationError::Unavailable(details)) => assert_eq!(details, "invalid api key"),
            other => panic!("expected Unavailable, got {:?}", other),
        }
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn first_probe_result_is_kept() {
        let gate = HealthGate::default();
        assert!(gate.get().is_none());
        assert!(!gate.record(HealthStatus::unhealthy("down")).ok);
        assert!(!gate.record(HealthStatus::healthy()).ok);
    }

    #[test]
    fn unavailable_maps_to_service_unavailable() {
        let err: AppError = GenerationError::Unavailable("bad key".into()).into();
        assert!(matches!(err, AppError::ServiceUnavailable { .. }));

        let err: AppError = GenerationError::Provider(ProviderError::RateLimited).into();
        match err {
            AppError::UpstreamFailure { error, message } => {
                assert_eq!(error, "Failed to generate content");
                assert_eq!(message, "Rate limited");
            }
            other => panic!("unexpected {:?}", other),
        }

        let err: AppError = GenerationError::Provider(ProviderError::Api {
            status: 403,
            message: "API key not valid. key=AIza-secret".into(),
        })
        .into();
        match err {
            AppError::UpstreamFailure { message, .. } => {
                assert_eq!(message, "AI provider returned status 403");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
