//! Lazily constructed provider instances, one per (provider, tier).

use super::gemini::{GeminiConfig, GeminiProvider};
use super::openai::{OpenAiConfig, OpenAiProvider};
use super::{LlmProvider, ModelTier, ProviderError, ProviderName};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// Credentials and endpoints for every backend.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: Option<String>,
    pub timeout: Option<Duration>,
}

pub struct ProviderFactory {
    keys: ProviderKeys,
    instances: DashMap<(ProviderName, ModelTier), Arc<dyn LlmProvider>>,
}

impl ProviderFactory {
    pub fn new(keys: ProviderKeys) -> Self {
        Self {
            keys,
            instances: DashMap::new(),
        }
    }

    /// The shared instance for `(name, tier)`, built on first use.
    pub fn get(
        &self,
        name: ProviderName,
        tier: ModelTier,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        if let Some(existing) = self.instances.get(&(name, tier)) {
            return Ok(existing.value().clone());
        }

        let provider = self.build(name, tier)?;
        let entry = self.instances.entry((name, tier)).or_insert(provider);
        Ok(entry.value().clone())
    }

    fn build(&self, name: ProviderName, tier: ModelTier) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        let timeout = self.keys.timeout.unwrap_or(Duration::from_secs(30));

        tracing::info!(provider = %name, tier = ?tier, "Initializing LLM provider");

        match name {
            ProviderName::OpenAi => {
                let api_key = non_empty(&self.keys.openai_api_key).ok_or_else(|| {
                    ProviderError::NotConfigured("OPENAI_API_KEY not configured".to_string())
                })?;
                let mut config = OpenAiConfig::new(api_key);
                if let Some(base_url) = non_empty(&self.keys.openai_base_url) {
                    config.base_url = base_url;
                }
                config.default_tier = tier;
                config.timeout = timeout;
                Ok(Arc::new(OpenAiProvider::new(config)?))
            }
            ProviderName::Gemini => {
                let api_key = non_empty(&self.keys.gemini_api_key).ok_or_else(|| {
                    ProviderError::NotConfigured(
                        "GOOGLE_GENERATIVE_AI_API_KEY not configured".to_string(),
                    )
                })?;
                let mut config = GeminiConfig::new(api_key);
                if let Some(base_url) = non_empty(&self.keys.gemini_base_url) {
                    config.base_url = base_url;
                }
                config.default_tier = tier;
                config.timeout = timeout;
                Ok(Arc::new(GeminiProvider::new(config)?))
            }
        }
    }

    /// Drop every cached instance.
    pub fn reset(&self) {
        self.instances.clear();
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
