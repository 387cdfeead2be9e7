use crate::services::providers::{model_id, ModelTier, ProviderName};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub provider: ProviderConfig,
    pub mongodb: Option<MongoConfig>,
    pub search: SearchConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub name: ProviderName,
    pub tier: ModelTier,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: Option<String>,
}

impl ProviderConfig {
    /// Key of the selected provider, if set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        let key = match self.name {
            ProviderName::OpenAi => self.openai_api_key.as_deref(),
            ProviderName::Gemini => self.gemini_api_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }

    /// Env var holding the selected provider's key.
    pub fn api_key_var(&self) -> &'static str {
        match self.name {
            ProviderName::OpenAi => "OPENAI_API_KEY",
            ProviderName::Gemini => "GOOGLE_GENERATIVE_AI_API_KEY",
        }
    }

    pub fn model(&self) -> &'static str {
        model_id(self.name, self.tier)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub tavily_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub request_timeout_secs: u64,
    pub hook_examples: usize,
    /// Characters per chunk when replaying a cached result.
    pub replay_chunk_size: usize,
    pub replay_delay_ms: u64,
}

impl GenerationConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            hook_examples: 3,
            replay_chunk_size: 50,
            replay_delay_ms: 10,
        }
    }
}

impl ScriptConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";
        let defaults = GenerationConfig::default();

        let name: ProviderName = get_env("SCRIPT_PROVIDER", Some("openai"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;
        let tier: ModelTier = get_env("SCRIPT_MODEL_TIER", Some("fast"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let provider = ProviderConfig {
            name,
            tier,
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL"),
            gemini_api_key: optional_env("GOOGLE_GENERATIVE_AI_API_KEY"),
            gemini_base_url: optional_env("GEMINI_BASE_URL"),
        };

        // The selected provider's key is mandatory everywhere
        if provider.api_key().is_none() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required for provider {} but not set",
                provider.api_key_var(),
                provider.name
            )));
        }

        let mongodb = if is_prod {
            Some(MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("viral_scripts"), false)?,
            })
        } else {
            optional_env("MONGODB_URI").map(|uri| MongoConfig {
                uri,
                database: optional_env("MONGODB_DATABASE")
                    .unwrap_or_else(|| "viral_scripts".to_string()),
            })
        };

        Ok(ScriptConfig {
            common: common_config,
            provider,
            mongodb,
            search: SearchConfig {
                tavily_api_key: optional_env("TAVILY_API_KEY"),
            },
            generation: GenerationConfig {
                request_timeout_secs: parse_env(
                    "SCRIPT_REQUEST_TIMEOUT_SECS",
                    defaults.request_timeout_secs,
                )?,
                hook_examples: parse_env("SCRIPT_HOOK_EXAMPLES", defaults.hook_examples)?,
                replay_chunk_size: parse_env(
                    "SCRIPT_REPLAY_CHUNK_SIZE",
                    defaults.replay_chunk_size,
                )?,
                replay_delay_ms: parse_env("SCRIPT_REPLAY_DELAY_MS", defaults.replay_delay_ms)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match optional_env(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            AppError::ConfigError(anyhow::anyhow!("{} has an invalid value: {}", key, raw))
        }),
        None => Ok(default),
    }
}
