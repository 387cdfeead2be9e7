//! Application startup and lifecycle management.

use crate::config::ScriptConfig;
use crate::handlers;
use crate::prompts::PromptRegistry;
use crate::services::providers::{ProviderFactory, ProviderKeys};
use crate::services::{
    GeneratorOptions, InMemoryScriptCache, MongoScriptCache, ScriptCache, ScriptGenerator,
    TavilyConfig, TavilySearch, WebSearch,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::request_id_middleware;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Values handlers need that are fixed at startup.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub api_key_var: &'static str,
    pub api_key_configured: bool,
    pub database_configured: bool,
    pub replay_chunk_size: usize,
    pub replay_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            api_key_var: "OPENAI_API_KEY",
            api_key_configured: true,
            database_configured: true,
            replay_chunk_size: 50,
            replay_delay: Duration::from_millis(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<ScriptGenerator>,
    pub cache: Arc<dyn ScriptCache>,
    pub web_search: Option<Arc<dyn WebSearch>>,
    pub settings: RuntimeSettings,
}

impl AppState {
    /// Wire every dependency from configuration. Fails on a missing
    /// provider key or an unreachable database.
    pub async fn from_config(config: &ScriptConfig) -> Result<Self, AppError> {
        let factory = ProviderFactory::new(ProviderKeys {
            openai_api_key: config.provider.openai_api_key.clone(),
            openai_base_url: config.provider.openai_base_url.clone(),
            gemini_api_key: config.provider.gemini_api_key.clone(),
            gemini_base_url: config.provider.gemini_base_url.clone(),
            timeout: Some(config.generation.request_timeout()),
        });

        let provider = factory
            .get(config.provider.name, config.provider.tier)
            .map_err(|e| {
                tracing::error!("Failed to initialize LLM provider: {}", e);
                AppError::ConfigError(anyhow::anyhow!(e.to_string()))
            })?;

        let options = GeneratorOptions {
            tier: config.provider.tier,
            provider_label: config.provider.name.as_str().to_string(),
            model_label: config.provider.model().to_string(),
            hook_examples: config.generation.hook_examples,
            ..GeneratorOptions::default()
        };

        tracing::info!(
            provider = %config.provider.name,
            model = %options.model_label,
            "Initialized script generator"
        );

        let registry = Arc::new(PromptRegistry::with_defaults());
        let generator = Arc::new(ScriptGenerator::new(provider, registry, options));

        let cache: Arc<dyn ScriptCache> = match &config.mongodb {
            Some(mongo) => {
                let db = MongoScriptCache::connect(&mongo.uri, &mongo.database)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to connect to MongoDB: {}", e);
                        e
                    })?;
                db.initialize_indexes().await.map_err(|e| {
                    tracing::error!("Failed to initialize database indexes: {}", e);
                    e
                })?;
                Arc::new(db)
            }
            None => {
                tracing::warn!("MONGODB_URI not set; using in-memory cache");
                Arc::new(InMemoryScriptCache::new())
            }
        };

        let web_search: Option<Arc<dyn WebSearch>> = match &config.search.tavily_api_key {
            Some(key) => {
                let search = TavilySearch::new(TavilyConfig::new(key.clone())).map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!("Web search client: {}", e))
                })?;
                Some(Arc::new(search) as Arc<dyn WebSearch>)
            }
            None => {
                tracing::info!("TAVILY_API_KEY not set; web context disabled");
                None
            }
        };

        Ok(Self {
            generator,
            cache,
            web_search,
            settings: RuntimeSettings {
                api_key_var: config.provider.api_key_var(),
                api_key_configured: config.provider.api_key().is_some(),
                database_configured: config.mongodb.is_some(),
                replay_chunk_size: config.generation.replay_chunk_size,
                replay_delay: Duration::from_millis(config.generation.replay_delay_ms),
                request_timeout: config.generation.request_timeout(),
            },
        })
    }
}

pub fn router(state: AppState) -> Router {
    let timeout = state.settings.request_timeout;

    Router::new()
        .route("/generate", post(handlers::generate::generate))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: ScriptConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(&config).await?;
        Self::build_with_state(state, config.common.port).await
    }

    /// Bind and prepare the server around an existing state. Once bound,
    /// starts the AI provider probe in the background.
    pub async fn build_with_state(state: AppState, port: u16) -> Result<Self, AppError> {
        let app = router(state.clone());

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Script service listening on port {}", port);

        let probe = state.generator.clone();
        tokio::spawn(async move {
            probe.check_ai_health().await;
        });

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
