//! Optional factual context for a topic, fetched from the Tavily search API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use service_core::observability::WithTraceContext;
use std::fmt::Write as _;
use std::time::Duration;
use thiserror::Error;

/// Tavily API base URL.
pub const TAVILY_API_BASE: &str = "https://api.tavily.com";

const MAX_RESULTS: u32 = 5;
const DETAIL_RESULTS: usize = 3;
const SNIPPET_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum WebSearchError {
    #[error("Search API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Context block for `topic`, or `None` when nothing useful was found.
    async fn search_context(&self, topic: &str) -> Result<Option<String>, WebSearchError>;
}

#[derive(Debug, Clone)]
pub struct TavilyConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl TavilyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: TAVILY_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct TavilySearch {
    config: TavilyConfig,
    client: Client,
}

impl TavilySearch {
    pub fn new(config: TavilyConfig) -> Result<Self, WebSearchError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl WebSearch for TavilySearch {
    async fn search_context(&self, topic: &str) -> Result<Option<String>, WebSearchError> {
        if self.config.api_key.trim().is_empty() {
            return Ok(None);
        }

        let body = SearchRequest {
            api_key: &self.config.api_key,
            query: format!("{} là gì tiktok trend viral context", topic.trim()),
            search_depth: "basic",
            include_answer: true,
            max_results: MAX_RESULTS,
        };

        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        tracing::debug!(topic = %topic, "Searching web context");

        let response = self
            .client
            .post(url)
            .with_trace_context()
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Tavily search failed");
            return Err(WebSearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let results: SearchResponse = response.json().await?;
        Ok(format_context(&results))
    }
}

/// Render a search response as the prompt's context block.
pub(crate) fn format_context(response: &SearchResponse) -> Option<String> {
    let mut context = String::new();

    if let Some(answer) = response.answer.as_deref().filter(|a| !a.trim().is_empty()) {
        let _ = write!(context, "SUMMARY: {}\n\n", answer.trim());
    }

    if !response.results.is_empty() {
        context.push_str("DETAILS:\n");
        for (i, result) in response.results.iter().take(DETAIL_RESULTS).enumerate() {
            let snippet: String = result.content.chars().take(SNIPPET_CHARS).collect();
            let _ = write!(context, "{}. {}\n   {}...\n\n", i + 1, result.title, snippet);
        }
    }

    let context = context.trim();
    (!context.is_empty()).then(|| context.to_string())
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: String,
    search_depth: &'static str,
    include_answer: bool,
    max_results: u32,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}
