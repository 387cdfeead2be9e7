use crate::models::{CachedResult, GenerationRequest, VideoDuration};
use crate::services::metrics;
use crate::startup::AppState;
use axum::{
    body::{Body, Bytes},
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use futures::{future, stream, StreamExt};
use serde::Deserialize;
use service_core::error::AppError;
use std::convert::Infallible;
use std::time::{Duration, Instant};

const X_CACHE_STATUS: HeaderName = HeaderName::from_static("x-cache-status");
const X_MODEL: HeaderName = HeaderName::from_static("x-model");
const X_RESPONSE_TIME: HeaderName = HeaderName::from_static("x-response-time");
const X_WEB_CONTEXT: HeaderName = HeaderName::from_static("x-web-context");

const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    pub topic: Option<String>,
    pub vibe: Option<String>,
    pub platform: Option<String>,
    pub duration: Option<String>,
    pub include_visuals: Option<bool>,
}

impl GenerateBody {
    fn into_request(self) -> Result<GenerationRequest, AppError> {
        let required = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let (Some(topic), Some(vibe), Some(platform)) = (
            required(self.topic),
            required(self.vibe),
            required(self.platform),
        ) else {
            return Err(AppError::bad_request(
                "Missing required fields: topic, vibe, platform",
            ));
        };

        let duration = match self.duration.as_deref().map(str::trim) {
            None | Some("") => VideoDuration::default(),
            Some(raw) => raw.parse::<VideoDuration>().map_err(AppError::bad_request)?,
        };

        Ok(GenerationRequest::new(topic, vibe, platform)
            .with_duration(duration)
            .with_visuals(self.include_visuals.unwrap_or(false)))
    }
}

/// `POST /generate`: stream a script as progressive JSON text.
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let started = Instant::now();

    if let Err(e) = state.generator.ensure_available() {
        tracing::warn!(error = %e, "Rejecting request; startup health check failed");
        metrics::record_generation_request("rejected");
        return Err(e.into());
    }

    let Json(body) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    let request = body.into_request()?;
    let cache_key = request.cache_key();

    tracing::info!(
        topic = %request.topic,
        vibe = %request.vibe,
        platform = %request.platform,
        duration = %request.duration,
        cache_key = %cache_key,
        "Script generation requested"
    );

    match state.cache.lookup(&cache_key).await {
        Ok(Some(hit)) => {
            let elapsed_ms = started.elapsed().as_millis();
            tracing::info!(cache_key = %cache_key, elapsed_ms = elapsed_ms as u64, "Cache hit");
            metrics::record_generation_request("hit");
            let model = if hit.model_used.is_empty() {
                state.generator.model_label().to_string()
            } else {
                hit.model_used.clone()
            };
            return replay_cached(&state, &hit, &model, elapsed_ms);
        }
        Ok(None) => tracing::info!(cache_key = %cache_key, "Cache miss"),
        Err(e) => {
            metrics::record_cache_error("lookup");
            tracing::warn!(cache_key = %cache_key, error = %e, "Cache lookup failed; generating");
        }
    }

    metrics::record_generation_request("miss");

    let web_context = match &state.web_search {
        Some(search) => match search.search_context(&request.topic).await {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(error = %e, "Web search failed; continuing without context");
                None
            }
        },
        None => None,
    };
    let found_context = web_context.is_some();
    metrics::record_web_context(found_context);

    let request = request.with_web_context(web_context);
    let generation = state
        .generator
        .generate_script(&request)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Script generation failed before streaming");
            AppError::from(e)
        })?;

    let model = state.generator.model_label().to_string();
    let cache = state.cache.clone();
    let result = generation.result;
    let model_used = model.clone();

    tokio::spawn(async move {
        let script = match result.await {
            Ok(script) => script,
            Err(e) => {
                tracing::error!(cache_key = %cache_key, error = %e, "Generation failed; not caching");
                return;
            }
        };

        let data = match serde_json::to_value(&script) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize script for cache");
                return;
            }
        };

        let entry = CachedResult::new(cache_key, data, model_used);
        match cache.store(&entry).await {
            Ok(()) => tracing::info!(cache_key = %entry.cache_key, "Saved to cache"),
            Err(e) => {
                metrics::record_cache_error("store");
                tracing::warn!(cache_key = %entry.cache_key, error = %e, "Failed to save to cache");
            }
        }
    });

    // A provider failure ends the body early; the spawned task logs it
    let text = generation
        .text
        .take_while(|chunk| future::ready(chunk.is_ok()))
        .filter_map(|chunk| future::ready(chunk.ok().map(|text| Ok::<_, Infallible>(Bytes::from(text)))));

    let mut response = Body::from_stream(text).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN_UTF8));
    headers.insert(X_CACHE_STATUS, HeaderValue::from_static("MISS"));
    insert_header(headers, X_MODEL, &model);
    headers.insert(
        X_WEB_CONTEXT,
        HeaderValue::from_static(if found_context { "FOUND" } else { "NONE" }),
    );

    Ok(response)
}

fn replay_cached(
    state: &AppState,
    hit: &CachedResult,
    model: &str,
    elapsed_ms: u128,
) -> Result<Response, AppError> {
    let json = serde_json::to_string_pretty(&hit.data).map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to encode cached result: {}", e))
    })?;

    let chunks = split_chunks(&json, state.settings.replay_chunk_size);
    let delay = state.settings.replay_delay;

    let body = stream::iter(chunks.into_iter().enumerate()).then(move |(i, chunk)| async move {
        if i > 0 && delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }
        Ok::<_, Infallible>(Bytes::from(chunk))
    });

    let mut response = Body::from_stream(body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN_UTF8));
    headers.insert(X_CACHE_STATUS, HeaderValue::from_static("HIT"));
    insert_header(headers, X_MODEL, model);
    insert_header(headers, X_RESPONSE_TIME, &format!("{}ms", elapsed_ms));

    Ok(response)
}

fn insert_header(headers: &mut axum::http::HeaderMap, name: HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

/// Split on char boundaries into pieces of at most `size` chars.
fn split_chunks(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|c| c.iter().collect())
        .collect()
}
