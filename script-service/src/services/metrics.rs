//! Prometheus metrics for script-service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{Mutex, OnceLock};

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// Generation metrics
pub static GENERATION_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static PROMPT_TOKENS_ESTIMATE: OnceLock<HistogramVec> = OnceLock::new();
pub static PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static PROVIDER_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

// Cache metrics
pub static CACHE_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

// Web search metrics
pub static WEB_CONTEXT_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static HEALTH_PROBE_FAILURES_TOTAL: OnceLock<IntCounter> = OnceLock::new();

/// Initialize all metrics. Call once at startup; later calls are no-ops.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    static INIT: Mutex<()> = Mutex::new(());
    let _guard = INIT.lock().unwrap_or_else(|e| e.into_inner());

    if REGISTRY.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    // Requests by cache outcome (hit, miss, rejected)
    let requests = IntCounterVec::new(
        Opts::new("script_generation_requests_total", "Total script generation requests"),
        &["cache_status"],
    )?;

    let prompt_tokens = HistogramVec::new(
        HistogramOpts::new(
            "script_prompt_tokens_estimate",
            "Estimated prompt size in tokens",
        )
        .buckets(vec![250.0, 500.0, 1000.0, 1500.0, 2000.0, 3000.0, 5000.0]),
        &["provider"],
    )?;

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "script_provider_latency_seconds",
            "Time from request to complete provider output",
        )
        .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0]),
        &["provider", "model"],
    )?;

    let provider_errors = IntCounterVec::new(
        Opts::new("script_provider_errors_total", "Total provider errors"),
        &["provider", "error_type"],
    )?;

    let cache_errors = IntCounterVec::new(
        Opts::new("script_cache_errors_total", "Total cache read/write errors"),
        &["operation"],
    )?;

    let web_context = IntCounterVec::new(
        Opts::new("script_web_context_total", "Web context lookups by outcome"),
        &["outcome"],
    )?;

    let probe_failures = IntCounter::new(
        "script_health_probe_failures_total",
        "Failed provider health probes",
    )?;

    registry.register(Box::new(requests.clone()))?;
    registry.register(Box::new(prompt_tokens.clone()))?;
    registry.register(Box::new(provider_latency.clone()))?;
    registry.register(Box::new(provider_errors.clone()))?;
    registry.register(Box::new(cache_errors.clone()))?;
    registry.register(Box::new(web_context.clone()))?;
    registry.register(Box::new(probe_failures.clone()))?;

    // Initialize globals
    let _ = REGISTRY.set(registry);
    let _ = GENERATION_REQUESTS_TOTAL.set(requests);
    let _ = PROMPT_TOKENS_ESTIMATE.set(prompt_tokens);
    let _ = PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = PROVIDER_ERRORS_TOTAL.set(provider_errors);
    let _ = CACHE_ERRORS_TOTAL.set(cache_errors);
    let _ = WEB_CONTEXT_TOTAL.set(web_context);
    let _ = HEALTH_PROBE_FAILURES_TOTAL.set(probe_failures);

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
        format!("# Failed to convert metrics to UTF-8: {}\n", e)
    })
}

// Helper functions for recording metrics

pub fn record_generation_request(cache_status: &str) {
    if let Some(counter) = GENERATION_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[cache_status]).inc();
    }
}

pub fn record_prompt_tokens(provider: &str, tokens: usize) {
    if let Some(histogram) = PROMPT_TOKENS_ESTIMATE.get() {
        histogram.with_label_values(&[provider]).observe(tokens as f64);
    }
}

pub fn record_provider_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(histogram) = PROVIDER_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(counter) = PROVIDER_ERRORS_TOTAL.get() {
        counter.with_label_values(&[provider, error_type]).inc();
    }
}

/// Record a cache failure; `operation` is `lookup` or `store`.
pub fn record_cache_error(operation: &str) {
    if let Some(counter) = CACHE_ERRORS_TOTAL.get() {
        counter.with_label_values(&[operation]).inc();
    }
}

pub fn record_web_context(found: bool) {
    if let Some(counter) = WEB_CONTEXT_TOTAL.get() {
        counter
            .with_label_values(&[if found { "found" } else { "none" }])
            .inc();
    }
}

pub fn record_health_probe_failure() {
    if let Some(counter) = HEALTH_PROBE_FAILURES_TOTAL.get() {
        counter.inc();
    }
}
