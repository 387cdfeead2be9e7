use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
pub struct Check {
    pub status: CheckState,
    pub message: String,
}

impl Check {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: CheckState::Ok,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: CheckState::Error,
            message: message.into(),
        }
    }

    fn is_ok(&self) -> bool {
        matches!(self.status, CheckState::Ok)
    }
}

/// `GET /health`: configuration, database and AI provider checks.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let mut checks = BTreeMap::new();
    let settings = &state.settings;

    checks.insert(
        "apiKey",
        if settings.api_key_configured {
            Check::ok("API key is set")
        } else {
            Check::error(format!("{} is missing", settings.api_key_var))
        },
    );

    checks.insert(
        "database",
        if settings.database_configured {
            Check::ok("Database URL is configured")
        } else {
            Check::error("MONGODB_URI is missing")
        },
    );

    checks.insert(
        "databaseConnection",
        match state.cache.ping().await {
            Ok(()) => Check::ok(format!(
                "Cache connection successful ({})",
                state.cache.backend()
            )),
            Err(e) => Check::error(e.to_string()),
        },
    );

    checks.insert(
        "aiProvider",
        match state.generator.health_status() {
            Some(status) if status.ok => Check::ok("Startup health check passed"),
            Some(status) => Check::error(
                status
                    .error
                    .unwrap_or_else(|| "Startup health check failed".to_string()),
            ),
            None => Check::ok("Startup health check pending"),
        },
    );

    let healthy = checks.values().all(Check::is_ok);
    if !healthy {
        tracing::warn!("Health check reports unhealthy");
    }

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if healthy { "healthy" } else { "unhealthy" },
            "timestamp": Utc::now().to_rfc3339(),
            "checks": checks,
        })),
    )
}

/// `GET /ready`: the cache answers.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.cache.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
