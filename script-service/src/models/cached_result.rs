use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored generation keyed by its request's cache key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResult {
    /// See [`crate::models::cache_key`].
    pub cache_key: String,

    /// The script as a JSON object (schema-shaped, camelCase).
    pub data: serde_json::Value,

    /// Model id that produced the content (e.g. "gpt-4o-mini").
    pub model_used: String,

    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl CachedResult {
    pub fn new(
        cache_key: impl Into<String>,
        data: serde_json::Value,
        model_used: impl Into<String>,
    ) -> Self {
        Self {
            cache_key: cache_key.into(),
            data,
            model_used: model_used.into(),
            created_at: Utc::now(),
        }
    }
}
