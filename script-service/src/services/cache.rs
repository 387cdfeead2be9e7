//! Result cache consulted before generation and written after it.
//!
//! Entries are write-once: the first stored result for a key is kept and
//! later writes for the same key are ignored.

use crate::models::CachedResult;
use async_trait::async_trait;
use dashmap::DashMap;
use mongodb::{
    bson::{doc, to_document},
    error::{ErrorKind, WriteFailure},
    options::{FindOneOptions, IndexOptions, UpdateOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

const CACHED_RESULTS: &str = "cached_results";
const DUPLICATE_KEY: i32 = 11000;

#[async_trait]
pub trait ScriptCache: Send + Sync {
    /// Newest stored result for `cache_key`, if any.
    async fn lookup(&self, cache_key: &str) -> Result<Option<CachedResult>, AppError>;

    /// Store `entry` unless its key is already present.
    async fn store(&self, entry: &CachedResult) -> Result<(), AppError>;

    /// Connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), AppError>;

    /// Backend label for logs and health output.
    fn backend(&self) -> &'static str;
}

#[derive(Clone)]
pub struct MongoScriptCache {
    client: MongoClient,
    db: Database,
}

impl MongoScriptCache {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for script-service");

        // One row per key; concurrent writers race on this index
        let cache_key_index = IndexModel::builder()
            .keys(doc! { "cache_key": 1 })
            .options(
                IndexOptions::builder()
                    .name("cache_key_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.results()
            .create_index(cache_key_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create cache_key index: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        let created_at_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("created_at_idx".to_string())
                    .build(),
            )
            .build();

        self.results()
            .create_index(created_at_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create created_at index: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    fn results(&self) -> Collection<CachedResult> {
        self.db.collection(CACHED_RESULTS)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl ScriptCache for MongoScriptCache {
    async fn lookup(&self, cache_key: &str) -> Result<Option<CachedResult>, AppError> {
        let options = FindOneOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        self.results()
            .find_one(doc! { "cache_key": cache_key }, options)
            .await
            .map_err(|e| {
                tracing::error!(cache_key = %cache_key, "Failed to read cached result: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })
    }

    async fn store(&self, entry: &CachedResult) -> Result<(), AppError> {
        let document = to_document(entry).map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to serialize cached result: {}", e))
        })?;

        let options = UpdateOptions::builder().upsert(true).build();

        match self
            .results()
            .update_one(
                doc! { "cache_key": &entry.cache_key },
                doc! { "$setOnInsert": document },
                options,
            )
            .await
        {
            Ok(_) => Ok(()),
            // Lost an upsert race; the other writer's row stays
            Err(e) if is_duplicate_key(&e) => {
                tracing::debug!(cache_key = %entry.cache_key, "Cache entry already present");
                Ok(())
            }
            Err(e) => {
                tracing::error!(cache_key = %entry.cache_key, "Failed to store cached result: {}", e);
                Err(AppError::DatabaseError(anyhow::anyhow!(e.to_string())))
            }
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map(|_| ())
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e.to_string())))
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}

/// Process-local cache used when no database is configured.
#[derive(Default)]
pub struct InMemoryScriptCache {
    entries: DashMap<String, CachedResult>,
}

impl InMemoryScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ScriptCache for InMemoryScriptCache {
    async fn lookup(&self, cache_key: &str) -> Result<Option<CachedResult>, AppError> {
        Ok(self.entries.get(cache_key).map(|e| e.value().clone()))
    }

    async fn store(&self, entry: &CachedResult) -> Result<(), AppError> {
        self.entries
            .entry(entry.cache_key.clone())
            .or_insert_with(|| entry.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn first_write_wins() {
        let cache = InMemoryScriptCache::new();
        let key = "cat video-cat-tiktok-30-60-v0";

        cache
            .store(&CachedResult::new(key, json!({"hook": "first"}), "gpt-4o-mini"))
            .await
            .unwrap();
        cache
            .store(&CachedResult::new(key, json!({"hook": "second"}), "gpt-4o-mini"))
            .await
            .unwrap();

        let hit = cache.lookup(key).await.unwrap().unwrap();
        assert_eq!(hit.data["hook"], "first");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn miss_is_none() {
        let cache = InMemoryScriptCache::new();
        assert!(cache.lookup("nothing").await.unwrap().is_none());
        assert!(cache.ping().await.is_ok());
        assert_eq!(cache.backend(), "memory");
    }

    #[test]
    fn serializes_to_stored_shape() {
        let entry = CachedResult::new("k", json!({"hook": "h"}), "gpt-4o");
        let document = to_document(&entry).unwrap();
        assert_eq!(document.get_str("cache_key").unwrap(), "k");
        assert!(document.get_document("data").is_ok());
        assert!(document.get_datetime("created_at").is_ok());
    }
}
