//! Versioned prompt fragment store.
//!
//! The registry is filled once at startup, then shared as `Arc<PromptRegistry>`.
//! Registration needs `&mut self`, so a shared registry is effectively frozen.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Error type for prompt lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("Prompt not found: {0}")]
    NotFound(String),
}

/// Category a fragment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptCategory {
    /// Persona: who the model is.
    System,
    /// Tone modifiers mapped from the UI vibe.
    Style,
    /// What to produce and in which shape.
    Task,
}

impl PromptCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptCategory::System => "system",
            PromptCategory::Style => "style",
            PromptCategory::Task => "task",
        }
    }
}

/// Descriptive data attached to every fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptMetadata {
    /// Version label, e.g. `GENZ_V1`.
    pub version: String,

    pub category: PromptCategory,

    pub description: String,

    /// Rough token count, see [`crate::prompts::estimate_tokens`].
    pub token_estimate: usize,

    pub created_at: NaiveDate,
}

/// A registered piece of prompt text.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptFragment {
    pub content: String,
    pub metadata: PromptMetadata,
}

impl PromptFragment {
    /// Build a fragment; the token estimate is derived from the content.
    pub fn new(
        content: impl Into<String>,
        version: impl Into<String>,
        category: PromptCategory,
        description: impl Into<String>,
        created_at: NaiveDate,
    ) -> Self {
        let content = content.into();
        let token_estimate = super::estimate_tokens(&content);
        Self {
            content,
            metadata: PromptMetadata {
                version: version.into(),
                category,
                description: description.into(),
                token_estimate,
                created_at,
            },
        }
    }
}

/// Listing entry returned by [`PromptRegistry::list`].
#[derive(Debug, Clone, Serialize)]
pub struct PromptListing<'a> {
    pub key: &'a str,
    pub metadata: &'a PromptMetadata,
}

#[derive(Debug, Clone, Default)]
pub struct PromptRegistry {
    prompts: BTreeMap<String, PromptFragment>,
    active_versions: HashMap<PromptCategory, String>,
}

impl PromptRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in persona, style and task fragment.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        super::system::register_defaults(&mut registry);
        super::styles::register_defaults(&mut registry);
        super::tasks::register_defaults(&mut registry);
        registry
    }

    /// Add or replace a fragment. Last write wins.
    pub fn register(&mut self, key: impl Into<String>, fragment: PromptFragment) {
        let key = key.into();
        if self.prompts.insert(key.clone(), fragment).is_some() {
            tracing::debug!(key = %key, "Replaced prompt fragment");
        }
    }

    pub fn get(&self, key: &str) -> Option<&PromptFragment> {
        self.prompts.get(key)
    }

    pub fn get_content(&self, key: &str) -> Result<&str, PromptError> {
        self.prompts
            .get(key)
            .map(|p| p.content.as_str())
            .ok_or_else(|| PromptError::NotFound(key.to_string()))
    }

    /// Join the contents of `keys`, in order, separated by a blank line.
    pub fn compose<S: AsRef<str>>(&self, keys: &[S]) -> Result<String, PromptError> {
        let parts = keys
            .iter()
            .map(|key| self.get_content(key.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join("\n\n"))
    }

    pub fn set_active_version(&mut self, category: PromptCategory, version: impl Into<String>) {
        self.active_versions.insert(category, version.into());
    }

    pub fn active_version(&self, category: PromptCategory) -> Option<&str> {
        self.active_versions.get(&category).map(String::as_str)
    }

    /// All fragments with their metadata, sorted by key.
    pub fn list(&self) -> Vec<PromptListing<'_>> {
        self.prompts
            .iter()
            .map(|(key, p)| PromptListing {
                key,
                metadata: &p.metadata,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(content: &str) -> PromptFragment {
        PromptFragment::new(
            content,
            "TEST_V1",
            PromptCategory::Task,
            "test fragment",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
    }

    #[test]
    fn get_content_reports_missing_key() {
        let registry = PromptRegistry::new();
        assert_eq!(
            registry.get_content("task:missing_v1"),
            Err(PromptError::NotFound("task:missing_v1".to_string()))
        );
    }

    #[test]
    fn register_last_write_wins() {
        let mut registry = PromptRegistry::new();
        registry.register("task:a_v1", fragment("first"));
        registry.register("task:a_v1", fragment("second"));
        assert_eq!(registry.get_content("task:a_v1").unwrap(), "second");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn compose_joins_in_given_order() {
        let mut registry = PromptRegistry::new();
        registry.register("task:a_v1", fragment("A"));
        registry.register("task:b_v1", fragment("B"));
        assert_eq!(registry.compose(&["task:b_v1", "task:a_v1"]).unwrap(), "B\n\nA");
    }

    #[test]
    fn compose_fails_on_first_missing_key() {
        let mut registry = PromptRegistry::new();
        registry.register("task:a_v1", fragment("A"));
        let err = registry.compose(&["task:a_v1", "task:nope_v1"]).unwrap_err();
        assert_eq!(err, PromptError::NotFound("task:nope_v1".to_string()));
    }

    #[test]
    fn list_is_sorted_by_key() {
        let mut registry = PromptRegistry::new();
        registry.register("style:z_v1", fragment("z"));
        registry.register("style:a_v1", fragment("a"));
        let keys: Vec<_> = registry.list().iter().map(|l| l.key).collect();
        assert_eq!(keys, vec!["style:a_v1", "style:z_v1"]);
    }

    #[test]
    fn token_estimate_is_derived_from_content() {
        assert_eq!(fragment("abcdefgh").metadata.token_estimate, 2);
    }

    #[test]
    fn defaults_register_every_category() {
        let registry = PromptRegistry::with_defaults();
        assert!(registry.get("system:genz_v1").is_some());
        assert!(registry.get("style:educational_v1").is_some());
        assert!(registry.get("task:generate_script_v1").is_some());
        assert!(registry.get("task:visual_prompt_v1").is_some());
        assert_eq!(registry.active_version(PromptCategory::System), Some("GENZ_V1"));
        assert_eq!(registry.active_version(PromptCategory::Task), None);
    }
}
