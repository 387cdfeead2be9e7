//! Generation request model and its cache key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Requested spoken length of the video, bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VideoDuration {
    #[serde(rename = "15-30")]
    Short,
    #[default]
    #[serde(rename = "30-60")]
    Medium,
    #[serde(rename = "60-90")]
    Long,
}

impl VideoDuration {
    /// Wire form, also used in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoDuration::Short => "15-30",
            VideoDuration::Medium => "30-60",
            VideoDuration::Long => "60-90",
        }
    }

    /// Human label embedded in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            VideoDuration::Short => "15-30 seconds",
            VideoDuration::Medium => "30-60 seconds",
            VideoDuration::Long => "60-90 seconds",
        }
    }
}

impl fmt::Display for VideoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid duration '{0}', expected one of: 15-30, 30-60, 60-90")]
pub struct InvalidDuration(pub String);

impl FromStr for VideoDuration {
    type Err = InvalidDuration;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "15-30" => Ok(VideoDuration::Short),
            "30-60" => Ok(VideoDuration::Medium),
            "60-90" => Ok(VideoDuration::Long),
            other => Err(InvalidDuration(other.to_string())),
        }
    }
}

/// A validated request to generate one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// What the video is about, as typed by the user.
    pub topic: String,

    /// UI vibe/archetype label (e.g. "funny", "Storytime", "hài hước").
    pub vibe: String,

    /// Target platform (tiktok, facebook, youtube).
    pub platform: String,

    /// Spoken length bucket.
    pub duration: VideoDuration,

    /// Whether to also produce an English visual prompt.
    pub include_visuals: bool,

    /// Factual context from web search, embedded verbatim.
    pub web_context: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        topic: impl Into<String>,
        vibe: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            vibe: vibe.into(),
            platform: platform.into(),
            duration: VideoDuration::default(),
            include_visuals: false,
            web_context: None,
        }
    }

    pub fn with_duration(mut self, duration: VideoDuration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_visuals(mut self, include_visuals: bool) -> Self {
        self.include_visuals = include_visuals;
        self
    }

    pub fn with_web_context(mut self, web_context: Option<String>) -> Self {
        self.web_context = web_context;
        self
    }

    pub fn cache_key(&self) -> String {
        cache_key(
            &self.topic,
            &self.vibe,
            &self.platform,
            self.duration,
            self.include_visuals,
        )
    }
}

/// Deterministic cache key: `{topic}-{vibe}-{platform}-{duration}-v{0|1}`.
///
/// Only the topic is normalised (trimmed, lower-cased). Web context is not
/// part of the key: it is looked up after the cache misses.
///
/// `-` and `%` in vibe and platform are percent-escaped. The duration and
/// visuals suffix come from fixed sets, so the key reads unambiguously from
/// the right and the topic may contain any character.
pub fn cache_key(
    topic: &str,
    vibe: &str,
    platform: &str,
    duration: VideoDuration,
    include_visuals: bool,
) -> String {
    format!(
        "{}-{}-{}-{}-v{}",
        topic.trim().to_lowercase(),
        escape_component(vibe),
        escape_component(platform),
        duration.as_str(),
        if include_visuals { 1 } else { 0 }
    )
}

fn escape_component(value: &str) -> String {
    value.replace('%', "%25").replace('-', "%2D")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyphens_cannot_shift_between_components() {
        let a = cache_key("a-b", "c", "tiktok", VideoDuration::Medium, false);
        let b = cache_key("a", "b-c", "tiktok", VideoDuration::Medium, false);
        assert_ne!(a, b);
        assert_eq!(b, "a-b%2Dc-tiktok-30-60-v0");

        let c = cache_key("a", "b", "c-tiktok", VideoDuration::Medium, false);
        let d = cache_key("a-b", "c", "tiktok", VideoDuration::Medium, false);
        assert_ne!(c, d);
    }

    #[test]
    fn cache_key_matches_documented_format() {
        let key = cache_key("cat video", "cat", "tiktok", VideoDuration::Medium, false);
        assert_eq!(key, "cat video-cat-tiktok-30-60-v0");
    }

    #[test]
    fn cache_key_is_stable() {
        let a = cache_key("Trứng gà", "funny", "tiktok", VideoDuration::Short, true);
        let b = cache_key("Trứng gà", "funny", "tiktok", VideoDuration::Short, true);
        assert_eq!(a, b);
    }

    #[test]
    fn cache_key_normalises_topic() {
        let padded = cache_key(" Cat ", "funny", "tiktok", VideoDuration::Medium, false);
        let plain = cache_key("cat", "funny", "tiktok", VideoDuration::Medium, false);
        assert_eq!(padded, plain);
    }

    #[test]
    fn cache_key_changes_with_each_component() {
        let base = cache_key("cat", "funny", "tiktok", VideoDuration::Medium, false);
        let variants = [
            cache_key("dog", "funny", "tiktok", VideoDuration::Medium, false),
            cache_key("cat", "drama", "tiktok", VideoDuration::Medium, false),
            cache_key("cat", "funny", "youtube", VideoDuration::Medium, false),
            cache_key("cat", "funny", "tiktok", VideoDuration::Long, false),
            cache_key("cat", "funny", "tiktok", VideoDuration::Medium, true),
        ];
        for variant in variants {
            assert_ne!(variant, base);
        }
    }

    #[test]
    fn duration_parses_and_rejects() {
        assert_eq!("15-30".parse(), Ok(VideoDuration::Short));
        assert_eq!(" 60-90 ".parse(), Ok(VideoDuration::Long));
        assert_eq!(
            "10-20".parse::<VideoDuration>(),
            Err(InvalidDuration("10-20".to_string()))
        );
    }

    #[test]
    fn duration_defaults_to_medium() {
        assert_eq!(VideoDuration::default(), VideoDuration::Medium);
        assert_eq!(GenerationRequest::new("t", "v", "p").duration.as_str(), "30-60");
    }
}
