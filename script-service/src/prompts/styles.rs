//! Style fragments: how the content is delivered, keyed by UI vibe.

use super::registry::{PromptCategory, PromptFragment, PromptRegistry};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentVibe {
    Funny,
    Educational,
    Dramatic,
    Inspirational,
    Controversial,
}

impl ContentVibe {
    pub const ALL: [ContentVibe; 5] = [
        ContentVibe::Funny,
        ContentVibe::Educational,
        ContentVibe::Dramatic,
        ContentVibe::Inspirational,
        ContentVibe::Controversial,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ContentVibe::Funny => "style:funny_v1",
            ContentVibe::Educational => "style:educational_v1",
            ContentVibe::Dramatic => "style:dramatic_v1",
            ContentVibe::Inspirational => "style:inspirational_v1",
            ContentVibe::Controversial => "style:controversial_v1",
        }
    }

    /// Map a UI vibe label (English or Vietnamese, any case).
    pub fn from_ui_vibe(vibe: &str) -> Option<Self> {
        let vibe = vibe.trim().to_lowercase();
        let mapped = match vibe.as_str() {
            "funny" | "humorous" | "hài hước" => ContentVibe::Funny,
            "educational" | "expert" | "giáo dục" | "chuyên gia" => ContentVibe::Educational,
            "dramatic" | "drama" | "storytelling" | "storytime" | "kể chuyện" => {
                ContentVibe::Dramatic
            }
            "inspirational" | "truyền cảm hứng" => ContentVibe::Inspirational,
            "controversial" | "savage" | "gây tranh cãi" => ContentVibe::Controversial,
            _ => return None,
        };
        Some(mapped)
    }
}

const FALLBACK: ContentVibe = ContentVibe::Educational;

const STYLES: [(ContentVibe, &str, &str, &str); 5] = [
    (
        ContentVibe::Funny,
        "FUNNY_V1",
        "Smart humor style",
        "STYLE: Smart humor\n\
         - Humor through irony and real-life observations\n\
         - An unexpected twist at the end\n\
         - Light self-deprecation is fine\n\
         - Never force the laugh, never overuse emoji",
    ),
    (
        ContentVibe::Educational,
        "EDUCATIONAL_V1",
        "Insightful educational style",
        "STYLE: Education with insight\n\
         - Hook with a surprising fact or a common misconception\n\
         - Explain WHY, not only WHAT\n\
         - Use concrete numbers and real examples\n\
         - End with an actionable takeaway",
    ),
    (
        ContentVibe::Dramatic,
        "DRAMATIC_V1",
        "Narrative storytelling style",
        "STYLE: Storytelling with depth\n\
         - Open with a curiosity hook\n\
         - Build tension through the narrative\n\
         - Include a twist or revelation\n\
         - Close with a lesson or a cliffhanger",
    ),
    (
        ContentVibe::Inspirational,
        "INSPIRATIONAL_V1",
        "Inspirational/motivational style",
        "STYLE: Inspirational\n\
         - Hook on a transformation or success\n\
         - A short emotional journey\n\
         - CTA that pushes the viewer to act",
    ),
    (
        ContentVibe::Controversial,
        "CONTROVERSIAL_V1",
        "Controversial/debate-inducing style",
        "STYLE: Controversial (positive)\n\
         - Polarizing hook that splits opinions\n\
         - Take an unexpected angle\n\
         - CTA that invites debate in the comments",
    ),
];

pub(crate) fn register_defaults(registry: &mut PromptRegistry) {
    let created_at = NaiveDate::from_ymd_opt(2024, 12, 29).unwrap_or_default();
    for (vibe, version, description, content) in STYLES {
        registry.register(
            vibe.key(),
            PromptFragment::new(
                content,
                version,
                PromptCategory::Style,
                description,
                created_at,
            ),
        );
    }
}

/// Style fragment for a UI vibe.
///
/// Never fails: an unrecognised vibe or a missing fragment falls back to the
/// educational style, and an empty string is returned only when that is
/// missing as well.
pub fn style_prompt<'a>(registry: &'a PromptRegistry, vibe: &str) -> &'a str {
    let style = ContentVibe::from_ui_vibe(vibe).unwrap_or(FALLBACK);
    match registry.get_content(style.key()) {
        Ok(content) => content,
        Err(_) => {
            tracing::warn!(vibe = %vibe, "Style not found, falling back to educational");
            registry.get_content(FALLBACK.key()).unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_english_and_vietnamese_labels() {
        assert_eq!(ContentVibe::from_ui_vibe("Humorous"), Some(ContentVibe::Funny));
        assert_eq!(ContentVibe::from_ui_vibe("hài hước"), Some(ContentVibe::Funny));
        assert_eq!(ContentVibe::from_ui_vibe("kể chuyện"), Some(ContentVibe::Dramatic));
        assert_eq!(ContentVibe::from_ui_vibe("nonsense"), None);
    }

    #[test]
    fn unknown_vibe_falls_back_to_educational() {
        let registry = PromptRegistry::with_defaults();
        let educational = registry.get_content("style:educational_v1").unwrap();
        assert_eq!(style_prompt(&registry, "nonsense"), educational);
    }

    #[test]
    fn missing_fragment_falls_back_to_educational() {
        let mut registry = PromptRegistry::new();
        register_defaults(&mut registry);
        let mut partial = PromptRegistry::new();
        partial.register(
            "style:educational_v1",
            registry.get("style:educational_v1").unwrap().clone(),
        );
        assert!(style_prompt(&partial, "funny").starts_with("STYLE: Education"));
    }

    #[test]
    fn empty_registry_yields_empty_style() {
        assert_eq!(style_prompt(&PromptRegistry::new(), "funny"), "");
    }

    #[test]
    fn every_vibe_is_registered() {
        let registry = PromptRegistry::with_defaults();
        for vibe in ContentVibe::ALL {
            assert!(registry.get(vibe.key()).is_some(), "{:?}", vibe);
        }
    }
}
