//! Persona fragments: who the model is.

use super::registry::{PromptCategory, PromptError, PromptFragment, PromptRegistry};
use chrono::NaiveDate;

/// Available personas. Each maps to `system:{name}_v1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Persona {
    #[default]
    GenZ,
    Expert,
    Storyteller,
}

impl Persona {
    pub fn key(&self) -> &'static str {
        match self {
            Persona::GenZ => "system:genz_v1",
            Persona::Expert => "system:expert_v1",
            Persona::Storyteller => "system:storyteller_v1",
        }
    }
}

const GENZ_V1: &str = r#"ROLE: Viral Content Strategist

You write scripts for Vietnamese short-form video. Clarity and insight matter more than cheap slang.

WRITING PRINCIPLES
1. No forced slang. Humor comes from irony or a surprising truth, not random Gen Z words.
2. Hooks are readable in under 5 seconds. Prefer a negative warning ("Dừng ngay...", "Đừng bao giờ...") or a contrarian statement ("Sai bét! Thực ra...").
3. Be specific, not generic: "99% người ăn trái cây SAI giờ" beats "Bạn có biết về trái cây?".
4. Always give concrete examples and real numbers.
5. Tone: smart and sharp, confident like a real expert, conversational like a one-on-one chat. Never preachy."#;

const EXPERT_V1: &str = r#"ROLE: Content marketing expert with 10 years of experience.
Voice: professional but easy to follow, backed by data and insight.
Create content with depth and credibility. No cheap clickbait."#;

const STORYTELLER_V1: &str = r#"ROLE: Storyteller specialised in viral social media stories.
Voice: gripping, builds suspense, leads the viewer's emotions.
Every video is a small story with a beginning, a middle and an end."#;

fn created_at() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 29).unwrap_or_default()
}

pub(crate) fn register_defaults(registry: &mut PromptRegistry) {
    registry.register(
        Persona::GenZ.key(),
        PromptFragment::new(
            GENZ_V1,
            "GENZ_V1",
            PromptCategory::System,
            "Vietnamese content strategist, clean and sharp",
            created_at(),
        ),
    );
    registry.register(
        Persona::Expert.key(),
        PromptFragment::new(
            EXPERT_V1,
            "EXPERT_V1",
            PromptCategory::System,
            "Professional content expert persona",
            created_at(),
        ),
    );
    registry.register(
        Persona::Storyteller.key(),
        PromptFragment::new(
            STORYTELLER_V1,
            "STORYTELLER_V1",
            PromptCategory::System,
            "Storytelling persona for drama content",
            created_at(),
        ),
    );
    registry.set_active_version(PromptCategory::System, "GENZ_V1");
}

/// Persona fragment content.
pub fn system_prompt(registry: &PromptRegistry, persona: Persona) -> Result<&str, PromptError> {
    registry.get_content(persona.key())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_persona_is_registered() {
        let registry = PromptRegistry::with_defaults();
        for persona in [Persona::GenZ, Persona::Expert, Persona::Storyteller] {
            assert!(system_prompt(&registry, persona).is_ok(), "{:?}", persona);
        }
    }

    #[test]
    fn empty_registry_reports_not_found() {
        let registry = PromptRegistry::new();
        assert_eq!(
            system_prompt(&registry, Persona::Expert),
            Err(PromptError::NotFound("system:expert_v1".to_string()))
        );
    }
}
