//! Task fragments: what to produce and in which shape.

use super::registry::{PromptCategory, PromptError, PromptFragment, PromptRegistry};
use chrono::NaiveDate;

pub const GENERATE_SCRIPT_KEY: &str = "task:generate_script_v1";
pub const VISUAL_PROMPT_KEY: &str = "task:visual_prompt_v1";

const GENERATE_SCRIPT_V1: &str = r#"TASK: Write one viral short-video script.

RULES
1. Never generic. Wrong: "Ăn uống lành mạnh", "Cải thiện kỹ năng". Right: "Ăn 2 quả trứng trước 8h sáng", "Chạy bộ 5km lúc 6h sáng". Always give concrete examples, real numbers and clear actions.
2. Respect the LENGTH and STRUCTURE sections above. The script must be long enough for the requested duration.
3. Write the script the way it is spoken, with "\n" between lines. No markdown.
4. Write hook, script, cta and analysis in Vietnamese.

OUTPUT FIELDS
- hook: shocking opening line, under 5 seconds
- script: the main content
- cta: call to action at the end of the video
- analysis.hookPsychology: why the hook works (max 15 words)
- analysis.viralScore: integer from 1 to 10, honest self-assessment
- analysis.audienceInsight: the specific target audience
- analysis.viralFramework: framework used (Polarization, Negative Hook, Transformation, Curiosity Gap, Social Proof)
- scenarioDetected: STORY, KNOWLEDGE or OPINION"#;

const VISUAL_PROMPT_V1: &str = r#"VISUAL PROMPT
- visualPrompt: an English scene description for AI video tools (Kling, Runway, Luma)
- Include subject, environment, camera movement, lighting, mood and color palette
- Example: "Young Vietnamese entrepreneur in a modern coffee shop, golden hour lighting, slow dolly in, warm color grading, cinematic 4k, shallow depth of field""#;

pub(crate) fn register_defaults(registry: &mut PromptRegistry) {
    let created_at = NaiveDate::from_ymd_opt(2024, 12, 29).unwrap_or_default();
    registry.register(
        GENERATE_SCRIPT_KEY,
        PromptFragment::new(
            GENERATE_SCRIPT_V1,
            "GENERATE_SCRIPT_V1",
            PromptCategory::Task,
            "Generate viral short video script",
            created_at,
        ),
    );
    registry.register(
        VISUAL_PROMPT_KEY,
        PromptFragment::new(
            VISUAL_PROMPT_V1,
            "VISUAL_PROMPT_V1",
            PromptCategory::Task,
            "Visual prompt add-on for AI video tools",
            created_at,
        ),
    );
}

/// Output-format instructions, with the visual add-on when requested.
pub fn task_prompt(registry: &PromptRegistry, include_visuals: bool) -> Result<String, PromptError> {
    if include_visuals {
        registry.compose(&[GENERATE_SCRIPT_KEY, VISUAL_PROMPT_KEY])
    } else {
        registry.compose(&[GENERATE_SCRIPT_KEY])
    }
}
