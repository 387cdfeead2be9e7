use serde::{Deserialize, Serialize};
use validator::Validate;

/// Strategy breakdown returned alongside every script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ViralAnalysis {
    /// Why the hook works, in a few words.
    #[validate(length(min = 1))]
    pub hook_psychology: String,

    /// Self-assessed viral potential, 1 (low) to 10 (high).
    #[validate(range(min = 1, max = 10))]
    pub viral_score: i64,

    /// Who the script is aimed at.
    #[validate(length(min = 1))]
    pub audience_insight: String,

    /// Named framework the script follows.
    #[validate(length(min = 1))]
    pub viral_framework: String,
}

/// A finished short-video script as produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScriptResult {
    /// Opening line meant to stop the scroll.
    #[validate(length(min = 1))]
    pub hook: String,

    /// Main body of the script.
    #[validate(length(min = 1))]
    pub script: String,

    /// Closing call to action.
    #[validate(length(min = 1))]
    pub cta: String,

    #[validate(nested)]
    pub analysis: ViralAnalysis,

    /// Scenario the model believes it wrote for (STORY, KNOWLEDGE, OPINION).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_detected: Option<String>,

    /// English description for an image/video generator. Only present when
    /// visuals were requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_prompt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "hook": "Khoan đã!",
            "script": "Nội dung",
            "cta": "Follow nhé",
            "analysis": {
                "hookPsychology": "Khoảng trống tò mò",
                "viralScore": 8,
                "audienceInsight": "Gen Z mê ăn vặt",
                "viralFramework": "Curiosity Gap"
            },
            "scenarioDetected": "KNOWLEDGE"
        })
    }

    #[test]
    fn deserializes_camel_case_fields() {
        let result: ScriptResult = serde_json::from_value(sample()).unwrap();
        assert_eq!(result.analysis.viral_score, 8);
        assert_eq!(result.scenario_detected.as_deref(), Some("KNOWLEDGE"));
        assert!(result.visual_prompt.is_none());
        assert!(result.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_viral_score() {
        let mut value = sample();
        value["analysis"]["viralScore"] = json!(11);
        let result: ScriptResult = serde_json::from_value(value).unwrap();
        assert!(result.validate().is_err());
    }

    #[test]
    fn rejects_empty_hook() {
        let mut value = sample();
        value["hook"] = json!("");
        let result: ScriptResult = serde_json::from_value(value).unwrap();
        assert!(result.validate().is_err());
    }

    #[test]
    fn omits_visual_prompt_when_absent() {
        let result: ScriptResult = serde_json::from_value(sample()).unwrap();
        let out = serde_json::to_value(&result).unwrap();
        assert!(out.get("visualPrompt").is_none());
    }
}
