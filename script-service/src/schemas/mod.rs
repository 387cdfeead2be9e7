//! Structured-output contracts for script generation.
//!
//! Two variants exist: the base script and the script with a visual prompt.
//! [`get_script_schema`] is the only way to obtain one, which keeps the
//! choice total over the visuals flag.

use crate::models::ScriptResult;
use crate::services::providers::OutputSchema;
use serde_json::{json, Value};
use thiserror::Error;
use validator::Validate;

const BASE_FIELDS: &[&str] = &["hook", "script", "cta", "analysis", "scenarioDetected"];
const FULL_FIELDS: &[&str] = &[
    "hook",
    "script",
    "cta",
    "analysis",
    "scenarioDetected",
    "visualPrompt",
];

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Output does not match the script schema: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("Output failed validation: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Output is missing visualPrompt")]
    MissingVisualPrompt,
}

/// Handle to one of the two script schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptSchema {
    include_visuals: bool,
}

/// Schema for a request: the full variant iff visuals were asked for.
pub fn get_script_schema(include_visuals: bool) -> ScriptSchema {
    ScriptSchema { include_visuals }
}

impl ScriptSchema {
    pub fn name(&self) -> &'static str {
        if self.include_visuals {
            "script_with_visuals"
        } else {
            "script"
        }
    }

    pub fn includes_visuals(&self) -> bool {
        self.include_visuals
    }

    pub fn required_fields(&self) -> &'static [&'static str] {
        if self.include_visuals {
            FULL_FIELDS
        } else {
            BASE_FIELDS
        }
    }

    /// JSON Schema document for the variant.
    pub fn json_schema(&self) -> Value {
        let mut properties = json!({
            "hook": {
                "type": "string",
                "description": "Shocking opening line, readable in under 5 seconds"
            },
            "script": {
                "type": "string",
                "description": "Main content as spoken sentences, lines separated by \\n"
            },
            "cta": {
                "type": "string",
                "description": "Call to action at the end of the video"
            },
            "analysis": {
                "type": "object",
                "properties": {
                    "hookPsychology": {
                        "type": "string",
                        "description": "Why the hook works, max 15 words"
                    },
                    "viralScore": {
                        "type": "integer",
                        "description": "Viral potential from 1 to 10"
                    },
                    "audienceInsight": {
                        "type": "string",
                        "description": "Specific target audience"
                    },
                    "viralFramework": {
                        "type": "string",
                        "description": "Framework used"
                    }
                },
                "required": ["hookPsychology", "viralScore", "audienceInsight", "viralFramework"],
                "additionalProperties": false
            },
            "scenarioDetected": {
                "type": "string",
                "enum": ["STORY", "KNOWLEDGE", "OPINION"]
            }
        });

        if self.include_visuals {
            properties["visualPrompt"] = json!({
                "type": "string",
                "description": "English prompt for Kling/Runway/Luma AI video"
            });
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_fields(),
            "additionalProperties": false
        })
    }

    /// Provider-facing form of the schema.
    pub fn output_schema(&self) -> OutputSchema {
        OutputSchema::new(self.name(), self.json_schema())
    }

    /// Decode and validate a complete model output.
    ///
    /// A stray `visualPrompt` under the base schema is dropped; a missing one
    /// under the full schema is an error.
    pub fn decode(&self, value: Value) -> Result<ScriptResult, SchemaError> {
        let mut result: ScriptResult = serde_json::from_value(value)?;
        result.validate()?;

        if self.include_visuals {
            match result.visual_prompt.as_deref().map(str::trim) {
                Some(prompt) if !prompt.is_empty() => {}
                _ => return Err(SchemaError::MissingVisualPrompt),
            }
        } else {
            result.visual_prompt = None;
        }

        Ok(result)
    }
}
