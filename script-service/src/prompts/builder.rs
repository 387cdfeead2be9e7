//! Assembles the final generation prompt.

use super::archetype::{format_rule, select_mode, DurationProfile, ModeSelection};
use super::registry::{PromptError, PromptRegistry};
use super::scenario::sample_hooks;
use super::styles::style_prompt;
use super::system::system_prompt;
use super::tasks::task_prompt;
use crate::models::GenerationRequest;
use rand::Rng;
use std::fmt::Write as _;
use std::sync::Arc;

pub const DEFAULT_HOOK_EXAMPLES: usize = 3;

const SAFETY_RULES: &str = "SAFETY RULES
- Vocabulary: natural everyday Vietnamese. Light slang only where it fits ('xịn', 'chấn động', 'đỉnh').
- Banned: forced slang spam ('khum', 'ét o ét' in every line), empty hooks ('Bạn có biết?', 'Hôm nay mình sẽ...'), textbook transitions ('Đầu tiên...', 'Thứ hai...', 'Cuối cùng...').
- Savage and Drama modes attack ideas and behaviours only. NEVER target specific individuals or protected groups.";

const NO_CONTEXT: &str = "WEB CONTEXT: none available.
- Keep the content general and avoid specific claims (names, dates, numbers) you cannot verify.";

/// Builds prompts from a frozen registry.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    registry: Arc<PromptRegistry>,
    hook_examples: usize,
}

impl PromptBuilder {
    pub fn new(registry: Arc<PromptRegistry>) -> Self {
        Self {
            registry,
            hook_examples: DEFAULT_HOOK_EXAMPLES,
        }
    }

    /// Number of example hooks embedded in each prompt.
    pub fn with_hook_examples(mut self, count: usize) -> Self {
        self.hook_examples = count;
        self
    }

    pub fn registry(&self) -> &PromptRegistry {
        &self.registry
    }

    pub fn build(&self, request: &GenerationRequest) -> Result<String, PromptError> {
        self.build_with_rng(request, &mut rand::thread_rng())
    }

    /// Same as [`build`](Self::build) with a caller-supplied RNG for hook sampling.
    pub fn build_with_rng<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        rng: &mut R,
    ) -> Result<String, PromptError> {
        let mode = select_mode(&request.vibe, &request.topic);
        let ModeSelection {
            archetype,
            scenario,
            ..
        } = mode;
        let profile = archetype.profile();
        let duration = DurationProfile::for_duration(request.duration);

        let persona = system_prompt(&self.registry, archetype.persona())?;
        let style = style_prompt(&self.registry, &request.vibe);
        let task = task_prompt(&self.registry, request.include_visuals)?;
        let hooks = sample_hooks(scenario, &request.topic, self.hook_examples, rng);

        tracing::debug!(
            archetype = archetype.name(),
            scenario = %scenario,
            explicit = mode.explicit,
            duration = %request.duration,
            "Selected prompt mode"
        );

        let mut prompt = String::with_capacity(4096);

        prompt.push_str(persona);
        prompt.push_str("\n\n");

        let _ = write!(
            prompt,
            "CURRENT MODE: {} ({})\n\
             - Structure: {}\n\
             - Formatting: {}\n\
             - Tone: {}\n\n",
            archetype.name(),
            profile.role,
            profile.structure,
            format_rule(archetype, request.duration),
            profile.tone,
        );

        if !style.is_empty() {
            prompt.push_str(style);
            prompt.push_str("\n\n");
        }

        let _ = write!(
            prompt,
            "LENGTH: {}\nSTRUCTURE: {}\nEXAMPLE:\n{}\n\n",
            duration.length, duration.structure, duration.example,
        );

        prompt.push_str(SAFETY_RULES);
        prompt.push_str("\n\n");

        match request.web_context.as_deref().map(str::trim) {
            Some(context) if !context.is_empty() => {
                let _ = write!(
                    prompt,
                    "WEB CONTEXT (facts to rely on):\n{}\n\
                     - Use facts from this context for anything specific.\n\
                     - If it describes a person or a trend, match their actual style.\n\
                     - Do not invent information that is not in the context.\n\n",
                    context,
                );
            }
            _ => {
                prompt.push_str(NO_CONTEXT);
                prompt.push_str("\n\n");
            }
        }

        let _ = write!(
            prompt,
            "INPUT:\n\
             - Topic: \"{}\"\n\
             - Vibe: {}\n\
             - Platform: {}\n\
             - Duration: {}\n\
             - Detected scenario: {}\n\n",
            request.topic,
            request.vibe,
            request.platform,
            request.duration.label(),
            scenario,
        );

        if !hooks.is_empty() {
            let _ = writeln!(prompt, "EXAMPLE HOOKS ({}), adapt them, do not copy:", scenario);
            for (i, hook) in hooks.iter().enumerate() {
                let _ = writeln!(prompt, "- Hook {}: {}", i + 1, hook);
            }
            prompt.push('\n');
        }

        prompt.push_str(&task);
        if request.include_visuals {
            prompt.push_str("\n\nWrite visualPrompt in English.");
        }

        Ok(prompt)
    }
}

/// Rough token count: one token per four characters, rounded up.
pub fn estimate_tokens(prompt: &str) -> usize {
    prompt.chars().count().div_ceil(4)
}
