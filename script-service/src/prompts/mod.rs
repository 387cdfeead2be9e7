//! Prompt fragments, archetype selection and prompt assembly.

pub mod archetype;
pub mod builder;
pub mod registry;
pub mod scenario;
pub mod styles;
pub mod system;
pub mod tasks;

pub use archetype::{select_mode, Archetype, DurationProfile, ModeSelection};
pub use builder::{estimate_tokens, PromptBuilder, DEFAULT_HOOK_EXAMPLES};
pub use registry::{PromptCategory, PromptError, PromptFragment, PromptMetadata, PromptRegistry};
pub use scenario::{detect_scenario_from_topic, fill_placeholders, random_hooks, sample_hooks, Scenario};
pub use styles::{style_prompt, ContentVibe};
pub use system::{system_prompt, Persona};
pub use tasks::task_prompt;
