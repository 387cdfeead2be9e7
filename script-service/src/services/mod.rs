pub mod cache;
pub mod generator;
pub mod metrics;
pub mod providers;
pub mod web_search;

pub use cache::{InMemoryScriptCache, MongoScriptCache, ScriptCache};
pub use generator::{GenerationError, GeneratorOptions, ScriptGenerator, ScriptStream};
pub use web_search::{TavilyConfig, TavilySearch, WebSearch, WebSearchError};
