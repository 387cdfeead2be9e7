//! Domain models for the script service.

pub mod cached_result;
pub mod request;
pub mod script;

pub use cached_result::CachedResult;
pub use request::{cache_key, GenerationRequest, InvalidDuration, VideoDuration};
pub use script::{ScriptResult, ViralAnalysis};
