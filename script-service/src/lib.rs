//! Short-video script generation over streaming LLM providers.

pub mod config;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod schemas;
pub mod services;
pub mod startup;
