//! HTTP handlers for the script service.

pub mod generate;
pub mod health;
pub mod metrics;
