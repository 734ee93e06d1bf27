//! Configuration — YAML schema, discovery, and environment overrides.

pub mod loader;
pub mod schema;

pub use loader::load_config;
pub use schema::{OnError, TraceGraphConfig};
