#![allow(clippy::must_use_candidate)]

pub mod context;
mod env;
pub mod llm;
mod loader;
pub mod server;
pub mod telemetry;
pub mod tools;

use serde::Deserialize;

pub use context::*;
pub use env::{EnvExpansionError, expand_env};
pub use llm::*;
pub use server::*;
pub use telemetry::TelemetryConfig;
pub use tools::*;

/// Top-level Parley configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream model backend configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Retrieved-context preamble injected as a system message
    #[serde(default)]
    pub context: ContextConfig,
    /// Built-in tool configuration
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
