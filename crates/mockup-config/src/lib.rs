#![allow(clippy::must_use_candidate)]

pub mod cors;
mod env;
pub mod generation;
pub mod health;
mod loader;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use cors::*;
pub use generation::*;
pub use health::*;
pub use server::*;
pub use telemetry::TelemetryConfig;

/// Top-level gateway configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Image generation configuration
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
