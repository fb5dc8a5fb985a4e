//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use mockup_config::{Config, CorsConfig, ServerConfig};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Minimal defaults with a test API key and no upstream override
    pub fn new() -> Self {
        let mut config = Config {
            server: ServerConfig {
                listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                ..ServerConfig::default()
            },
            ..Config::default()
        };
        config.generation.api_key = Some(SecretString::from("test-key"));

        Self { config }
    }

    /// Point the generation gateway at a mock upstream
    pub fn with_upstream(mut self, base_url: &str) -> Self {
        self.config.generation.base_url = base_url.parse().expect("valid URL");
        self
    }

    /// Remove the upstream API key
    pub fn without_api_key(mut self) -> Self {
        self.config.generation.api_key = None;
        self
    }

    /// Lower the reference image cap
    pub fn with_max_reference_image_bytes(mut self, max: usize) -> Self {
        self.config.generation.max_reference_image_bytes = max;
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = config;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
