use std::path::Path;

use crate::{Config, PlaceholderConfig};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if environment variable expansion, TOML parsing
    /// or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_routes()?;
        self.validate_generation()?;
        validate_placeholder(&self.generation.placeholder)?;
        Ok(())
    }

    fn validate_routes(&self) -> anyhow::Result<()> {
        if !self.generation.path.starts_with('/') {
            anyhow::bail!("generation.path must start with '/': `{}`", self.generation.path);
        }

        if self.server.health.enabled {
            if !self.server.health.path.starts_with('/') {
                anyhow::bail!("server.health.path must start with '/': `{}`", self.server.health.path);
            }
            if self.server.health.path == self.generation.path {
                anyhow::bail!("server.health.path and generation.path must differ");
            }
        }

        Ok(())
    }

    fn validate_generation(&self) -> anyhow::Result<()> {
        let generation = &self.generation;

        if generation.model.trim().is_empty() {
            anyhow::bail!("generation.model must not be empty");
        }

        if generation.max_reference_image_bytes == 0 {
            anyhow::bail!("generation.max_reference_image_bytes must be greater than 0");
        }

        if !(0.0..=2.0).contains(&generation.temperature) {
            anyhow::bail!("generation.temperature must be between 0.0 and 2.0");
        }

        if !(0.0..=1.0).contains(&generation.top_p) {
            anyhow::bail!("generation.top_p must be between 0.0 and 1.0");
        }

        if generation.response_modalities.is_empty() {
            anyhow::bail!("generation.response_modalities must not be empty");
        }

        Ok(())
    }
}

fn validate_placeholder(placeholder: &PlaceholderConfig) -> anyhow::Result<()> {
    if placeholder.width == 0 || placeholder.height == 0 {
        anyhow::bail!("generation.placeholder dimensions must be greater than 0");
    }

    for (name, colour) in [("background", &placeholder.background), ("foreground", &placeholder.foreground)] {
        let is_hex = colour.chars().all(|c| c.is_ascii_hexdigit());
        if !is_hex || !matches!(colour.len(), 3 | 6) {
            anyhow::bail!("generation.placeholder.{name} must be 3 or 6 hex digits: `{colour}`");
        }
    }

    Ok(())
}
