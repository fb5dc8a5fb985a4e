use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

/// Default Google Generative Language API base URL
pub const DEFAULT_GENERATION_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Largest accepted reference image, in decoded bytes (4 MiB)
pub const DEFAULT_MAX_REFERENCE_IMAGE_BYTES: usize = 4 * 1024 * 1024;

/// Extra room on top of the encoded reference image for the prompt and settings
const REQUEST_BODY_HEADROOM: usize = 64 * 1024;

/// Image generation configuration
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Upstream API key; requests fail with a configuration error while unset
    pub api_key: Option<SecretString>,
    /// Upstream base URL override
    pub base_url: Url,
    /// Upstream model identifier
    pub model: String,
    /// Route the generation endpoint is mounted on
    pub path: String,
    /// Largest accepted reference image after base64 decoding
    pub max_reference_image_bytes: usize,
    /// Sampling temperature
    pub temperature: f64,
    /// Top-k sampling
    pub top_k: u32,
    /// Nucleus sampling threshold
    pub top_p: f64,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Modalities requested from the model
    pub response_modalities: Vec<String>,
    /// Placeholder image shown on failures
    pub placeholder: PlaceholderConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: "gemini-2.5-flash-image".to_string(),
            path: "/generate-mockup".to_string(),
            max_reference_image_bytes: DEFAULT_MAX_REFERENCE_IMAGE_BYTES,
            temperature: 0.4,
            top_k: 32,
            top_p: 1.0,
            max_output_tokens: 2048,
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            placeholder: PlaceholderConfig::default(),
        }
    }
}

impl GenerationConfig {
    /// The configured API key, ignoring blank values left behind by
    /// `{{ env.VAR | default("") }}` expansion
    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
    }

    /// Request body limit for the generation endpoint
    ///
    /// Base64 inflates the reference image by a third.
    pub fn request_body_limit(&self) -> usize {
        self.max_reference_image_bytes
            .saturating_mul(4)
            .div_ceil(3)
            .saturating_add(REQUEST_BODY_HEADROOM)
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_GENERATION_BASE_URL).expect("valid default URL")
}

/// Placeholder image service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderConfig {
    /// Placeholder service base URL
    pub base_url: String,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Background colour as hex digits without `#`
    pub background: String,
    /// Text colour as hex digits without `#`
    pub foreground: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://placehold.co".to_string(),
            width: 800,
            height: 600,
            background: "FF5555".to_string(),
            foreground: "FFFFFF".to_string(),
        }
    }
}
