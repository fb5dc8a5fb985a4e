use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Rendering style requested by the creator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreference {
    #[default]
    Realistic,
    Stylized,
    Abstract,
}

impl StylePreference {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Realistic => "realistic",
            Self::Stylized => "stylized",
            Self::Abstract => "abstract",
        }
    }
}

impl fmt::Display for StylePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colour palette requested by the creator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Vibrant,
    Muted,
    Monochrome,
}

impl ColorScheme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vibrant => "vibrant",
            Self::Muted => "muted",
            Self::Monochrome => "monochrome",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creator-facing knobs merged into the prompt
///
/// Fields missing from a request take the creator form defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationSettings {
    /// Detail level, 0 to 100
    pub detail_level: u8,
    pub style_preference: StylePreference,
    pub color_scheme: ColorScheme,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            detail_level: 50,
            style_preference: StylePreference::default(),
            color_scheme: ColorScheme::default(),
        }
    }
}

/// Generation request as sent by the web client
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Free-text description of the desired image
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub settings: GenerationSettings,
    /// Optional reference image as a `data:<mime>;base64,<payload>` URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<String>,
}

impl GenerationRequest {
    /// Reference image data URL, treating an empty string as absent
    pub fn reference_image(&self) -> Option<&str> {
        self.reference_image.as_deref().filter(|image| !image.is_empty())
    }
}

/// Outcome of a generation request
///
/// `image_url` is always renderable: the generated image on success,
/// a placeholder describing the failure otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub image_url: String,
    pub original_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_prompt: Option<String>,
    /// Human-readable failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine-readable failure classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// HTTP status of the upstream response, when one was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<u16>,
    /// Upstream error text for rejected or unreachable calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_error_details: Option<String>,
    /// Upstream body that answered without an image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_data: Option<serde_json::Value>,
}

impl GenerationResult {
    /// Successful result carrying the generated image
    pub fn success(image_url: String, original_prompt: String, enhanced_prompt: String, response_status: u16) -> Self {
        Self {
            image_url,
            original_prompt,
            enhanced_prompt: Some(enhanced_prompt),
            error: None,
            error_kind: None,
            response_status: Some(response_status),
            api_error_details: None,
            response_data: None,
        }
    }

    pub const fn is_success(&self) -> bool {
        self.error_kind.is_none()
    }
}
