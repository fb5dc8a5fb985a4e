//! Google Generative Language API wire format types
//!
//! Only the request side is typed. Responses are read as loose JSON by
//! [`crate::extract`] because their shape has not stayed stable.

use serde::Serialize;

/// `generateContent` request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationParameters,
}

/// Content object containing role and parts
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

/// Individual part within a content object
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    /// Text instruction
    Text(String),
    /// Inline binary data (images)
    InlineData(InlineData),
}

/// Base64 payload annotated with its MIME type
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Sampling and output parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParameters {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
    pub response_modalities: Vec<String>,
}
