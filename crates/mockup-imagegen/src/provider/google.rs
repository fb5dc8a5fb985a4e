//! Google Generative Language API image provider

use async_trait::async_trait;
use mockup_config::GenerationConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use url::Url;

use super::{GeneratedImage, ImageGenProvider, UpstreamRequest};
use crate::{
    error::{EXTRACTION_FAILED, GenerationError, Result},
    extract::{block_reason, describe_parts, extract_image},
    placeholder::truncate_chars,
    protocol::{Content, GenerateContentRequest, GenerationParameters, InlineData, Part},
};

/// Longest upstream error text carried into a result
const MAX_ERROR_DETAIL_CHARS: usize = 200;

/// Most bytes of an upstream error body read into memory
const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

/// Google `generateContent` image provider
pub(crate) struct GoogleProvider {
    name: String,
    client: Client,
    api_key: SecretString,
    base_url: Url,
    model: String,
    parameters: GenerationParameters,
}

impl GoogleProvider {
    /// Create the provider from generation configuration
    ///
    /// The key is passed separately so callers decide where it comes from.
    pub fn new(api_key: SecretString, config: &GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("mockup-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GenerationError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: "google".to_string(),
            client,
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            parameters: GenerationParameters {
                temperature: config.temperature,
                top_k: config.top_k,
                top_p: config.top_p,
                max_output_tokens: config.max_output_tokens,
                response_modalities: config.response_modalities.clone(),
            },
        })
    }

    /// Build the `generateContent` endpoint URL for the configured model
    fn generate_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/models/{}:generateContent", self.model)
    }

    /// Build the single outbound request body
    ///
    /// The enhanced prompt always comes first; a reference image follows
    /// as an inline part.
    fn build_request(&self, request: &UpstreamRequest<'_>) -> GenerateContentRequest {
        let mut parts = vec![Part::Text(request.enhanced_prompt.to_string())];

        if let Some(image) = request.reference_image {
            parts.push(Part::InlineData(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            }));
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: self.parameters.clone(),
        }
    }
}

/// Read at most `MAX_ERROR_BODY_BYTES` of an error body
///
/// A failed read keeps whatever arrived before it.
async fn read_error_body(mut response: reqwest::Response) -> String {
    let mut body = Vec::new();

    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                if !append_capped(&mut body, &chunk, MAX_ERROR_BODY_BYTES) {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "failed to read image generation error body");
                break;
            }
        }
    }

    String::from_utf8_lossy(&body).into_owned()
}

/// Append as much of `chunk` as fits under `cap`; false once the buffer is full
fn append_capped(buffer: &mut Vec<u8>, chunk: &[u8], cap: usize) -> bool {
    let room = cap.saturating_sub(buffer.len());
    buffer.extend_from_slice(&chunk[..chunk.len().min(room)]);
    buffer.len() < cap
}

/// Pull a readable message out of an upstream error body
///
/// Google wraps errors as `{"error": {"message": ..}}`; anything else is
/// passed through as text.
fn upstream_error_message(body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            let error = value.get("error")?;
            error
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| error.as_str())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    if message.is_empty() {
        return "Unknown error".to_string();
    }

    truncate_chars(&message, MAX_ERROR_DETAIL_CHARS).to_string()
}

#[async_trait]
impl ImageGenProvider for GoogleProvider {
    async fn generate(&self, request: &UpstreamRequest<'_>) -> Result<GeneratedImage> {
        let url = self.generate_url();
        let wire_request = self.build_request(request);

        tracing::debug!(
            provider = %self.name,
            model = %self.model,
            has_reference_image = request.reference_image.is_some(),
            "sending image generation request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(provider = %self.name, error = %e, "image generation request failed");
                GenerationError::Connection(format!("failed to reach the image generation API: {e}"))
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = read_error_body(response).await;

            let message = upstream_error_message(&error_text);

            tracing::error!(
                provider = %self.name,
                status = %status,
                detail = %message,
                "image generation API error"
            );

            return Err(GenerationError::from_status(status.as_u16(), message));
        }

        let status = status.as_u16();

        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!(provider = %self.name, error = %e, "failed to read image generation response");
            GenerationError::Connection(format!("failed to read the image generation response: {e}"))
        })?;

        let body: Value = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(provider = %self.name, error = %e, "image generation response is not JSON");
            GenerationError::Extraction {
                status,
                message: EXTRACTION_FAILED.to_string(),
                response_data: None,
            }
        })?;

        tracing::debug!(provider = %self.name, parts = ?describe_parts(&body), "image generation response received");

        let Some(image_url) = extract_image(&body) else {
            let message = block_reason(&body).map_or_else(
                || EXTRACTION_FAILED.to_string(),
                |reason| format!("The prompt was blocked by the image model ({reason}). Please try a different prompt."),
            );

            tracing::warn!(provider = %self.name, "no image found in image generation response");

            return Err(GenerationError::Extraction {
                status,
                message,
                response_data: Some(body),
            });
        };

        tracing::debug!(provider = %self.name, "image generation request complete");

        Ok(GeneratedImage { image_url, status })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceImage;

    fn provider() -> GoogleProvider {
        GoogleProvider::new(SecretString::from("gk-test"), &GenerationConfig::default()).unwrap()
    }

    #[test]
    fn endpoint_url_names_model() {
        assert_eq!(
            provider().generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
    }

    #[test]
    fn text_only_request_body() {
        let request = UpstreamRequest {
            enhanced_prompt: "Create a mockup",
            reference_image: None,
        };

        let body = serde_json::to_value(provider().build_request(&request)).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"], serde_json::json!([{"text": "Create a mockup"}]));
        assert_eq!(body["generationConfig"]["topK"], 32);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(body["generationConfig"]["responseModalities"], serde_json::json!(["TEXT", "IMAGE"]));
    }

    #[test]
    fn reference_image_round_trips_into_inline_part() {
        let data_url = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";
        let image = ReferenceImage::parse(data_url, 1024).unwrap();
        let request = UpstreamRequest {
            enhanced_prompt: "Create a mockup",
            reference_image: Some(&image),
        };

        let body = serde_json::to_value(provider().build_request(&request)).unwrap();
        let inline = &body["contents"][0]["parts"][1]["inlineData"];

        let expected_data = data_url.split_once(";base64,").unwrap().1;
        let expected_mime = data_url.strip_prefix("data:").unwrap().split_once(';').unwrap().0;
        assert_eq!(inline["data"], expected_data);
        assert_eq!(inline["mimeType"], expected_mime);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Create a mockup");
    }

    #[test]
    fn google_error_envelope_message() {
        let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(upstream_error_message(body), "Resource has been exhausted");
    }

    #[test]
    fn string_error_field() {
        assert_eq!(upstream_error_message(r#"{"error": "quota"}"#), "quota");
    }

    #[test]
    fn error_body_buffer_stops_at_cap() {
        let mut buffer = Vec::new();

        assert!(append_capped(&mut buffer, &[b'a'; 6], 10));
        assert!(!append_capped(&mut buffer, &[b'b'; 6], 10));
        assert_eq!(buffer, b"aaaaaabbbb");

        assert!(!append_capped(&mut buffer, &[b'c'; 6], 10));
        assert_eq!(buffer.len(), 10);
    }

    #[test]
    fn raw_error_text_truncated() {
        let body = "x".repeat(1000);
        assert_eq!(upstream_error_message(&body).len(), MAX_ERROR_DETAIL_CHARS);
        assert_eq!(upstream_error_message("  "), "Unknown error");
    }
}
