use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{GenerationError, Result};

/// Reference image taken from a `data:<mime>;base64,<payload>` URL
///
/// Keeps the MIME type and payload exactly as they appeared in the URL so
/// the outbound inline part matches what the client sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub mime_type: String,
    pub data: String,
}

impl ReferenceImage {
    /// Parse and check a reference image data URL
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Validation` if the URL is not a base64
    /// image data URL or decodes to more than `max_bytes`
    pub fn parse(data_url: &str, max_bytes: usize) -> Result<Self> {
        let invalid = |reason: &str| GenerationError::Validation(format!("reference image {reason}"));

        let (header, data) = data_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .ok_or_else(|| invalid("must be a data URL"))?;

        let (mime_type, encoding) = header.split_once(';').ok_or_else(|| invalid("must be base64 encoded"))?;

        if !encoding.split(';').any(|param| param.eq_ignore_ascii_case("base64")) {
            return Err(invalid("must be base64 encoded"));
        }

        if !mime_type.starts_with("image/") {
            return Err(invalid("must have an image MIME type"));
        }

        // Four base64 characters carry at most three bytes
        if data.len() / 4 * 3 > max_bytes.saturating_add(3) {
            return Err(too_large(max_bytes));
        }

        let decoded_len = STANDARD
            .decode(data)
            .map_err(|e| invalid(&format!("is not valid base64: {e}")))?
            .len();

        if decoded_len == 0 {
            return Err(invalid("is empty"));
        }

        if decoded_len > max_bytes {
            return Err(too_large(max_bytes));
        }

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }
}

fn too_large(max_bytes: usize) -> GenerationError {
    GenerationError::Validation(format!("reference image exceeds the {max_bytes} byte limit"))
}
