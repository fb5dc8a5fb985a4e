use std::fmt;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    placeholder::{Placeholder, truncate_chars},
    types::GenerationResult,
};

pub type Result<T> = std::result::Result<T, GenerationError>;

/// Message shown when the upstream answered without a usable image
pub const EXTRACTION_FAILED: &str = "Failed to generate image. Please try a different prompt or settings.";

/// Longest placeholder text for internal failures
const INTERNAL_PLACEHOLDER_CHARS: usize = 50;

/// Everything that can stop a generation from producing an image
///
/// None of these escape the gateway: each one is folded into a
/// [`GenerationResult`] carrying a placeholder image.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The upstream credential is missing
    #[error("{0}")]
    Configuration(String),

    /// The request cannot be sent as is
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Upstream rejected the request (4xx other than 429)
    #[error("Upstream API error {status}: {message}")]
    BadRequest { status: u16, message: String },

    /// Upstream rate limit or quota exhausted (429)
    #[error("Upstream API error {status}: {message}")]
    RateLimited { status: u16, message: String },

    /// Upstream failed (5xx)
    #[error("Upstream API error {status}: {message}")]
    UpstreamFailure { status: u16, message: String },

    /// Any other non-success upstream status
    #[error("Upstream API error {status}: {message}")]
    UpstreamOther { status: u16, message: String },

    /// The upstream could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Upstream succeeded but carried no decodable image
    #[error("{message}")]
    Extraction {
        status: u16,
        message: String,
        /// Parsed upstream body, when it was JSON
        response_data: Option<Value>,
    },

    /// Failure inside the gateway itself
    ///
    /// Reserved: no request path produces it today. HTTP client
    /// construction failures surface at startup instead.
    #[error("Error: {0}")]
    Internal(String),
}

impl GenerationError {
    /// Classify a non-success upstream status
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            429 => Self::RateLimited { status, message },
            400..=499 => Self::BadRequest { status, message },
            500..=599 => Self::UpstreamFailure { status, message },
            _ => Self::UpstreamOther { status, message },
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Validation(_) => ErrorKind::Validation,
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::UpstreamFailure { .. } => ErrorKind::UpstreamFailure,
            Self::UpstreamOther { .. } => ErrorKind::UpstreamOther,
            Self::Connection(_) => ErrorKind::Connection,
            Self::Extraction { .. } => ErrorKind::Extraction,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Status of the upstream response behind this error, if any
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { status, .. }
            | Self::RateLimited { status, .. }
            | Self::UpstreamFailure { status, .. }
            | Self::UpstreamOther { status, .. }
            | Self::Extraction { status, .. } => Some(*status),
            Self::Configuration(_) | Self::Validation(_) | Self::Connection(_) | Self::Internal(_) => None,
        }
    }

    /// Short reason rendered onto the placeholder image
    fn placeholder_text(&self) -> String {
        match self {
            Self::Configuration(_) => "API key not found".to_string(),
            Self::Validation(message) => message.clone(),
            Self::BadRequest { status, .. }
            | Self::RateLimited { status, .. }
            | Self::UpstreamFailure { status, .. }
            | Self::UpstreamOther { status, .. } => format!("API Error: {status}"),
            Self::Connection(_) => "Connection error".to_string(),
            Self::Extraction { message, .. } => message.clone(),
            Self::Internal(message) => truncate_chars(message, INTERNAL_PLACEHOLDER_CHARS).to_string(),
        }
    }

    /// Fold the error into the uniform result shape
    pub fn into_result(
        self,
        original_prompt: String,
        enhanced_prompt: Option<String>,
        placeholder: &Placeholder,
    ) -> GenerationResult {
        let image_url = placeholder.url(&self.placeholder_text());
        let error = Some(self.to_string());
        let error_kind = Some(self.kind());
        let response_status = self.upstream_status();

        let (api_error_details, response_data) = match self {
            Self::BadRequest { message, .. }
            | Self::RateLimited { message, .. }
            | Self::UpstreamFailure { message, .. }
            | Self::UpstreamOther { message, .. }
            | Self::Connection(message) => (Some(message), None),
            Self::Extraction { response_data, .. } => (None, response_data),
            Self::Configuration(_) | Self::Validation(_) | Self::Internal(_) => (None, None),
        };

        GenerationResult {
            image_url,
            original_prompt,
            enhanced_prompt,
            error,
            error_kind,
            response_status,
            api_error_details,
            response_data,
        }
    }
}

/// Machine-readable failure classification attached to results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Validation,
    BadRequest,
    RateLimited,
    UpstreamFailure,
    UpstreamOther,
    Connection,
    Extraction,
    Internal,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Validation => "validation",
            Self::BadRequest => "bad_request",
            Self::RateLimited => "rate_limited",
            Self::UpstreamFailure => "upstream_failure",
            Self::UpstreamOther => "upstream_other",
            Self::Connection => "connection",
            Self::Extraction => "extraction",
            Self::Internal => "internal",
        }
    }

    /// HTTP status the gateway answers with for this kind of failure
    ///
    /// Only failures of the gateway itself surface as 5xx; everything
    /// else keeps 200 so the client renders the placeholder.
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Configuration | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
