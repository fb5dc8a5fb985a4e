#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod error;
mod extract;
mod gateway;
mod placeholder;
mod prompt;
mod protocol;
mod provider;
mod reference;
mod types;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use mockup_config::GenerationConfig;

pub use error::{ErrorKind, GenerationError, Result};
pub use gateway::{Gateway, GatewayBuilder};
pub use placeholder::Placeholder;
pub use prompt::{DetailBand, compose};
pub use provider::{GeneratedImage, ImageGenProvider, UpstreamRequest};
pub use reference::ReferenceImage;
pub use types::{ColorScheme, GenerationRequest, GenerationResult, GenerationSettings, StylePreference};

/// Build the generation gateway from configuration
///
/// # Errors
///
/// Returns an error if the upstream client fails to initialize
pub fn build_server(config: &mockup_config::Config) -> anyhow::Result<Arc<Gateway>> {
    let gateway = Arc::new(
        GatewayBuilder::new(&config.generation)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize image generation gateway: {e}"))?,
    );
    Ok(gateway)
}

/// Create the endpoint router for mockup generation
pub fn endpoint_router(config: &GenerationConfig) -> Router<Arc<Gateway>> {
    Router::new()
        .route(&config.path, post(generate).options(preflight))
        .layer(DefaultBodyLimit::max(config.request_body_limit()))
}

/// Handle mockup generation requests
///
/// Every outcome is a JSON result; malformed bodies become validation
/// failures rather than plain-text rejections.
async fn generate(
    State(gateway): State<Arc<Gateway>>,
    request: std::result::Result<Json<GenerationRequest>, JsonRejection>,
) -> (StatusCode, Json<GenerationResult>) {
    let result = match request {
        Ok(Json(request)) => {
            tracing::debug!("Mockup generation handler called");
            gateway.generate(&request).await
        }
        Err(rejection) => {
            tracing::debug!(status = %rejection.status(), "Rejected mockup generation body");
            gateway.reject(&rejection.body_text())
        }
    };

    let status = result.error_kind.map_or(StatusCode::OK, ErrorKind::status_code);

    (status, Json(result))
}

/// Bare `OPTIONS` requests get an empty success; the CORS layer adds headers
async fn preflight() -> StatusCode {
    StatusCode::OK
}
