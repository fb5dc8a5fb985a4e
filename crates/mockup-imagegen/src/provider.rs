pub(crate) mod google;

use async_trait::async_trait;

use crate::{error::Result, reference::ReferenceImage};

/// What the gateway hands to a provider after validation and composition
#[derive(Debug, Clone, Copy)]
pub struct UpstreamRequest<'a> {
    pub enhanced_prompt: &'a str,
    pub reference_image: Option<&'a ReferenceImage>,
}

/// Image produced by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Data URL or external URL of the image
    pub image_url: String,
    /// HTTP status of the upstream response
    pub status: u16,
}

/// Trait for image generation provider implementations
///
/// Implementations make exactly one upstream call per `generate` and
/// report every failure as a classified `GenerationError`.
#[async_trait]
pub trait ImageGenProvider: Send + Sync {
    /// Generate an image for the given request
    async fn generate(&self, request: &UpstreamRequest<'_>) -> Result<GeneratedImage>;

    /// Get the provider name
    fn name(&self) -> &str;
}
