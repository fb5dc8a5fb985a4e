use std::sync::Arc;
use std::time::Instant;

use mockup_config::GenerationConfig;
use mockup_telemetry::GenerationMetrics;

use crate::{
    error::{ErrorKind, GenerationError, Result},
    placeholder::Placeholder,
    prompt::compose,
    provider::{ImageGenProvider, UpstreamRequest, google::GoogleProvider},
    reference::ReferenceImage,
    types::{GenerationRequest, GenerationResult},
};

/// Highest accepted detail level
const MAX_DETAIL_LEVEL: u8 = 100;

/// Stateless generation gateway
///
/// Every call validates, composes the enhanced prompt, makes at most one
/// upstream call and folds any failure into a placeholder result. Nothing
/// is shared between calls except the provider's connection pool.
pub struct Gateway {
    provider: Option<Arc<dyn ImageGenProvider>>,
    placeholder: Placeholder,
    max_reference_image_bytes: usize,
    metrics: GenerationMetrics,
}

impl Gateway {
    /// Generate an image; never fails, always returns a renderable URL
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let start = Instant::now();

        let result = match self.validate(request) {
            Err(error) => self.fail(request, None, error),
            Ok(reference_image) => self.dispatch(request, reference_image.as_ref()).await,
        };

        self.metrics
            .record(result.error_kind.map_or("success", ErrorKind::as_str), start);

        result
    }

    /// Result for a request body that could not be read at all
    pub fn reject(&self, reason: &str) -> GenerationResult {
        let start = Instant::now();
        let result = self.fail(
            &GenerationRequest::default(),
            None,
            GenerationError::Validation(reason.to_string()),
        );
        self.metrics.record("validation", start);
        result
    }

    async fn dispatch(&self, request: &GenerationRequest, reference_image: Option<&ReferenceImage>) -> GenerationResult {
        let Some(provider) = &self.provider else {
            return self.fail(
                request,
                None,
                GenerationError::Configuration("API key is not configured".to_string()),
            );
        };

        let enhanced_prompt = compose(&request.prompt, &request.settings);

        tracing::debug!(
            provider = provider.name(),
            prompt_chars = request.prompt.chars().count(),
            detail_level = request.settings.detail_level,
            style = %request.settings.style_preference,
            color_scheme = %request.settings.color_scheme,
            has_reference_image = reference_image.is_some(),
            "composed enhanced prompt"
        );

        let upstream = UpstreamRequest {
            enhanced_prompt: &enhanced_prompt,
            reference_image,
        };

        match provider.generate(&upstream).await {
            Ok(image) => {
                tracing::info!(provider = provider.name(), status = image.status, "image generated");
                GenerationResult::success(image.image_url, request.prompt.clone(), enhanced_prompt, image.status)
            }
            Err(error) => self.fail(request, Some(enhanced_prompt), error),
        }
    }

    /// Check everything that can be checked without the upstream
    fn validate(&self, request: &GenerationRequest) -> Result<Option<ReferenceImage>> {
        if request.settings.detail_level > MAX_DETAIL_LEVEL {
            return Err(GenerationError::Validation(format!(
                "detail level must be between 0 and {MAX_DETAIL_LEVEL}"
            )));
        }

        let reference_image = request
            .reference_image()
            .map(|data_url| ReferenceImage::parse(data_url, self.max_reference_image_bytes))
            .transpose()?;

        if request.prompt.trim().is_empty() && reference_image.is_none() {
            return Err(GenerationError::Validation(
                "a prompt or a reference image is required".to_string(),
            ));
        }

        Ok(reference_image)
    }

    fn fail(&self, request: &GenerationRequest, enhanced_prompt: Option<String>, error: GenerationError) -> GenerationResult {
        let kind = error.kind();

        if kind.status_code().is_server_error() {
            tracing::error!(kind = %kind, error = %error, "generation failed");
        } else {
            tracing::warn!(kind = %kind, error = %error, "generation failed");
        }

        error.into_result(request.prompt.clone(), enhanced_prompt, &self.placeholder)
    }
}

/// Builder for constructing the gateway from configuration
pub struct GatewayBuilder<'a> {
    config: &'a GenerationConfig,
    provider: Option<Arc<dyn ImageGenProvider>>,
}

impl<'a> GatewayBuilder<'a> {
    pub fn new(config: &'a GenerationConfig) -> Self {
        Self { config, provider: None }
    }

    /// Use `provider` instead of the one derived from configuration
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn ImageGenProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn build(self) -> Result<Gateway> {
        let provider = match (self.provider, self.config.api_key()) {
            (Some(provider), _) => Some(provider),
            (None, Some(api_key)) => {
                let provider: Arc<dyn ImageGenProvider> = Arc::new(GoogleProvider::new(api_key.clone(), self.config)?);
                Some(provider)
            }
            (None, None) => None,
        };

        match &provider {
            Some(provider) => tracing::debug!(
                provider = provider.name(),
                model = %self.config.model,
                "image generation gateway initialized"
            ),
            None => tracing::warn!(
                "generation.api_key is not set; every generation request will fail with a configuration error"
            ),
        }

        Ok(Gateway {
            provider,
            placeholder: Placeholder::from_config(&self.config.placeholder),
            max_reference_image_bytes: self.config.max_reference_image_bytes,
            metrics: GenerationMetrics::new(),
        })
    }
}
