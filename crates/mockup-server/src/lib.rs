mod cors;

use std::net::SocketAddr;

use axum::{Router, routing::get};
use http::StatusCode;
use mockup_config::Config;
use tower_http::trace::TraceLayer;

/// Address used when the configuration does not name one
const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 3000);

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the generation gateway fails to initialize
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config.server.listen_address.unwrap_or(DEFAULT_LISTEN_ADDRESS);

        let gateway = mockup_imagegen::build_server(config)?;

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, get(health_handler));
        }

        app = app.merge(mockup_imagegen::endpoint_router(&config.generation).with_state(gateway));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // CORS (outermost, so preflights never reach the handlers)
        app = app.layer(cors::cors_layer(&config.server.cors));

        tracing::debug!(
            generation_path = %config.generation.path,
            health = config.server.health.enabled,
            "routes assembled"
        );

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use http::Request;
    use tower::ServiceExt;

    use super::*;

    fn router(raw: &str) -> Router {
        let config = Config::parse(raw).unwrap();
        Server::new(&config).unwrap().into_router()
    }

    #[test]
    fn default_listen_address() {
        let server = Server::new(&Config::default()).unwrap();
        assert_eq!(server.listen_address().to_string(), "0.0.0.0:3000");
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let response = router("")
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn health_can_be_disabled() {
        let response = router("[server.health]\nenabled = false\n")
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bare_options_is_empty_success() {
        let response = router("")
            .oneshot(
                Request::options("/generate-mockup")
                    .header("origin", "https://studio.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn missing_api_key_is_server_error() {
        let response = router("")
            .oneshot(
                Request::post("/generate-mockup")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"prompt": "a mug"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let result: mockup_imagegen::GenerationResult = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.error_kind, Some(mockup_imagegen::ErrorKind::Configuration));
        assert_eq!(result.original_prompt, "a mug");
    }

    #[tokio::test]
    async fn non_json_body_is_validation_result() {
        let response = router("")
            .oneshot(Request::post("/generate-mockup").body(Body::from("prompt=a mug")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let result: mockup_imagegen::GenerationResult = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.error_kind, Some(mockup_imagegen::ErrorKind::Validation));
        assert!(result.image_url.starts_with("https://placehold.co/"));
    }
}
