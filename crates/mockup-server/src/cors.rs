use http::Method;
use http::header::HeaderName;
use mockup_config::{AnyOrArray, CorsConfig};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build the CORS layer wrapped around every route
///
/// Wildcards cannot be combined with credentials, so with credentials
/// enabled a wildcard origin mirrors the request origin and wildcard
/// methods or headers mirror the preflight request.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new();

    layer = match (&config.origins, config.credentials) {
        (AnyOrArray::Any, false) => layer.allow_origin(AllowOrigin::any()),
        (AnyOrArray::Any, true) => layer.allow_origin(AllowOrigin::mirror_request()),
        (AnyOrArray::List(origins), _) => layer.allow_origin(parse_all::<http::HeaderValue>(origins)),
    };

    layer = match (&config.methods, config.credentials) {
        (AnyOrArray::Any, false) => layer.allow_methods(AllowMethods::any()),
        (AnyOrArray::Any, true) => layer.allow_methods(AllowMethods::mirror_request()),
        (AnyOrArray::List(methods), _) => layer.allow_methods(parse_all::<Method>(methods)),
    };

    layer = match (&config.headers, config.credentials) {
        (AnyOrArray::Any, false) => layer.allow_headers(AllowHeaders::any()),
        (AnyOrArray::Any, true) => layer.allow_headers(AllowHeaders::mirror_request()),
        (AnyOrArray::List(headers), _) => layer.allow_headers(parse_all::<HeaderName>(headers)),
    };

    if !config.expose_headers.is_empty() {
        layer = layer.expose_headers(parse_all::<HeaderName>(&config.expose_headers));
    }

    if config.credentials {
        layer = layer.allow_credentials(true);
    }

    if let Some(duration) = config.max_age_duration() {
        layer = layer.max_age(duration);
    }

    layer
}

/// Parse every value, logging and skipping the ones that do not parse
fn parse_all<T: std::str::FromStr>(values: &[String]) -> Vec<T> {
    values
        .iter()
        .filter_map(|value| {
            let parsed = value.parse().ok();
            if parsed.is_none() {
                tracing::warn!(value = %value, "ignoring invalid CORS value");
            }
            parsed
        })
        .collect()
}
