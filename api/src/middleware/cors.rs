use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

/// Build a CORS layer from the `DESTRESS_CORS_ORIGINS` env var.
///
/// - Origins: comma-separated list (default: `http://localhost:8501`,
///   where the chat frontend runs in development)
/// - Methods: GET, POST, OPTIONS
/// - Headers: Content-Type
/// - Credentials: allowed (the session cookie must travel)
pub fn build_cors_layer() -> CorsLayer {
    let origins_str = std::env::var("DESTRESS_CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:8501".to_string());

    let origins: Vec<HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<HeaderValue>().ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([HeaderName::from_static("content-type")])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
