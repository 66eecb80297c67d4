use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;

use crate::error::{Error, Result};

/// Credentialed CORS for the configured frontend origin; permissive (and
/// therefore cookie-less for browsers) when no origin is configured.
pub fn cors_layer(frontend_url: Option<&str>) -> Result<CorsLayer> {
    let Some(origin) = frontend_url else {
        return Ok(CorsLayer::permissive());
    };
    let origin = HeaderValue::from_str(origin.trim_end_matches('/'))
        .map_err(|e| Error::Config(format!("Invalid FRONTEND_URL: {}", e)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]))
}
