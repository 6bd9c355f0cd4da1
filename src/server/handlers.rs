//! HTTP request handlers for the resize proxy.
//!
//! # Endpoints
//!
//! - `* /{any path}?url=...` - Fetch, resize and re-encode a remote image
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::error::{InputError, ProxyError};
use crate::io::OriginFetcher;
use crate::proxy::{ProxyRequest, ProxyService};
use crate::transform::{Codec, EncodedResult, RasterCodec};

/// Header naming the originally negotiated format when the response fell back to JPEG.
pub const FALLBACK_HEADER: HeaderName = HeaderName::from_static("x-image-fallback");

/// Default Cache-Control max-age: one day.
pub const DEFAULT_CACHE_MAX_AGE: u32 = 86_400;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the proxy service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<F: OriginFetcher, C: Codec = RasterCodec> {
    /// The proxy service for processing image requests
    pub service: Arc<ProxyService<F, C>>,

    /// Cache-Control max-age in seconds for successful responses
    pub cache_max_age: u32,
}

impl<F: OriginFetcher + 'static, C: Codec> AppState<F, C> {
    /// Create a new application state with the default one-day max-age.
    pub fn new(service: ProxyService<F, C>) -> Self {
        Self::with_cache_max_age(service, DEFAULT_CACHE_MAX_AGE)
    }

    /// Create a new application state with custom cache max-age.
    pub fn with_cache_max_age(service: ProxyService<F, C>, cache_max_age: u32) -> Self {
        Self {
            service: Arc::new(service),
            cache_max_age,
        }
    }
}

impl<F: OriginFetcher, C: Codec> Clone for AppState<F, C> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ProxyError to a plain-text HTTP response.
///
/// | Error              | Status | Body                        |
/// |--------------------|--------|-----------------------------|
/// | missing `url`      | 400    | `Missing 'url' parameter`   |
/// | invalid `url`      | 400    | `Invalid 'url' parameter`   |
/// | fetch failure      | 502    | `Failed to fetch image`     |
/// | decode/resize/encode | 500  | `Error: <message>`          |
///
/// Upstream details are logged, never echoed to the client.
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let stage = self.stage().map(|s| s.name()).unwrap_or("input");

        let (status, error_type, body) = match &self {
            ProxyError::Input(InputError::MissingUrl) => (
                StatusCode::BAD_REQUEST,
                "missing_url",
                "Missing 'url' parameter".to_string(),
            ),
            ProxyError::Input(InputError::InvalidUrl { .. }) => (
                StatusCode::BAD_REQUEST,
                "invalid_url",
                "Invalid 'url' parameter".to_string(),
            ),
            ProxyError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "upstream_error",
                "Failed to fetch image".to_string(),
            ),
            ProxyError::Codec(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "transform_error",
                format!("Error: {}", err),
            ),
        };

        if status.is_server_error() {
            error!(
                error_type = error_type,
                stage = stage,
                status = status.as_u16(),
                "Server error: {}",
                self
            );
        } else {
            warn!(
                error_type = error_type,
                stage = stage,
                status = status.as_u16(),
                "Client error: {}",
                self
            );
        }

        (status, body).into_response()
    }
}

/// Build the success response for an encoded image.
pub fn image_response(result: EncodedResult, cache_max_age: u32) -> Response {
    let headers = [
        (header::CONTENT_TYPE, result.mime_type().to_string()),
        (
            header::CACHE_CONTROL,
            format!("public, max-age={}, immutable", cache_max_age),
        ),
        (header::VARY, "Accept".to_string()),
    ];

    let fallback_from = result.fallback_from;
    let mut response = (StatusCode::OK, headers, result.data).into_response();

    if let Some(requested) = fallback_from {
        response
            .headers_mut()
            .insert(FALLBACK_HEADER, HeaderValue::from_static(requested.token()));
    }

    response
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle image proxy requests.
///
/// # Endpoint
///
/// Any method, any path. Only the query string and `Accept` header are read.
///
/// # Query Parameters
///
/// - `url`: Absolute http(s) URL of the source image (required)
/// - `width`, `height`: Explicit bounding box in pixels (positive integers)
/// - `mobile`: Longer edge at most 375px
/// - `desktop`: Longer edge at most 1920px, or 1080px together with `portrait`
/// - `portrait`: Only meaningful with `desktop`
///
/// # Response
///
/// - `200 OK`: Encoded image as AVIF, WebP or JPEG per `Accept`
/// - `400 Bad Request`: Missing or invalid `url`
/// - `502 Bad Gateway`: Source could not be fetched
/// - `500 Internal Server Error`: Decode, resize or encode failure
///
/// # Headers
///
/// - `Content-Type`: Format actually produced
/// - `Cache-Control: public, max-age={cache_max_age}, immutable`
/// - `Vary: Accept`
/// - `X-Image-Fallback: avif|webp` when encoding fell back to JPEG
pub async fn proxy_handler<F, C>(
    State(state): State<AppState<F, C>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, ProxyError>
where
    F: OriginFetcher + 'static,
    C: Codec,
{
    // obs-text bytes must not hide an otherwise matching media type
    let accept = headers
        .get(header::ACCEPT)
        .map(|value| String::from_utf8_lossy(value.as_bytes()));

    let request = ProxyRequest::from_query(query.as_deref(), accept.as_deref());
    let result = state.service.handle(&request).await?;

    Ok(image_response(result, state.cache_max_age))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
