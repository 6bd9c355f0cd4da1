//! API integration tests for the proxy endpoint.
//!
//! Tests verify:
//! - Device-class and explicit resizing end to end
//! - Accept-driven format negotiation and JPEG fallback
//! - Error statuses and bodies (400, 502, 500)
//! - Response headers and the health endpoint

use std::sync::atomic::Ordering;

use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use resize_proxy::error::FetchError;
use resize_proxy::proxy::ProxyRequest;
use resize_proxy::resolve::OutputFormat;

use super::test_utils::{
    avif_dimensions, create_test_jpeg, create_test_png, decoded_dimensions, is_avif,
    is_valid_jpeg, is_webp, proxy_uri, refusing_router, test_router, test_service, MockOrigin,
};

const PHOTO: &str = "http://origin.test/photo.jpg";
const TALL: &str = "http://origin.test/tall.png";

fn get(uri: &str, accept: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(accept) = accept {
        builder = builder.header("accept", accept);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

// =============================================================================
// Resizing and Negotiation
// =============================================================================

#[tokio::test]
async fn test_mobile_webp() {
    let origin = MockOrigin::new().with_image(PHOTO, create_test_jpeg(3000, 2000));
    let router = test_router(origin);

    let request = get(&proxy_uri(PHOTO, "mobile"), Some("image/webp,*/*"));
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/webp");

    let body = body_bytes(response).await;
    assert!(is_webp(&body));
    assert_eq!(decoded_dimensions(&body), (375, 250));
}

#[tokio::test]
async fn test_desktop_portrait_avif() {
    let origin = MockOrigin::new().with_image(TALL, create_test_png(800, 1600));
    let router = test_router(origin);

    let request = get(
        &proxy_uri(TALL, "desktop&portrait"),
        Some("image/avif,image/webp,*/*"),
    );
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/avif");
    assert!(response.headers().get("x-image-fallback").is_none());

    let body = body_bytes(response).await;
    assert!(is_avif(&body), "Response should be an AVIF container");
    assert_eq!(avif_dimensions(&body), Some((540, 1080)));
}

#[tokio::test]
async fn test_desktop_portrait_avif_through_service() {
    let origin = MockOrigin::new().with_image(TALL, create_test_png(800, 1600));
    let service = test_service(origin);

    let query = proxy_uri(TALL, "desktop&portrait");
    let request = ProxyRequest::from_query(Some(&query[2..]), Some("image/avif"));
    let result = service.handle(&request).await.unwrap();

    assert_eq!(result.format, OutputFormat::Avif);
    assert_eq!((result.width, result.height), (540, 1080));
    assert!(result.fallback_from.is_none());
}

#[tokio::test]
async fn test_explicit_width_defaults_to_jpeg() {
    let origin = MockOrigin::new().with_image(PHOTO, create_test_jpeg(3000, 2000));
    let router = test_router(origin);

    let response = router
        .oneshot(get(&proxy_uri(PHOTO, "width=200"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");

    let body = body_bytes(response).await;
    assert!(is_valid_jpeg(&body));
    assert_eq!(decoded_dimensions(&body), (200, 133));
}

#[tokio::test]
async fn test_explicit_dimensions_override_device_hints() {
    let origin = MockOrigin::new().with_image(PHOTO, create_test_jpeg(600, 400));
    let router = test_router(origin);

    let response = router
        .oneshot(get(&proxy_uri(PHOTO, "height=100&mobile&desktop"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    assert_eq!(decoded_dimensions(&body), (150, 100));
}

#[tokio::test]
async fn test_invalid_width_falls_back_to_hints() {
    let origin = MockOrigin::new().with_image(PHOTO, create_test_jpeg(600, 400));
    let router = test_router(origin);

    let response = router
        .oneshot(get(&proxy_uri(PHOTO, "width=abc&mobile"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    assert_eq!(decoded_dimensions(&body), (375, 250));
}

#[tokio::test]
async fn test_never_upscales() {
    let origin = MockOrigin::new().with_image(PHOTO, create_test_jpeg(120, 80));
    let router = test_router(origin);

    let response = router
        .oneshot(get(&proxy_uri(PHOTO, "width=1000&height=1000"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    assert_eq!(decoded_dimensions(&body), (120, 80));
}

#[tokio::test]
async fn test_accept_with_non_ascii_bytes_still_negotiates() {
    let origin = MockOrigin::new().with_image(PHOTO, create_test_jpeg(64, 64));
    let router = test_router(origin);

    let request = Request::builder()
        .uri(proxy_uri(PHOTO, ""))
        .header(
            "accept",
            HeaderValue::from_bytes(b"image/webp,text/caf\xe9").unwrap(),
        )
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/webp");
    assert!(is_webp(&body_bytes(response).await));
}

#[tokio::test]
async fn test_accept_is_case_sensitive() {
    let origin = MockOrigin::new().with_image(PHOTO, create_test_jpeg(64, 64));
    let router = test_router(origin);

    let response = router
        .oneshot(get(&proxy_uri(PHOTO, ""), Some("IMAGE/WEBP")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
}

// =============================================================================
// Encode Fallback
// =============================================================================

#[tokio::test]
async fn test_avif_encode_failure_falls_back_to_jpeg() {
    let origin = MockOrigin::new().with_image(PHOTO, create_test_jpeg(300, 200));
    let router = refusing_router(origin, vec![OutputFormat::Avif]);

    let response = router
        .oneshot(get(&proxy_uri(PHOTO, "mobile"), Some("image/avif")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
    assert_eq!(response.headers()["x-image-fallback"], "avif");

    let body = body_bytes(response).await;
    assert!(is_valid_jpeg(&body));
}

#[tokio::test]
async fn test_jpeg_encode_failure_is_server_error() {
    let origin = MockOrigin::new().with_image(PHOTO, create_test_jpeg(32, 32));
    let router = refusing_router(origin, vec![OutputFormat::WebP, OutputFormat::Jpeg]);

    let response = router
        .oneshot(get(&proxy_uri(PHOTO, ""), Some("image/webp")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(body.starts_with("Error: "));
    assert!(body.contains("JPEG"));
}

// =============================================================================
// Error Handling
// =============================================================================

#[tokio::test]
async fn test_missing_url_is_bad_request() {
    let origin = MockOrigin::new();
    let counter = origin.request_counter();
    let router = test_router(origin);

    let response = router.oneshot(get("/?mobile", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_bytes(response).await;
    assert_eq!(&body[..], b"Missing 'url' parameter");
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_url_is_bad_request() {
    let router = test_router(MockOrigin::new());

    let response = router.oneshot(get("/?url=", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_url_is_bad_request() {
    let origin = MockOrigin::new();
    let counter = origin.request_counter();
    let router = test_router(origin);

    let response = router
        .oneshot(get(&proxy_uri("ftp://origin.test/a.jpg", ""), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_bytes(response).await;
    assert_eq!(&body[..], b"Invalid 'url' parameter");
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upstream_404_is_bad_gateway() {
    let router = test_router(MockOrigin::new());

    let response = router
        .oneshot(get(&proxy_uri("http://origin.test/nope.jpg", ""), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_bytes(response).await;
    assert_eq!(&body[..], b"Failed to fetch image");
}

#[tokio::test]
async fn test_upstream_connection_error_is_bad_gateway() {
    let origin = MockOrigin::new().with_error(
        PHOTO,
        FetchError::Connection("connection refused".to_string()),
    );
    let router = test_router(origin);

    let response = router
        .oneshot(get(&proxy_uri(PHOTO, ""), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(!body.contains("refused"), "Upstream details must not leak");
}

#[tokio::test]
async fn test_corrupt_source_is_server_error() {
    let origin = MockOrigin::new().with_image(PHOTO, b"<html>not an image</html>".to_vec());
    let router = test_router(origin);

    let response = router
        .oneshot(get(&proxy_uri(PHOTO, "mobile"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(body.starts_with("Error: "));
}

// =============================================================================
// Headers and Routing
// =============================================================================

#[tokio::test]
async fn test_success_headers() {
    let origin = MockOrigin::new().with_image(PHOTO, create_test_jpeg(64, 64));
    let router = test_router(origin);

    let response = router
        .oneshot(get(&proxy_uri(PHOTO, ""), Some("image/webp")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["cache-control"],
        "public, max-age=86400, immutable"
    );
    assert_eq!(response.headers()["vary"], "Accept");
}

#[tokio::test]
async fn test_any_path_and_method() {
    let origin = MockOrigin::new().with_image(PHOTO, create_test_jpeg(64, 64));
    let log = origin.request_log();
    let router = test_router(origin);

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/some/deep/path{}", &proxy_uri(PHOTO, "mobile")[1..]))
        .body(Body::from("ignored"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
    assert_eq!(log.read().await.as_slice(), &[PHOTO.to_string()]);
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = test_router(MockOrigin::new());

    let response = router.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_bytes(response).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_concurrent_requests() {
    let origin = MockOrigin::new().with_image(PHOTO, create_test_jpeg(400, 300));
    let counter = origin.request_counter();
    let router = test_router(origin);

    let mut handles = Vec::new();
    for _ in 0..6 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            let response = router
                .oneshot(get(&proxy_uri(PHOTO, "mobile"), None))
                .await
                .unwrap();
            response.status()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }
    assert_eq!(counter.load(Ordering::SeqCst), 6);
}
