//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, send};

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with the service marker
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = common::build_test_app(None, None);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "scrollstop-backend");
    assert!(json["version"].is_string());
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app(None, None);
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_test_app(None, None);
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

// ---------------------------------------------------------------------------
// Test: CORS preflight OPTIONS request returns correct headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let app = common::build_test_app(None, None);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/captions")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "authorization,content-type")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        headers.get("access-control-allow-credentials").unwrap(),
        "true"
    );
}

// ---------------------------------------------------------------------------
// Test: CORS only allows the methods the client uses, for listed origins
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_allows_only_client_methods() {
    let app = common::build_test_app(None, None);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/captions")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "DELETE")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    let allowed = response
        .headers()
        .get("access-control-allow-methods")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(allowed.contains("GET"));
    assert!(allowed.contains("POST"));
    assert!(!allowed.contains("DELETE"));
}

#[tokio::test]
async fn cors_ignores_unlisted_origin() {
    let app = common::build_test_app(None, None);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/captions")
        .header("Origin", "https://elsewhere.example")
        .header("Access-Control-Request-Method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

#[test]
#[should_panic(expected = "Invalid CORS origin")]
fn invalid_cors_origin_fails_at_startup() {
    let mut config = common::test_config();
    config.cors_origins = vec!["not a\norigin".to_string()];
    scrollstop_api::router::build_cors_layer(&config);
}
