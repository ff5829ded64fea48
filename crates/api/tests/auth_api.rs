//! Integration tests for API-key authentication and the toolkit routes.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, get_with_key, post_json, TEST_API_KEY};
use serde_json::json;
use tower::ServiceExt;

async fn post_without_key(app: axum::Router, uri: &str, body: serde_json::Value) -> axum::response::Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Test: Media routes reject requests without an API key
// ---------------------------------------------------------------------------

#[tokio::test]
async fn media_route_without_key_returns_401() {
    let test = common::build_test_app(0);
    let response = post_without_key(
        test.app(),
        "/media-to-mp3",
        json!({"media_url": "http://127.0.0.1:9/a.mp4"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], 401);
    assert_eq!(json["error"], "UNAUTHORIZED");
    assert_eq!(json["message"], "API key is required");
}

// ---------------------------------------------------------------------------
// Test: A wrong API key is rejected on the toolkit test route
// ---------------------------------------------------------------------------

#[tokio::test]
async fn toolkit_test_with_wrong_key_returns_401() {
    let test = common::build_test_app(0);
    let response = get_with_key(test.app(), "/v1/toolkit/test", "not-the-key").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid API key");
}

// ---------------------------------------------------------------------------
// Test: /authenticate answers 200 Authorized for the right key
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authenticate_with_valid_key() {
    let test = common::build_test_app(0);
    let response = get_with_key(test.app(), "/authenticate", TEST_API_KEY).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["code"], 200);
    assert_eq!(json["response"], "Authorized");
    assert_eq!(json["message"], "success");
    assert_eq!(json["queue_time"], 0.0);
}

// ---------------------------------------------------------------------------
// Test: /authenticate answers a 401 envelope for a missing key
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authenticate_without_key_returns_envelope() {
    let test = common::build_test_app(0);
    let response = get(test.app(), "/v1/toolkit/authenticate").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;

    // A regular envelope, not the error body of the auth extractor.
    assert_eq!(json["code"], 401);
    assert_eq!(json["message"], "Unauthorized");
    assert!(json.get("response").is_none());
    assert!(json["job_id"].is_string());
    assert!(json["pid"].is_number());
}

// ---------------------------------------------------------------------------
// Test: /v1/toolkit/test runs inline and echoes the caller id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn toolkit_test_runs_inline_even_with_webhook() {
    let test = common::build_test_app(1);
    let response = post_json(
        test.app(),
        "/v1/toolkit/test",
        json!({"id": "check-1", "webhook_url": "http://127.0.0.1:9/hook"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["code"], 200);
    assert_eq!(json["id"], "check-1");
    assert_eq!(json["response"], "mediakit is working");
    assert_eq!(json["queue_time"], 0.0);
    assert_eq!(json["queue_length"], 0);
    assert_eq!(
        json["queue_id"],
        test.state.dispatcher.queue().id().to_string()
    );

    // Only webhook payloads name the endpoint.
    assert!(json.get("endpoint").is_none());
    assert!(test.state.dispatcher.queue().is_empty());
}

// ---------------------------------------------------------------------------
// Test: /v1/toolkit/test accepts a GET without a body
// ---------------------------------------------------------------------------

#[tokio::test]
async fn toolkit_test_get_without_body() {
    let test = common::build_test_app(0);
    let response = get_with_key(test.app(), "/v1/toolkit/test", TEST_API_KEY).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], serde_json::Value::Null);
    assert_eq!(json["response"], "mediakit is working");
}
