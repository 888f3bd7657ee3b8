//! Integration tests for the HTTP API, driven through `oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use minic_api::{create_app, default_state, DEFAULT_MAX_SESSIONS};
use minic_stages::default_analyzers;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    create_app(default_state(Arc::new(default_analyzers()), DEFAULT_MAX_SESSIONS).unwrap())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, text) = send(app, method, uri, body).await;
    let value = if text.is_empty() { Value::Null } else { serde_json::from_str(&text).unwrap() };
    (status, value)
}

async fn new_session(app: &Router) -> String {
    let (status, body) = send_json(app, Method::POST, "/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Session lifecycle
// =============================================================================

#[tokio::test]
async fn test_create_and_get_session() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) = send_json(&app, Method::GET, &format!("/v1/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "idle");
    assert_eq!(body["runnable"], Value::Null);
    assert_eq!(body["entries"], json!([]));
}

#[tokio::test]
async fn test_delete_session() {
    let app = app();
    let id = new_session(&app).await;
    let uri = format!("/v1/sessions/{}", id);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send_json(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "session_not_found");
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_load_enables_lexical() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) = send_json(
        &app,
        Method::PUT,
        &format!("/v1/sessions/{}/source", id),
        Some(json!({ "text": "x = 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "x = 1");
    assert_eq!(body["runnable"], "lexical");

    let (_, body) = send_json(
        &app,
        Method::PATCH,
        &format!("/v1/sessions/{}/source", id),
        Some(json!({ "text": "   " })),
    )
    .await;
    assert_eq!(body["runnable"], Value::Null);
}

#[tokio::test]
async fn test_session_limit() {
    let app = create_app(default_state(Arc::new(default_analyzers()), 2).unwrap());
    let first = new_session(&app).await;
    new_session(&app).await;

    let (status, body) = send_json(&app, Method::POST, "/v1/sessions", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "session_limit_reached");

    send(&app, Method::DELETE, &format!("/v1/sessions/{}", first), None).await;
    new_session(&app).await;
}

// =============================================================================
// Phases
// =============================================================================

#[tokio::test]
async fn test_run_phases_in_order() {
    let app = app();
    let id = new_session(&app).await;
    send(&app, Method::PUT, &format!("/v1/sessions/{}/source", id), Some(json!({ "text": "let x = 1\nprint x" }))).await;

    for (phase, stage, next) in [
        ("lexical", "lexical_done", json!("syntax")),
        ("syntax", "syntax_done", json!("semantic")),
        ("semantic", "semantic_done", Value::Null),
    ] {
        let (status, body) =
            send_json(&app, Method::POST, &format!("/v1/sessions/{}/phases/{}", id, phase), None).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["entry"]["phase"], phase);
        assert_eq!(body["entry"]["outcome"]["status"], "success");
        assert_eq!(body["stage"], stage);
        assert_eq!(body["runnable"], next);
    }
}

#[tokio::test]
async fn test_out_of_order_phase_conflicts() {
    let app = app();
    let id = new_session(&app).await;
    send(&app, Method::PUT, &format!("/v1/sessions/{}/source", id), Some(json!({ "text": "x = 1" }))).await;

    let (status, body) = send_json(&app, Method::POST, &format!("/v1/sessions/{}/phases/semantic", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_stage_transition");

    let (_, snapshot) = send_json(&app, Method::GET, &format!("/v1/sessions/{}", id), None).await;
    assert_eq!(snapshot["entries"], json!([]));
    assert_eq!(snapshot["stage"], "idle");
}

#[tokio::test]
async fn test_failed_phase_is_logged_not_an_error() {
    let app = app();
    let id = new_session(&app).await;
    send(&app, Method::PUT, &format!("/v1/sessions/{}/source", id), Some(json!({ "text": "x = 1 @" }))).await;

    let (status, body) = send_json(&app, Method::POST, &format!("/v1/sessions/{}/phases/lexical", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entry"]["outcome"]["status"], "failure");
    assert_eq!(body["stage"], "idle");
    assert_eq!(body["runnable"], "lexical");
}

#[tokio::test]
async fn test_unknown_phase_is_not_found() {
    let app = app();
    let id = new_session(&app).await;
    let (status, body) = send_json(&app, Method::POST, &format!("/v1/sessions/{}/phases/codegen", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "phase_not_found");
}

#[tokio::test]
async fn test_reset_clears_log() {
    let app = app();
    let id = new_session(&app).await;
    send(&app, Method::PUT, &format!("/v1/sessions/{}/source", id), Some(json!({ "text": "print 1" }))).await;
    send(&app, Method::POST, &format!("/v1/sessions/{}/phases/lexical", id), None).await;

    let (status, body) = send_json(&app, Method::POST, &format!("/v1/sessions/{}/reset", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"], json!([]));
    assert_eq!(body["transcript"], "");
    assert_eq!(body["source"], "");
    assert_eq!(body["runnable"], Value::Null);
}

#[tokio::test]
async fn test_oversized_expression_is_a_failed_phase() {
    let app = app();
    let id = new_session(&app).await;
    let source = format!("print 1{}", "+1".repeat(20_000));
    send(&app, Method::PUT, &format!("/v1/sessions/{}/source", id), Some(json!({ "text": source }))).await;
    send(&app, Method::POST, &format!("/v1/sessions/{}/phases/lexical", id), None).await;

    let (status, body) = send_json(&app, Method::POST, &format!("/v1/sessions/{}/phases/syntax", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entry"]["outcome"]["status"], "failure");
    assert_eq!(body["runnable"], "lexical");

    let (status, _) = send(&app, Method::GET, "/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Transcript, health, metrics
// =============================================================================

#[tokio::test]
async fn test_transcript_formats() {
    let app = app();
    let id = new_session(&app).await;
    send(&app, Method::PUT, &format!("/v1/sessions/{}/source", id), Some(json!({ "text": "print 1" }))).await;
    send(&app, Method::POST, &format!("/v1/sessions/{}/phases/lexical", id), None).await;

    let (status, plain) = send(&app, Method::GET, &format!("/v1/sessions/{}/transcript", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(plain.starts_with("=== Lexical Analysis ===\n"));

    let (_, md) = send(&app, Method::GET, &format!("/v1/sessions/{}/transcript?format=markdown", id), None).await;
    assert!(md.contains("## 1. Lexical Analysis"));

    let (_, json) = send_json(&app, Method::GET, &format!("/v1/sessions/{}/transcript?format=json", id), None).await;
    assert_eq!(json["entries"][0]["phase"], "lexical");

    let (status, _) = send(&app, Method::GET, &format!("/v1/sessions/{}/transcript?format=pdf", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = app();
    new_session(&app).await;
    let (status, body) = send_json(&app, Method::GET, "/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sessions"], 1);
}

#[tokio::test]
async fn test_metrics_count_invocations() {
    let app = app();
    let id = new_session(&app).await;
    send(&app, Method::PUT, &format!("/v1/sessions/{}/source", id), Some(json!({ "text": "print 1" }))).await;
    send(&app, Method::POST, &format!("/v1/sessions/{}/phases/lexical", id), None).await;
    send(&app, Method::POST, &format!("/v1/sessions/{}/phases/lexical", id), None).await;

    let (status, text) = send(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("minic_sessions_active 1"), "{}", text);
    assert!(text.contains("minic_phase_invocations_total{outcome=\"success\",phase=\"lexical\"} 1"), "{}", text);
    assert!(text.contains("minic_phase_invocations_total{outcome=\"rejected\",phase=\"lexical\"} 1"), "{}", text);
}
