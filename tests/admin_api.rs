//! Health-check and admin routes served over the router.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header::AUTHORIZATION, Method, Request, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tower::ServiceExt;

use chat_guard::health::{FallbackMessages, HealthReporter};
use chat_guard::http::{AppState, HttpServer};
use chat_guard::resilience::FailureKind;
use chat_guard::CircuitRegistry;

mod common;

const KEY: &str = "test-key";

fn app() -> (Router, Arc<CircuitRegistry>) {
    let (registry, _observer) = common::recorded_registry();
    let reporter = Arc::new(HealthReporter::new(registry.clone(), FallbackMessages::default()));
    let router = HttpServer::build_router(AppState::new(reporter, KEY));
    (router, registry)
}

/// Chat route of a host application whose completion backend is down.
async fn reply(State(registry): State<Arc<CircuitRegistry>>) -> Json<Value> {
    let text = registry
        .execute(
            "openai",
            |_| async { Err::<String, _>("upstream returned 503") },
            "The assistant is unavailable.".to_string(),
        )
        .await;
    Json(serde_json::json!({ "reply": text }))
}

async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    key: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header(AUTHORIZATION, format!("Bearer {key}"));
    }
    let response = router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_reports_degraded_when_circuit_open() {
    let (router, registry) = app();
    registry.record_success("redis");

    let (status, body) = call(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], true);
    assert_eq!(body["services"]["redis"]["state"], "CLOSED");

    for _ in 0..3 {
        registry.record_failure("openai", FailureKind::Error, "429");
    }
    let (status, body) = call(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["healthy"], false);
    assert_eq!(body["openCircuits"], serde_json::json!(["openai"]));
    assert_eq!(body["services"]["openai"]["healthy"], false);
}

#[tokio::test]
async fn test_admin_requires_bearer_key() {
    let (router, _registry) = app();

    let (status, _) = call(&router, Method::GET, "/admin/circuits", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&router, Method::GET, "/admin/circuits", Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&router, Method::GET, "/admin/status", Some(KEY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "operational");
}

#[tokio::test]
async fn test_circuit_stats_and_reset() {
    let (router, registry) = app();
    for _ in 0..3 {
        registry.record_success("database");
    }
    registry.record_failure("database", FailureKind::Error, "deadlock");

    let (status, body) = call(&router, Method::GET, "/admin/circuits/database", Some(KEY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalRequests"], 4);
    assert_eq!(body["failureRate"], 25.0);
    assert!(body["lastFailure"].is_string());

    let (status, body) = call(&router, Method::GET, "/admin/circuits", Some(KEY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, _) = call(&router, Method::GET, "/admin/circuits/ghost", Some(KEY)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(
        &router,
        Method::POST,
        "/admin/circuits/database/reset",
        Some(KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "CLOSED");
    assert_eq!(body["totalRequests"], 0);

    let (status, _) = call(&router, Method::POST, "/admin/circuits/ghost/reset", Some(KEY)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_router_mounted_in_host_sees_its_breakers() {
    let (guard, registry) = app();
    let host = Router::new()
        .route("/chat", post(reply))
        .with_state(registry.clone())
        .merge(guard);

    for _ in 0..3 {
        let (status, body) = call(&host, Method::POST, "/chat", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "The assistant is unavailable.");
    }

    let (status, body) = call(&host, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["openCircuits"], serde_json::json!(["openai"]));

    let (status, body) = call(&host, Method::GET, "/admin/circuits", Some(KEY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["service"], "openai");
    assert_eq!(body[0]["state"], "OPEN");

    let (status, _) = call(&host, Method::POST, "/admin/circuits/openai/reset", Some(KEY)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!registry.is_open("openai"));
}
