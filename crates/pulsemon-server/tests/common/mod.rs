#![allow(dead_code)]

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use pulsemon_server::app;
use pulsemon_server::config::ServerConfig;
use pulsemon_server::state::AppState;
use pulsemon_storage::MetricStore;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestContext {
    pub temp_dir: TempDir,
    pub state: AppState,
    pub app: axum::Router,
}

pub async fn build_test_context() -> Result<TestContext> {
    pulsemon_common::id::init(1, 1);

    let temp_dir = tempfile::tempdir()?;
    let db_path = temp_dir.path().join("pulsemon.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let store = Arc::new(MetricStore::connect(&db_url).await?);

    let config = ServerConfig {
        report_interval_secs: 60,
        max_targets_per_owner: 3,
        ..ServerConfig::default()
    };

    let state = AppState {
        store,
        start_time: Utc::now(),
        config: Arc::new(config),
    };

    let app = app::build_http_app(state.clone());

    Ok(TestContext {
        temp_dir,
        state,
        app,
    })
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let req_body = body.unwrap_or(Value::Null).to_string();
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(req_body))
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    decode_response(resp).await
}

pub async fn request_no_body(
    app: &axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");

    decode_response(resp).await
}

async fn decode_response(resp: axum::response::Response) -> (StatusCode, Value, Option<String>) {
    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };

    (status, json, trace_id)
}

pub fn assert_ok_envelope(json: &Value) {
    assert_eq!(json["err_code"], 0);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
}

pub fn assert_err_envelope(json: &Value, err_code: i32) {
    assert_eq!(json["err_code"], err_code);
    assert!(json["err_msg"].is_string());
    assert!(json.get("trace_id").is_some());
    assert!(json.get("data").is_some());
    assert!(json["data"].is_null());
}

pub fn decode_data<T: DeserializeOwned>(json: &Value) -> T {
    serde_json::from_value(json["data"].clone()).expect("data should decode")
}

/// Register a target and return `(target_id, api_key)`.
pub async fn register_target(app: &axum::Router, owner_id: &str, name: &str) -> (String, String) {
    let (status, body, _) = request_json(
        app,
        "POST",
        "/v1/targets",
        Some(serde_json::json!({ "ownerId": owner_id, "name": name })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_ok_envelope(&body);
    let target_id = body["data"]["id"]
        .as_str()
        .expect("target id should exist")
        .to_string();
    let api_key = body["data"]["apiKey"]
        .as_str()
        .expect("api key should exist")
        .to_string();
    (target_id, api_key)
}

/// POST one sample against an API key; asserts the 201 envelope.
pub async fn ingest_sample(app: &axum::Router, api_key: &str, cpu: f64, mem: f64) -> Value {
    let (status, body, _) = request_json(
        app,
        "POST",
        &format!("/v1/ingest/{api_key}"),
        Some(serde_json::json!({
            "cpuUsage": cpu,
            "memoryUsage": mem,
            "memoryTotal": 8_589_934_592i64,
            "memoryUsed": 4_294_967_296i64
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_ok_envelope(&body);
    body["data"].clone()
}
