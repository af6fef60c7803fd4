//! Shared fixtures for response hook tests.

#![allow(dead_code)]

use std::io::Write;

use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use http::{Request, Response, StatusCode, request};
use http_body_util::{BodyExt, Full};
use serde_json::{Value, json};
use tenantgate_proxy::context::with_label_values;
use tenantgate_proxy::modify::RewrittenBody;
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber; `RUST_LOG` overrides the default level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Request parts carrying `values` as the caller's allowed label values.
pub fn parts_with_values(values: &[&str]) -> request::Parts {
    let mut request = Request::builder()
        .uri("/api/v1/rules")
        .body(())
        .unwrap();
    with_label_values(
        &mut request,
        values.iter().map(|v| v.to_string()).collect(),
    );
    request.into_parts().0
}

/// Request parts with nothing stored in the extensions.
pub fn parts_without_values() -> request::Parts {
    Request::builder()
        .uri("/api/v1/rules")
        .body(())
        .unwrap()
        .into_parts()
        .0
}

pub fn json_response(status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(serde_json::to_vec(body).unwrap())))
        .unwrap()
}

pub fn gzip_response(body: &Value) -> Response<Full<Bytes>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&serde_json::to_vec(body).unwrap())
        .unwrap();
    let compressed = encoder.finish().unwrap();
    Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/json")
        .header("content-encoding", "gzip")
        .body(Full::new(Bytes::from(compressed)))
        .unwrap()
}

pub async fn body_bytes(response: Response<RewrittenBody>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<RewrittenBody>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn alert(tenant: &str, state: &str, value: &str) -> Value {
    json!({
        "labels": {"tenant": tenant, "alertname": "HighErrorRate"},
        "annotations": {"summary": "errors"},
        "state": state,
        "activeAt": "2024-03-01T10:00:00Z",
        "value": value
    })
}

pub fn alerting_rule(tenant: &str, state: &str, alerts: Vec<Value>) -> Value {
    json!({
        "state": state,
        "name": "HighErrorRate",
        "query": "rate(errors_total[5m]) > 1",
        "duration": 300,
        "keepFiringFor": 0,
        "labels": {"tenant": tenant, "severity": "page"},
        "annotations": {"summary": "errors"},
        "alerts": alerts,
        "health": "ok",
        "evaluationTime": 0.001,
        "lastEvaluation": "2024-03-01T10:05:00Z",
        "type": "alerting"
    })
}

pub fn recording_rule(tenant: &str) -> Value {
    json!({
        "name": "job:up:sum",
        "query": "sum by (job) (up)",
        "labels": {"tenant": tenant},
        "health": "ok",
        "evaluationTime": 0.001,
        "lastEvaluation": "2024-03-01T10:05:00Z",
        "type": "recording"
    })
}

pub fn rules_envelope(groups: Vec<Value>) -> Value {
    json!({"status": "success", "data": {"groups": groups}})
}

pub fn group(name: &str, rules: Vec<Value>) -> Value {
    json!({
        "name": name,
        "file": "/etc/prometheus/rules.yaml",
        "rules": rules,
        "interval": 30,
        "evaluationTime": 0.002,
        "lastEvaluation": "2024-03-01T10:05:00Z"
    })
}
