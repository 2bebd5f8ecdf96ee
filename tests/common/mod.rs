//! Common test utilities

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use balance_ledger::{BalanceService, build_router, store::MemoryLedgerStore};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

/// Router backed by a fresh in-memory store, plus a handle on that store.
pub fn memory_app() -> (Router, MemoryLedgerStore) {
    let store = MemoryLedgerStore::new();
    let app = build_router(BalanceService::new(store.clone()));
    (app, store)
}

/// Send one request and return status plus parsed JSON body.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
