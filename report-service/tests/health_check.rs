//! Integration tests for the health surface.
//!
//! Run with: cargo test -p report-service --test health_check

mod common;

use common::spawn_app;
use report_service::services::providers::mock::MockTextProvider;
use reqwest::Client;
use std::sync::Arc;

#[tokio::test]
async fn health_check_returns_ok() {
    let port = spawn_app("test-api-key", Arc::new(MockTextProvider::new("unused"))).await;
    let client = Client::new();

    let response = client
        .get(format!("http://localhost:{}/health", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "report-service");
}

#[tokio::test]
async fn readiness_check_returns_ok() {
    let port = spawn_app("test-api-key", Arc::new(MockTextProvider::new("unused"))).await;
    let client = Client::new();

    let response = client
        .get(format!("http://localhost:{}/ready", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}
