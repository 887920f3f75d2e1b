//! # Tests for Handlers
//!
//! Unit tests for the handlers that need no session.

use axum::response::Json;

use crate::handlers::{healthz, root};

#[tokio::test]
async fn test_root_handler_returns_expected_service_info() {
    let Json(service_info) = root().await;

    assert_eq!(service_info.service, "eventosnow");
    assert_eq!(service_info.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_root_handler_returns_valid_json() {
    let Json(service_info) = root().await;

    let json = serde_json::to_value(&service_info).expect("Failed to serialize ServiceInfo");
    assert!(json.get("service").is_some());
    assert!(json.get("version").is_some());
}

#[tokio::test]
async fn test_healthz_reports_ok() {
    let Json(health) = healthz().await;
    assert_eq!(health.status, "ok");
}
