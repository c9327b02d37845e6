/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Tests for the readiness and configuration report endpoints.

mod test_helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use roomgate_api::signer::SignerError;
use roomgate_types::responses::{ConfigReport, ReadinessReport, ReadinessStatus};
use test_helpers::*;
use tower::ServiceExt;

fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_is_ready_with_working_provider() {
    let provider = FakeProvider::ok();
    let app = build_app_with(provider.clone());
    let resp = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let report: ReadinessReport = response_json(resp).await;
    assert_eq!(report.status, ReadinessStatus::Healthy);
    assert!(report.reachable);
    assert!(report.provider_configured);
    assert_eq!(report.endpoint_host.as_deref(), Some("fake.webpubsub.test"));

    // The synthetic token carries no grants.
    let recorded = provider.recorded();
    assert_eq!(recorded.len(), 1);
    assert!(recorded[0].roles.is_empty());
    assert!(recorded[0].groups.is_empty());
}

#[tokio::test]
async fn test_health_is_unavailable_when_unconfigured() {
    let app = build_unconfigured_app();
    let resp = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let report: ReadinessReport = response_json(resp).await;
    assert_eq!(report.status, ReadinessStatus::Unhealthy);
    assert!(!report.provider_configured);
    assert!(!report.reachable);
    assert!(report.hint.is_some());
}

#[tokio::test]
async fn test_health_is_unavailable_when_provider_rejects_key() {
    let app = build_app_with(FakeProvider::failing(SignerError::unauthorized(
        "fake.webpubsub.test rejected the access key (HTTP 401)",
    )));
    let resp = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let report: ReadinessReport = response_json(resp).await;
    assert!(report.conclusion.contains("rejected"));
}

#[tokio::test]
async fn test_healthz_reports_configuration_without_secrets() {
    let app = build_local_app();
    let resp = app.oneshot(get("/api/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let text = response_text(resp).await;
    assert!(!text.contains(TEST_ACCESS_KEY));
    let report: ConfigReport = serde_json::from_str(&text).unwrap();
    assert!(report.connection_string_found);
    assert!(report.connection_string_valid);
    assert_eq!(report.hub, "default");
    assert_eq!(report.token_mode, "local");
}

#[tokio::test]
async fn test_healthz_is_ok_when_unconfigured() {
    let app = build_unconfigured_app();
    let resp = app.oneshot(get("/api/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let report: ConfigReport = response_json(resp).await;
    assert!(!report.connection_string_found);
    assert!(report.conclusion.contains("WEB_PUBSUB_CONNECTION_STRING"));
}
