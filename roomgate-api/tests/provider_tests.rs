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

//! Service-mode provider calls against a local mock of the provider REST API.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use roomgate_api::config::TokenMode;
use roomgate_api::signer::connection_string::ConnectionInfo;
use roomgate_api::signer::webpubsub::{WebPubSubProvider, API_VERSION};
use roomgate_api::signer::{Signer, SignerErrorKind, TokenProvider, TokenRequest};
use roomgate_types::{Capability, Grant, PermissionSet};

const ACCESS_KEY: &str = "mock-access-key";

#[derive(Debug, Clone)]
struct SeenRequest {
    method: Method,
    path: String,
    query: String,
    authorization: Option<String>,
}

#[derive(Clone)]
struct MockProvider {
    status: StatusCode,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

async fn mock_handler(
    State(mock): State<MockProvider>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    mock.seen.lock().unwrap().push(SeenRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });
    if mock.status.is_success() {
        (mock.status, Json(serde_json::json!({ "token": "service-issued-token" }))).into_response()
    } else {
        mock.status.into_response()
    }
}

async fn spawn_mock(status: StatusCode) -> (SocketAddr, Arc<Mutex<Vec<SeenRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(mock_handler).with_state(MockProvider {
        status,
        seen: seen.clone(),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, seen)
}

fn connection_for(addr: SocketAddr) -> ConnectionInfo {
    format!(
        "Endpoint=http://127.0.0.1;Port={};AccessKey={ACCESS_KEY};Version=1.0;",
        addr.port()
    )
    .parse()
    .unwrap()
}

fn service_provider(addr: SocketAddr) -> WebPubSubProvider {
    WebPubSubProvider::new(connection_for(addr), TokenMode::Service, Duration::from_secs(2)).unwrap()
}

fn writer_request() -> TokenRequest {
    TokenRequest {
        hub: "default".to_string(),
        user_id: "alice".to_string(),
        roles: vec![
            "webpubsub.joinLeaveGroup.r1".to_string(),
            "webpubsub.sendToGroup.r1".to_string(),
        ],
        groups: vec!["r1".to_string()],
        ttl_secs: 3600,
    }
}

#[tokio::test]
async fn test_service_mode_returns_provider_token() {
    let (addr, seen) = spawn_mock(StatusCode::OK).await;
    let provider = service_provider(addr);

    let token = provider.issue_client_token(&writer_request()).await.unwrap();
    assert_eq!(token.token, "service-issued-token");
    assert!(token.url.starts_with(&format!("ws://127.0.0.1:{}/client/hubs/default?", addr.port())));
    assert!(token.url.ends_with("access_token=service-issued-token"));

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    let call = &seen[0];
    assert_eq!(call.method, Method::POST);
    assert_eq!(call.path, "/api/hubs/default/:generateToken");
    assert!(call.query.contains(&format!("api-version={API_VERSION}")));
    assert!(call.query.contains("userId=alice"));
    assert!(call.query.contains("group=r1"));
    assert!(call.query.contains("minutesToExpire=60"));
    assert!(call
        .authorization
        .as_deref()
        .is_some_and(|v| v.starts_with("Bearer ")));
}

#[tokio::test]
async fn test_service_mode_classifies_rejected_key() {
    let (addr, _) = spawn_mock(StatusCode::UNAUTHORIZED).await;
    let err = service_provider(addr)
        .issue_client_token(&writer_request())
        .await
        .unwrap_err();
    assert_eq!(err.kind, SignerErrorKind::Unauthorized);
    assert!(!err.message.contains(ACCESS_KEY));
}

#[tokio::test]
async fn test_service_mode_classifies_server_error() {
    let (addr, _) = spawn_mock(StatusCode::BAD_GATEWAY).await;
    let err = service_provider(addr)
        .issue_client_token(&writer_request())
        .await
        .unwrap_err();
    assert_eq!(err.kind, SignerErrorKind::Unavailable);
}

#[tokio::test]
async fn test_unreachable_provider_is_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = service_provider(addr);
    let err = provider
        .issue_client_token(&writer_request())
        .await
        .unwrap_err();
    assert_eq!(err.kind, SignerErrorKind::Unavailable);

    let err = provider.probe().await.unwrap_err();
    assert_eq!(err.kind, SignerErrorKind::Unavailable);
}

#[tokio::test]
async fn test_probe_hits_health_endpoint() {
    let (addr, seen) = spawn_mock(StatusCode::OK).await;
    service_provider(addr).probe().await.unwrap();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, Method::HEAD);
    assert_eq!(seen[0].path, "/api/health");
}

#[tokio::test]
async fn test_signer_returns_credential_from_service_mode() {
    let (addr, _) = spawn_mock(StatusCode::OK).await;
    let signer = Signer::new(
        Arc::new(service_provider(addr)),
        "default",
        Duration::from_secs(2),
    );
    let perms: PermissionSet = [
        Grant::new(Capability::JoinLeaveGroup, "r1"),
        Grant::new(Capability::SendToGroup, "r1"),
    ]
    .into_iter()
    .collect();

    let credential = signer.issue("r1", "alice", &perms, 600).await.unwrap();
    assert_eq!(credential.identity, "alice");
    assert_eq!(credential.room, "r1");
    assert_eq!(credential.ttl_secs, 600);
    assert_eq!(credential.token, "service-issued-token");
    assert_eq!(
        credential.expires_at() - credential.issued_at,
        chrono::Duration::seconds(600)
    );
}
