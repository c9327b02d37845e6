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

//! Shared test helpers for roomgate-api integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use roomgate_api::config::Config;
use roomgate_api::negotiate::NegotiationService;
use roomgate_api::routes;
use roomgate_api::signer::{ClientToken, Signer, SignerError, TokenProvider, TokenRequest};
use roomgate_api::state::AppState;
use serde::de::DeserializeOwned;

pub const TEST_ACCESS_KEY: &str = "integration-test-access-key";
pub const TEST_CONNECTION_STRING: &str =
    "Endpoint=https://test.webpubsub.azure.com;AccessKey=integration-test-access-key;Version=1.0;";
pub const TEST_TTL_SECS: i64 = 3600;

/// Provider double that records requests and answers with a canned outcome.
pub struct FakeProvider {
    pub requests: Mutex<Vec<TokenRequest>>,
    outcome: Result<(), SignerError>,
}

impl FakeProvider {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            outcome: Ok(()),
        })
    }

    pub fn failing(err: SignerError) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            outcome: Err(err),
        })
    }

    pub fn recorded(&self) -> Vec<TokenRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenProvider for FakeProvider {
    async fn issue_client_token(&self, request: &TokenRequest) -> Result<ClientToken, SignerError> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcome.clone()?;
        let token = format!("fake-token-for-{}", request.user_id);
        Ok(ClientToken {
            url: format!(
                "wss://fake.webpubsub.test/client/hubs/{}?access_token={token}",
                request.hub
            ),
            token,
        })
    }

    async fn probe(&self) -> Result<(), SignerError> {
        self.outcome.clone()
    }

    fn endpoint_host(&self) -> Option<String> {
        Some("fake.webpubsub.test".to_string())
    }
}

/// Configuration from an explicit variable list; nothing read from the process.
pub fn config_with(pairs: &[(&str, &str)]) -> Config {
    Config::from_lookup(|key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .expect("test configuration should be valid")
}

/// App wired to the real provider adapter in local signing mode (no network).
pub fn build_local_app() -> Router {
    let config = config_with(&[("WEB_PUBSUB_CONNECTION_STRING", TEST_CONNECTION_STRING)]);
    routes::app(AppState::new(&config))
}

/// App with no provider configuration at all.
pub fn build_unconfigured_app() -> Router {
    routes::app(AppState::new(&config_with(&[])))
}

/// App whose signer talks to `provider`.
pub fn build_app_with(provider: Arc<FakeProvider>) -> Router {
    let config = config_with(&[]);
    let signer = Signer::new(provider, config.hub.clone(), Duration::from_secs(5));
    let service = NegotiationService::new(signer, TEST_TTL_SECS, config.max_identity_len);
    routes::app(AppState::with_service(service, &config))
}

/// GET /api/negotiate with the given query string.
pub fn negotiate_get(query: &str) -> http::Request<axum::body::Body> {
    http::Request::builder()
        .method("GET")
        .uri(format!("/api/negotiate?{query}"))
        .header("Origin", "https://app.example.com")
        .body(axum::body::Body::empty())
        .unwrap()
}

/// POST /api/negotiate with a JSON body.
pub fn negotiate_post(query: &str, json: &str) -> http::Request<axum::body::Body> {
    http::Request::builder()
        .method("POST")
        .uri(format!("/api/negotiate?{query}"))
        .header("Origin", "https://app.example.com")
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from(json.to_string()))
        .unwrap()
}

/// Consume a response body and deserialize JSON into `T`.
pub async fn response_json<T: DeserializeOwned>(resp: Response) -> T {
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("deserialize response body")
}

/// Consume a response body as UTF-8 text.
pub async fn response_text(resp: Response) -> String {
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
