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

//! Azure Web PubSub implementation of [`TokenProvider`].
//!
//! In [`TokenMode::Local`] the client token is an HS256 JWT signed in-process
//! with the hub access key, which is what the provider SDKs do when given a
//! connection string. In [`TokenMode::Service`] the provider's
//! `generateToken` REST operation mints it instead.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::StatusCode;
use roomgate_types::ClientAccessTokenClaims;
use serde::{Deserialize, Serialize};
use url::Url;

use super::connection_string::ConnectionInfo;
use super::{ClientToken, SignerError, TokenProvider, TokenRequest};
use crate::config::TokenMode;

/// REST API version sent with every provider call.
pub const API_VERSION: &str = "2024-01-01";

/// Lifetime of the bearer token authorising a single REST call.
const SERVICE_TOKEN_TTL_SECS: i64 = 300;

/// Claims of the bearer token for provider REST calls.
#[derive(Debug, Serialize, Deserialize)]
struct ServiceTokenClaims {
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct GenerateTokenResponse {
    token: String,
}

pub struct WebPubSubProvider {
    connection: ConnectionInfo,
    mode: TokenMode,
    http: reqwest::Client,
}

impl WebPubSubProvider {
    pub fn new(
        connection: ConnectionInfo,
        mode: TokenMode,
        timeout: Duration,
    ) -> Result<Self, SignerError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| SignerError::unconfigured(format!("HTTP client setup failed: {e}")))?;
        Ok(Self {
            connection,
            mode,
            http,
        })
    }

    async fn generate_token(&self, request: &TokenRequest) -> Result<String, SignerError> {
        let host = self.connection.host();
        let url = generate_token_url(&self.connection, request)?;
        let bearer = sign_service_token(&self.connection, url.as_str(), Utc::now().timestamp())?;

        let response = self
            .http
            .post(url)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| classify_transport(e, host))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, host));
        }

        let body: GenerateTokenResponse = response.json().await.map_err(|e| {
            SignerError::unknown(format!(
                "malformed generateToken response from {host}: {}",
                e.without_url()
            ))
        })?;
        Ok(body.token)
    }
}

#[async_trait]
impl TokenProvider for WebPubSubProvider {
    async fn issue_client_token(&self, request: &TokenRequest) -> Result<ClientToken, SignerError> {
        let token = match self.mode {
            TokenMode::Local => {
                sign_client_token(&self.connection, request, Utc::now().timestamp())?
            }
            TokenMode::Service => self.generate_token(request).await?,
        };

        let mut url = self.connection.client_url(&request.hub);
        url.query_pairs_mut().append_pair("access_token", &token);

        Ok(ClientToken {
            url: url.to_string(),
            token,
        })
    }

    async fn probe(&self) -> Result<(), SignerError> {
        let host = self.connection.host();
        let mut url = self
            .connection
            .api_url("health")
            .map_err(|e| SignerError::unconfigured(format!("invalid endpoint: {e}")))?;
        url.query_pairs_mut().append_pair("api-version", API_VERSION);

        let response = self
            .http
            .head(url)
            .send()
            .await
            .map_err(|e| classify_transport(e, host))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(classify_status(status, host))
        }
    }

    fn endpoint_host(&self) -> Option<String> {
        Some(self.connection.host().to_string())
    }
}

/// Sign a client access token locally.
pub fn sign_client_token(
    connection: &ConnectionInfo,
    request: &TokenRequest,
    now: i64,
) -> Result<String, SignerError> {
    let claims = ClientAccessTokenClaims {
        aud: connection.client_audience(&request.hub),
        iat: now,
        exp: now + request.ttl_secs,
        sub: Some(request.user_id.clone()),
        role: request.roles.clone(),
        groups: request.groups.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(connection.access_key().expose()),
    )
    .map_err(|e| {
        tracing::error!("Failed to sign client token: {e}");
        SignerError::unknown("failed to sign client token")
    })
}

fn sign_service_token(
    connection: &ConnectionInfo,
    audience: &str,
    now: i64,
) -> Result<String, SignerError> {
    let claims = ServiceTokenClaims {
        aud: audience.to_string(),
        iat: now,
        exp: now + SERVICE_TOKEN_TTL_SECS,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(connection.access_key().expose()),
    )
    .map_err(|e| {
        tracing::error!("Failed to sign service token: {e}");
        SignerError::unknown("failed to sign service token")
    })
}

/// `POST <endpoint>/api/hubs/<hub>/:generateToken?...` for `request`.
pub fn generate_token_url(
    connection: &ConnectionInfo,
    request: &TokenRequest,
) -> Result<Url, SignerError> {
    let mut url = connection
        .api_url(&format!("hubs/{}/:generateToken", request.hub))
        .map_err(|e| SignerError::unconfigured(format!("invalid endpoint: {e}")))?;

    // The REST operation only accepts whole minutes.
    let minutes = (request.ttl_secs + 59) / 60;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("api-version", API_VERSION);
        pairs.append_pair("userId", &request.user_id);
        for role in &request.roles {
            pairs.append_pair("role", role);
        }
        for group in &request.groups {
            pairs.append_pair("group", group);
        }
        pairs.append_pair("minutesToExpire", &minutes.to_string());
    }
    Ok(url)
}

/// Map a non-success provider status to a signer error.
pub fn classify_status(status: StatusCode, host: &str) -> SignerError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SignerError::unauthorized(format!("{host} rejected the access key (HTTP {status})"))
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            SignerError::unavailable(format!("{host} is throttling or timing out (HTTP {status})"))
        }
        s if s.is_server_error() => {
            SignerError::unavailable(format!("{host} returned HTTP {status}"))
        }
        _ => SignerError::unknown(format!("{host} returned unexpected HTTP {status}")),
    }
}

fn classify_transport(err: reqwest::Error, host: &str) -> SignerError {
    if err.is_timeout() || err.is_connect() {
        SignerError::unavailable(format!("{host} is unreachable"))
    } else {
        SignerError::unknown(format!("request to {host} failed: {}", err.without_url()))
    }
}
