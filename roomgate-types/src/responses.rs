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

//! Response types for the gateway HTTP API.

use serde::{Deserialize, Serialize};

/// Successful negotiation payload.
///
/// # Example
///
/// ```json
/// {
///   "url": "wss://demo.webpubsub.azure.com/client/hubs/default?access_token=eyJ...",
///   "userId": "alice",
///   "room": "r1",
///   "hub": "default",
///   "roles": ["webpubsub.joinLeaveGroup.r1", "webpubsub.sendToGroup.r1"],
///   "expiresIn": 3600
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NegotiateResponse {
    /// Signed connection endpoint, proof embedded as a query parameter.
    pub url: String,
    pub user_id: String,
    pub room: String,
    pub hub: String,
    /// Provider permission strings granted to the connection.
    pub roles: Vec<String>,
    /// Seconds until the provider rejects the credential.
    pub expires_in: i64,
}

/// Overall readiness verdict.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessStatus {
    Healthy,
    Unhealthy,
}

/// Body of `GET /api/health`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ReadinessReport {
    pub status: ReadinessStatus,
    pub provider_configured: bool,
    pub hub: String,
    /// Host part of the provider endpoint. Never the connection string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_host: Option<String>,
    pub token_mode: String,
    /// Whether a synthetic token was issued and the provider answered.
    pub reachable: bool,
    pub conclusion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Body of `GET /api/healthz`: configuration presence only, no network.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ConfigReport {
    pub connection_string_found: bool,
    pub connection_string_valid: bool,
    pub hub: String,
    pub token_mode: String,
    pub token_ttl_secs: i64,
    pub conclusion: String,
}
