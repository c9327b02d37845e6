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

//! API error body.
//!
//! Every failed gateway response is a flat JSON object with a stable `error`
//! field so that browser clients can surface it without unwrapping an envelope.

use serde::{Deserialize, Serialize};

/// Structured error returned as the body of every non-2xx response.
///
/// `error` is the human-readable message, `code` the machine-readable token
/// (e.g. `"MISSING_ROOM"`). `details` and `hint` are optional remediation
/// text; neither ever carries provider secrets.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct APIError {
    /// Human-readable error message.
    pub error: String,

    /// Machine-readable error code.
    pub code: String,

    /// Sanitized detail about the failure (status codes, endpoint host).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Suggested remediation for operators or client developers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl APIError {
    fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            details: None,
            hint: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn missing_room() -> Self {
        Self::new("MISSING_ROOM", "Missing room: room_id is required")
    }

    pub fn invalid_room(detail: &str) -> Self {
        Self::new("INVALID_ROOM", format!("Invalid room_id: {detail}"))
    }

    pub fn invalid_role(role: &str) -> Self {
        Self::new(
            "INVALID_ROLE",
            format!("Invalid role '{role}': expected one of writer, reader, admin"),
        )
    }

    pub fn invalid_identity(detail: &str) -> Self {
        Self::new("INVALID_IDENTITY", format!("Invalid username: {detail}"))
    }

    pub fn provider_unconfigured() -> Self {
        Self::new(
            "PROVIDER_UNCONFIGURED",
            "Pub/sub provider is not configured",
        )
    }

    pub fn provider_unauthorized() -> Self {
        Self::new(
            "PROVIDER_UNAUTHORIZED",
            "Pub/sub provider rejected the gateway credentials",
        )
    }

    pub fn provider_unavailable() -> Self {
        Self::new("PROVIDER_UNAVAILABLE", "Pub/sub provider is unavailable")
    }

    pub fn negotiation_failed() -> Self {
        Self::new("NEGOTIATION_FAILED", "Negotiation failed")
    }
}

impl std::fmt::Display for APIError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.error)
    }
}

impl std::error::Error for APIError {}
