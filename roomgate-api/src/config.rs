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

//! Application configuration loaded from environment variables.
//!
//! The configuration is read once at start-up and injected into
//! [`crate::state::AppState`]; nothing below `main` touches the environment.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::signer::connection_string::{ConnectionInfo, ConnectionStringError};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:7071";
const DEFAULT_HUB: &str = "default";
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
const MAX_TOKEN_TTL_SECS: i64 = 86_400;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 5;
const MAX_PROVIDER_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_IDENTITY_LEN: usize = 128;
const HUB_PATTERN: &str = "^[A-Za-z][A-Za-z0-9_]*$";

/// How client access tokens are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenMode {
    /// Sign the token in-process with the hub access key.
    Local,
    /// Ask the provider's `generateToken` REST operation for the token.
    Service,
}

impl TokenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Service => "service",
        }
    }
}

impl FromStr for TokenMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "service" => Ok(Self::Service),
            other => Err(format!("TOKEN_MODE must be 'local' or 'service', got '{other}'")),
        }
    }
}

impl fmt::Display for TokenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the provider connection string.
///
/// A missing or unparsable value does not stop the server; it is reported
/// as an unconfigured provider on every negotiation and readiness check.
#[derive(Debug, Clone)]
pub enum ProviderConnection {
    Missing,
    Invalid(ConnectionStringError),
    Ready(ConnectionInfo),
}

impl ProviderConnection {
    fn parse(raw: Option<String>) -> Self {
        match raw.filter(|s| !s.trim().is_empty()) {
            None => Self::Missing,
            Some(raw) => match raw.parse::<ConnectionInfo>() {
                Ok(info) => Self::Ready(info),
                Err(e) => Self::Invalid(e),
            },
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Missing)
    }

    pub fn info(&self) -> Option<&ConnectionInfo> {
        match self {
            Self::Ready(info) => Some(info),
            _ => None,
        }
    }
}

/// Configuration for the negotiation gateway.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server (e.g. "0.0.0.0:7071").
    pub listen_addr: String,
    /// Provider hub (namespace) all rooms live in.
    pub hub: String,
    /// Parsed provider connection string. The access key is redacted in `Debug`.
    pub connection: ProviderConnection,
    pub token_mode: TokenMode,
    /// Credential time-to-live in seconds (default: 3600 = 60 minutes).
    pub token_ttl_secs: i64,
    /// Upper bound on a single provider call.
    pub provider_timeout_secs: u64,
    /// Longest accepted caller-supplied identity, in characters.
    pub max_identity_len: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Provider
    /// - `WEB_PUBSUB_CONNECTION_STRING` (falls back to `AZURE_WEB_PUBSUB_CONNECTION_STRING`)
    /// - `WEB_PUBSUB_HUB` (falls back to `WEB_PUBSUB_HUB_NAME`, default `"default"`)
    /// - `TOKEN_MODE` (`local` | `service`, default `local`)
    ///
    /// # Optional
    /// - `LISTEN_ADDR` (default: `"0.0.0.0:7071"`)
    /// - `TOKEN_TTL_SECS` (default: `"3600"`)
    /// - `PROVIDER_TIMEOUT_SECS` (default: `"5"`)
    /// - `MAX_IDENTITY_LEN` (default: `"128"`)
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen_addr = var("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());

        let connection = ProviderConnection::parse(
            var("WEB_PUBSUB_CONNECTION_STRING")
                .or_else(|| var("AZURE_WEB_PUBSUB_CONNECTION_STRING")),
        );

        let hub = var("WEB_PUBSUB_HUB")
            .or_else(|| var("WEB_PUBSUB_HUB_NAME"))
            .unwrap_or_else(|| DEFAULT_HUB.to_string());
        let re = regex::Regex::new(HUB_PATTERN).expect("valid regex");
        if !re.is_match(&hub) {
            return Err(format!("WEB_PUBSUB_HUB must match pattern: {HUB_PATTERN}"));
        }

        let token_mode = match var("TOKEN_MODE") {
            Some(mode) => mode.parse()?,
            None => TokenMode::Local,
        };

        let token_ttl_secs = match var("TOKEN_TTL_SECS") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .map_err(|_| "TOKEN_TTL_SECS must be a valid integer")?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&token_ttl_secs) {
            return Err(format!(
                "TOKEN_TTL_SECS must be between 1 and {MAX_TOKEN_TTL_SECS}"
            ));
        }
        // The generateToken operation takes whole minutes.
        if token_mode == TokenMode::Service && token_ttl_secs % 60 != 0 {
            return Err("TOKEN_TTL_SECS must be a multiple of 60 when TOKEN_MODE=service".to_string());
        }

        let provider_timeout_secs = match var("PROVIDER_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|_| "PROVIDER_TIMEOUT_SECS must be a valid integer")?,
            None => DEFAULT_PROVIDER_TIMEOUT_SECS,
        };
        if !(1..=MAX_PROVIDER_TIMEOUT_SECS).contains(&provider_timeout_secs) {
            return Err(format!(
                "PROVIDER_TIMEOUT_SECS must be between 1 and {MAX_PROVIDER_TIMEOUT_SECS}"
            ));
        }

        let max_identity_len = match var("MAX_IDENTITY_LEN") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .map_err(|_| "MAX_IDENTITY_LEN must be a valid integer")?,
            None => DEFAULT_MAX_IDENTITY_LEN,
        };
        if max_identity_len == 0 {
            return Err("MAX_IDENTITY_LEN must be greater than zero".to_string());
        }

        Ok(Self {
            listen_addr,
            hub,
            connection,
            token_mode,
            token_ttl_secs,
            provider_timeout_secs,
            max_identity_len,
        })
    }
}
