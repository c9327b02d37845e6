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

//! Provider connection string parsing.
//!
//! Format: `Endpoint=https://<host>;AccessKey=<key>;Version=1.0;[Port=<port>;]`.
//! Keys are case-insensitive and order does not matter.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

/// Why a connection string could not be used.
///
/// Messages never include the access key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionStringError {
    #[error("connection string has no Endpoint")]
    MissingEndpoint,
    #[error("connection string has no AccessKey")]
    MissingAccessKey,
    #[error("connection string Endpoint is not a valid URL: {0}")]
    InvalidEndpoint(String),
    #[error("connection string Endpoint must be http or https, got '{0}'")]
    UnsupportedScheme(String),
    #[error("connection string Port is not a valid port number")]
    InvalidPort,
}

/// Hub access key. `Debug` and `Display` never print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey(String);

impl AccessKey {
    pub fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessKey(***)")
    }
}

/// Parsed provider connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    endpoint: Url,
    access_key: AccessKey,
}

impl ConnectionInfo {
    pub fn new(endpoint: Url, access_key: impl Into<String>) -> Self {
        Self {
            endpoint,
            access_key: AccessKey(access_key.into()),
        }
    }

    /// Endpoint host. Safe to log.
    pub fn host(&self) -> &str {
        self.endpoint.host_str().unwrap_or("")
    }

    pub fn access_key(&self) -> &AccessKey {
        &self.access_key
    }

    /// `scheme://host[:port]` of the REST endpoint.
    pub fn origin(&self) -> String {
        self.endpoint.origin().ascii_serialization()
    }

    /// Token audience for clients of `hub`.
    pub fn client_audience(&self, hub: &str) -> String {
        format!("{}/client/hubs/{hub}", self.origin())
    }

    /// WebSocket endpoint for clients of `hub`, without the access token.
    pub fn client_url(&self, hub: &str) -> Url {
        let mut url = self.endpoint.clone();
        let scheme = if url.scheme() == "http" { "ws" } else { "wss" };
        // http -> ws and https -> wss are both special-to-special, which `url` permits.
        let _ = url.set_scheme(scheme);
        url.set_path(&format!("/client/hubs/{hub}"));
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    /// REST URL under `/api/...`.
    pub fn api_url(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = Url::parse(&self.origin())?;
        base.join(&format!("/api/{}", path.trim_start_matches('/')))
    }
}

impl FromStr for ConnectionInfo {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut endpoint = None;
        let mut access_key = None;
        let mut port = None;

        for part in s.split(';') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.trim_end_matches('/').to_string()),
                "accesskey" => access_key = Some(value.to_string()),
                "port" => port = Some(value.to_string()),
                _ => {}
            }
        }

        let endpoint = endpoint
            .filter(|e| !e.is_empty())
            .ok_or(ConnectionStringError::MissingEndpoint)?;
        let access_key = access_key
            .filter(|k| !k.is_empty())
            .ok_or(ConnectionStringError::MissingAccessKey)?;

        let mut url =
            Url::parse(&endpoint).map_err(|e| ConnectionStringError::InvalidEndpoint(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ConnectionStringError::UnsupportedScheme(other.to_string())),
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(ConnectionStringError::InvalidEndpoint("missing host".to_string()));
        }
        if let Some(port) = port {
            let port = port
                .parse::<u16>()
                .map_err(|_| ConnectionStringError::InvalidPort)?;
            url.set_port(Some(port))
                .map_err(|_| ConnectionStringError::InvalidPort)?;
        }

        Ok(Self::new(url, access_key))
    }
}
