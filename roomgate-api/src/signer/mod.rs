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

//! Credential signer: adapter between the negotiation core and the pub/sub
//! provider's "issue client access token" operation.
//!
//! The provider sits behind the [`TokenProvider`] trait so tests can swap in
//! a fake. [`Signer`] owns the provider-independent contract: translating
//! grants into permission strings, bounding the call with a timeout and
//! classifying every failure into a [`SignerErrorKind`].

pub mod connection_string;
pub mod webpubsub;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use roomgate_types::token::role_string;
use roomgate_types::{Capability, PermissionSet};
use thiserror::Error;

use crate::config::{Config, ProviderConnection};
use webpubsub::WebPubSubProvider;

/// Failure classes the negotiation service maps to HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignerErrorKind {
    /// Provider configuration is missing or invalid. No call was attempted.
    #[error("unconfigured")]
    Unconfigured,
    /// The provider rejected the gateway's credentials.
    #[error("unauthorized")]
    Unauthorized,
    /// The provider could not be reached in time.
    #[error("unavailable")]
    Unavailable,
    #[error("unknown")]
    Unknown,
}

/// A classified signer failure. `message` is sanitized: it may name the
/// endpoint host and HTTP status, never the access key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct SignerError {
    pub kind: SignerErrorKind,
    pub message: String,
}

impl SignerError {
    pub fn new(kind: SignerErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unconfigured(message: impl Into<String>) -> Self {
        Self::new(SignerErrorKind::Unconfigured, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(SignerErrorKind::Unauthorized, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SignerErrorKind::Unavailable, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(SignerErrorKind::Unknown, message)
    }
}

/// Arguments of the provider's token operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub hub: String,
    pub user_id: String,
    /// Provider permission strings, each scoped to one group.
    pub roles: Vec<String>,
    /// Groups joined on connect.
    pub groups: Vec<String>,
    pub ttl_secs: i64,
}

/// Provider answer: connection URL with embedded proof plus the raw token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientToken {
    pub url: String,
    pub token: String,
}

/// External pub/sub provider.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn issue_client_token(&self, request: &TokenRequest) -> Result<ClientToken, SignerError>;

    /// Cheap reachability check used by readiness. Nothing to probe by default.
    async fn probe(&self) -> Result<(), SignerError> {
        Ok(())
    }

    /// Non-secret identifier of the provider, safe to log.
    fn endpoint_host(&self) -> Option<String> {
        None
    }
}

/// Issued access credential. Never stored by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Connection endpoint including the signed proof.
    pub url: String,
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub ttl_secs: i64,
    pub identity: String,
    pub room: String,
    pub permissions: PermissionSet,
}

impl Credential {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + chrono::Duration::seconds(self.ttl_secs)
    }

    /// Granted permissions in provider syntax.
    pub fn roles(&self) -> Vec<String> {
        self.permissions.iter().map(role_string).collect()
    }
}

/// Provider adapter with timeout and error classification.
#[derive(Clone)]
pub struct Signer {
    provider: Option<Arc<dyn TokenProvider>>,
    unconfigured_reason: String,
    hub: String,
    timeout: Duration,
}

impl Signer {
    pub fn new(provider: Arc<dyn TokenProvider>, hub: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider: Some(provider),
            unconfigured_reason: String::new(),
            hub: hub.into(),
            timeout,
        }
    }

    /// A signer that refuses every request with `Unconfigured`.
    pub fn unconfigured(reason: impl Into<String>, hub: impl Into<String>) -> Self {
        Self {
            provider: None,
            unconfigured_reason: reason.into(),
            hub: hub.into(),
            timeout: Duration::ZERO,
        }
    }

    /// Build the production signer from configuration.
    pub fn from_config(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.provider_timeout_secs);
        match &config.connection {
            ProviderConnection::Missing => Self::unconfigured(
                "WEB_PUBSUB_CONNECTION_STRING is not set",
                config.hub.clone(),
            ),
            ProviderConnection::Invalid(e) => Self::unconfigured(e.to_string(), config.hub.clone()),
            ProviderConnection::Ready(info) => {
                match WebPubSubProvider::new(info.clone(), config.token_mode, timeout) {
                    Ok(provider) => Self::new(Arc::new(provider), config.hub.clone(), timeout),
                    Err(e) => Self::unconfigured(e.message, config.hub.clone()),
                }
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn hub(&self) -> &str {
        &self.hub
    }

    pub fn endpoint_host(&self) -> Option<String> {
        self.provider.as_ref().and_then(|p| p.endpoint_host())
    }

    fn provider(&self) -> Result<&Arc<dyn TokenProvider>, SignerError> {
        self.provider
            .as_ref()
            .ok_or_else(|| SignerError::unconfigured(self.unconfigured_reason.clone()))
    }

    /// Issue a credential for `identity` in `room` carrying exactly `permissions`.
    ///
    /// Every grant must be scoped to `room`. One provider call, no retry.
    pub async fn issue(
        &self,
        room: &str,
        identity: &str,
        permissions: &PermissionSet,
        ttl_secs: i64,
    ) -> Result<Credential, SignerError> {
        let provider = self.provider()?;

        if !permissions.is_scoped_to(room) {
            return Err(SignerError::unknown("grant scoped outside the negotiated room"));
        }

        let roles: Vec<String> = permissions.iter().map(role_string).collect();
        let groups: Vec<String> = permissions
            .iter()
            .filter(|g| g.capability == Capability::JoinLeaveGroup)
            .map(|g| g.scope.clone())
            .collect();

        let request = TokenRequest {
            hub: self.hub.clone(),
            user_id: identity.to_string(),
            roles,
            groups,
            ttl_secs,
        };

        let issued_at = Utc::now();
        let token = self
            .guarded(provider.issue_client_token(&request))
            .await?;

        if token.url.is_empty() {
            return Err(SignerError::unknown("provider returned no connection url"));
        }

        Ok(Credential {
            url: token.url,
            token: token.token,
            issued_at,
            ttl_secs,
            identity: identity.to_string(),
            room: room.to_string(),
            permissions: permissions.clone(),
        })
    }

    /// Run the provider's reachability probe under the same guard.
    pub async fn probe(&self) -> Result<(), SignerError> {
        let provider = self.provider()?;
        self.guarded(provider.probe()).await
    }

    /// Bound a provider future by the timeout and turn a panic into `Unknown`.
    async fn guarded<T, F>(&self, call: F) -> Result<T, SignerError>
    where
        F: std::future::Future<Output = Result<T, SignerError>>,
    {
        match tokio::time::timeout(self.timeout, AssertUnwindSafe(call).catch_unwind()).await {
            Err(_) => Err(SignerError::unavailable(format!(
                "provider did not answer within {}s",
                self.timeout.as_secs()
            ))),
            Ok(Err(_panic)) => {
                tracing::error!("Provider adapter panicked");
                Err(SignerError::unknown("provider adapter failed unexpectedly"))
            }
            Ok(Ok(result)) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomgate_types::Grant;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<TokenRequest>>,
    }

    #[async_trait]
    impl TokenProvider for Recording {
        async fn issue_client_token(
            &self,
            request: &TokenRequest,
        ) -> Result<ClientToken, SignerError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(ClientToken {
                url: format!("wss://fake/client/hubs/{}?access_token=t", request.hub),
                token: "t".to_string(),
            })
        }
    }

    struct Stalling;

    #[async_trait]
    impl TokenProvider for Stalling {
        async fn issue_client_token(&self, _: &TokenRequest) -> Result<ClientToken, SignerError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!("timeout fires first")
        }
    }

    struct Panicking;

    #[async_trait]
    impl TokenProvider for Panicking {
        async fn issue_client_token(&self, _: &TokenRequest) -> Result<ClientToken, SignerError> {
            panic!("sdk blew up with AccessKey=secret")
        }
    }

    fn writer(room: &str) -> PermissionSet {
        [
            Grant::new(Capability::JoinLeaveGroup, room),
            Grant::new(Capability::SendToGroup, room),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn translates_grants_into_scoped_role_strings() {
        let provider = Arc::new(Recording::default());
        let signer = Signer::new(provider.clone(), "default", Duration::from_secs(5));

        let credential = signer
            .issue("r1", "alice", &writer("r1"), 3600)
            .await
            .expect("issue");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(
            seen[0].roles,
            vec!["webpubsub.joinLeaveGroup.r1", "webpubsub.sendToGroup.r1"]
        );
        assert_eq!(seen[0].groups, vec!["r1"]);
        assert_eq!(seen[0].user_id, "alice");
        assert_eq!(seen[0].ttl_secs, 3600);
        assert_eq!(credential.roles(), seen[0].roles);
        assert_eq!(credential.expires_at() - credential.issued_at, chrono::Duration::hours(1));
    }

    #[tokio::test]
    async fn unconfigured_short_circuits() {
        let signer = Signer::unconfigured("WEB_PUBSUB_CONNECTION_STRING is not set", "default");
        let err = signer
            .issue("r1", "alice", &writer("r1"), 60)
            .await
            .unwrap_err();
        assert_eq!(err.kind, SignerErrorKind::Unconfigured);
        assert!(!signer.is_configured());
    }

    #[tokio::test]
    async fn refuses_grants_for_another_room() {
        let signer = Signer::new(Arc::new(Recording::default()), "default", Duration::from_secs(5));
        let err = signer
            .issue("r1", "alice", &writer("r2"), 60)
            .await
            .unwrap_err();
        assert_eq!(err.kind, SignerErrorKind::Unknown);
    }

    #[tokio::test]
    async fn slow_provider_is_unavailable() {
        let signer = Signer::new(Arc::new(Stalling), "default", Duration::from_millis(50));
        let err = signer
            .issue("r1", "alice", &writer("r1"), 60)
            .await
            .unwrap_err();
        assert_eq!(err.kind, SignerErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn panicking_provider_is_unknown_and_sanitized() {
        let signer = Signer::new(Arc::new(Panicking), "default", Duration::from_secs(5));
        let err = signer
            .issue("r1", "alice", &writer("r1"), 60)
            .await
            .unwrap_err();
        assert_eq!(err.kind, SignerErrorKind::Unknown);
        assert!(!err.message.contains("secret"));
    }
}
