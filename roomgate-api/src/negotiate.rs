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

//! Negotiation service: validate, map role to grants, issue a credential.
//!
//! Each call walks
//! `Received -> Validated -> PermissionsComputed -> CredentialIssued -> Responded`
//! and may leave early as `Rejected` (bad input) or `Failed` (signer error).
//! Nothing is shared between calls.

use roomgate_types::requests::NegotiateParams;
use roomgate_types::responses::NegotiateResponse;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::permissions::map_permissions;
use crate::signer::{Signer, SignerError, SignerErrorKind};
use crate::validate::{IdentityRequest, NegotiationRequest, ValidationError, Validator};

/// Progress of a single negotiation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    PermissionsComputed,
    CredentialIssued,
    Responded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NegotiationError {
    /// Client input was rejected before any grant was computed.
    #[error("rejected: {0}")]
    Rejected(#[from] ValidationError),
    /// The signer could not issue a credential.
    #[error("failed: {0}")]
    Failed(#[from] SignerError),
}

impl From<NegotiationError> for AppError {
    fn from(err: NegotiationError) -> Self {
        match err {
            NegotiationError::Rejected(e) => e.into(),
            NegotiationError::Failed(e) => e.into(),
        }
    }
}

/// A fresh, collision-resistant subject identity.
pub fn generate_identity() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Clone)]
pub struct NegotiationService {
    validator: Validator,
    signer: Signer,
    ttl_secs: i64,
}

impl NegotiationService {
    pub fn new(signer: Signer, ttl_secs: i64, max_identity_len: usize) -> Self {
        Self {
            validator: Validator::new(max_identity_len),
            signer,
            ttl_secs,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Signer::from_config(config),
            config.token_ttl_secs,
            config.max_identity_len,
        )
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Negotiate from raw parameters.
    pub async fn negotiate_params(
        &self,
        params: &NegotiateParams,
    ) -> Result<NegotiateResponse, NegotiationError> {
        tracing::debug!(stage = ?Stage::Received, "Negotiation received");
        let request = self
            .validator
            .validate(
                params.room_id.as_deref(),
                params.username.as_deref(),
                params.role.as_deref(),
            )
            .inspect_err(|e| tracing::info!("Negotiation rejected: {e}"))?;
        self.negotiate(request).await
    }

    /// Negotiate a validated request.
    pub async fn negotiate(
        &self,
        request: NegotiationRequest,
    ) -> Result<NegotiateResponse, NegotiationError> {
        let NegotiationRequest {
            room,
            identity,
            role,
        } = request;
        tracing::debug!(stage = ?Stage::Validated, %room, %role);

        let identity = match identity {
            IdentityRequest::Provided(identity) => identity,
            IdentityRequest::Generate => generate_identity(),
        };

        let permissions = map_permissions(role, &room);
        tracing::debug!(stage = ?Stage::PermissionsComputed, grants = permissions.len());

        let credential = self
            .signer
            .issue(&room, &identity, &permissions, self.ttl_secs)
            .await
            .inspect_err(|e| self.log_failure(e))?;
        tracing::debug!(stage = ?Stage::CredentialIssued, expires_at = %credential.expires_at());

        tracing::info!(
            %room,
            %role,
            user_id = %credential.identity,
            "Issued room credential"
        );

        let response = NegotiateResponse {
            roles: credential.roles(),
            url: credential.url,
            user_id: credential.identity,
            room: credential.room,
            hub: self.signer.hub().to_string(),
            expires_in: credential.ttl_secs,
        };
        tracing::debug!(stage = ?Stage::Responded);
        Ok(response)
    }

    fn log_failure(&self, err: &SignerError) {
        let endpoint_host = self.signer.endpoint_host().unwrap_or_default();
        match err.kind {
            SignerErrorKind::Unavailable => {
                tracing::warn!(%endpoint_host, "Negotiation failed: {err}")
            }
            SignerErrorKind::Unconfigured
            | SignerErrorKind::Unauthorized
            | SignerErrorKind::Unknown => {
                tracing::error!(%endpoint_host, "Negotiation failed: {err}")
            }
        }
    }
}
