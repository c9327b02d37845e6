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

//! Readiness and configuration reports.
//!
//! Readiness drives the same [`Signer`] contract as a negotiation, using a
//! synthetic identity and no grants, then asks the provider whether it is
//! reachable. It never performs a real negotiation.

use roomgate_types::responses::{ConfigReport, ReadinessReport, ReadinessStatus};
use roomgate_types::PermissionSet;

use crate::config::{Config, ProviderConnection, TokenMode};
use crate::signer::{Signer, SignerError, SignerErrorKind};

/// Identity and room used for the synthetic token.
pub const HEALTH_CHECK_IDENTITY: &str = "health-check";

/// Lifetime of the synthetic token.
const HEALTH_CHECK_TTL_SECS: i64 = 60;

/// Outcome of a readiness check.
#[derive(Debug, Clone)]
pub struct Readiness {
    pub report: ReadinessReport,
    /// `None` when healthy.
    pub failure: Option<SignerErrorKind>,
}

pub async fn check_readiness(signer: &Signer, token_mode: TokenMode) -> Readiness {
    let result = probe(signer).await;

    let (status, conclusion, hint, failure) = match &result {
        Ok(()) => (
            ReadinessStatus::Healthy,
            "Provider is configured and reachable; a synthetic token was issued.".to_string(),
            None,
            None,
        ),
        Err(err) => (
            ReadinessStatus::Unhealthy,
            format!("Provider check failed ({}): {}", err.kind, err.message),
            Some(hint_for(err.kind).to_string()),
            Some(err.kind),
        ),
    };

    Readiness {
        report: ReadinessReport {
            status,
            provider_configured: signer.is_configured(),
            hub: signer.hub().to_string(),
            endpoint_host: signer.endpoint_host(),
            token_mode: token_mode.to_string(),
            reachable: result.is_ok(),
            conclusion,
            hint,
        },
        failure,
    }
}

async fn probe(signer: &Signer) -> Result<(), SignerError> {
    signer
        .issue(
            HEALTH_CHECK_IDENTITY,
            HEALTH_CHECK_IDENTITY,
            &PermissionSet::new(),
            HEALTH_CHECK_TTL_SECS,
        )
        .await?;
    signer.probe().await
}

fn hint_for(kind: SignerErrorKind) -> &'static str {
    match kind {
        SignerErrorKind::Unconfigured => {
            "Set WEB_PUBSUB_CONNECTION_STRING in the gateway environment and restart it"
        }
        SignerErrorKind::Unauthorized => {
            "Verify the connection string AccessKey matches the provider resource"
        }
        SignerErrorKind::Unavailable => {
            "Verify the provider resource is running and reachable from the gateway"
        }
        SignerErrorKind::Unknown => "Check the gateway logs for the full provider error",
    }
}

/// Configuration presence report. No network access.
pub fn config_report(config: &Config) -> ConfigReport {
    let (found, valid, conclusion) = match &config.connection {
        ProviderConnection::Missing => (
            false,
            false,
            "WEB_PUBSUB_CONNECTION_STRING is not set.".to_string(),
        ),
        ProviderConnection::Invalid(e) => (true, false, format!("Connection string is invalid: {e}.")),
        ProviderConnection::Ready(info) => (
            true,
            true,
            format!("Connection string found for {}.", info.host()),
        ),
    };

    ConfigReport {
        connection_string_found: found,
        connection_string_valid: valid,
        hub: config.hub.clone(),
        token_mode: config.token_mode.to_string(),
        token_ttl_secs: config.token_ttl_secs,
        conclusion,
    }
}
