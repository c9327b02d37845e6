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

//! Diagnostic endpoints: readiness and configuration presence.

use axum::{extract::State, http::StatusCode, Json};
use roomgate_types::responses::{ConfigReport, ReadinessReport};

use crate::readiness::{check_readiness, config_report};
use crate::state::AppState;

/// GET /api/health
///
/// 200 when a synthetic token can be issued and the provider answers,
/// 503 otherwise.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessReport>) {
    let readiness = check_readiness(state.negotiation.signer(), state.config.token_mode).await;
    let status = match readiness.failure {
        None => StatusCode::OK,
        Some(kind) => {
            tracing::warn!("Readiness check failed: {kind}");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    (status, Json(readiness.report))
}

/// GET /api/healthz
///
/// Always 200 so the report is visible even when the provider is not configured.
pub async fn healthz(State(state): State<AppState>) -> Json<ConfigReport> {
    Json(config_report(&state.config))
}
