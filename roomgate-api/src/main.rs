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

//! Negotiation gateway entry point.
//!
//! A standalone Axum service that issues room-scoped client access
//! credentials for the pub/sub provider.

use roomgate_api::config::{Config, ProviderConnection};
use roomgate_api::routes;
use roomgate_api::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    roomgate_api::panic_hook::install();

    let config = Config::from_env().expect("failed to load configuration");

    match &config.connection {
        ProviderConnection::Ready(info) => tracing::info!(
            endpoint_host = info.host(),
            hub = %config.hub,
            token_mode = %config.token_mode,
            "Pub/sub provider configured"
        ),
        ProviderConnection::Invalid(e) => tracing::error!(
            hub = %config.hub,
            "Pub/sub provider connection string is invalid: {e}"
        ),
        ProviderConnection::Missing => tracing::warn!(
            hub = %config.hub,
            "Pub/sub provider is not configured; negotiations will fail until it is"
        ),
    }

    let state = AppState::new(&config);
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind listener");

    tracing::info!("Negotiation gateway listening on {}", config.listen_addr);

    axum::serve(listener, app).await.expect("server error");
}
