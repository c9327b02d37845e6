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

//! Shared application state passed to every Axum handler via `State`.

use std::sync::Arc;

use crate::config::Config;
use crate::negotiate::NegotiationService;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Negotiation core with its injected signer.
    pub negotiation: NegotiationService,
    /// Start-up configuration, for diagnostics.
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_service(NegotiationService::from_config(config), config)
    }

    /// State around an explicitly built service (e.g. one with a fake provider).
    pub fn with_service(negotiation: NegotiationService, config: &Config) -> Self {
        Self {
            negotiation,
            config: Arc::new(config.clone()),
        }
    }
}
