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

//! Axum router configuration for the negotiation gateway.

pub mod health;
pub mod negotiate;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::state::AppState;

/// Build the application router with all gateway routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/negotiate",
            get(negotiate::negotiate).post(negotiate::negotiate),
        )
        .route("/api/health", get(health::readiness))
        .route("/api/healthz", get(health::healthz))
}

/// Cross-origin policy for browser clients on other origins.
///
/// `OPTIONS` requests are answered by the layer itself with an empty 200.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Router with CORS applied and state attached, ready to serve.
///
/// `CorsLayer` only lists allowed methods and headers on preflight answers;
/// the two set-header layers add them to every other response as well.
pub fn app(state: AppState) -> Router {
    router()
        .layer(cors_layer())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("content-type, authorization"),
        ))
        .with_state(state)
}
