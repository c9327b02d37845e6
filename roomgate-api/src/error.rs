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

//! Application error type that implements Axum's `IntoResponse`.
//!
//! Every error is returned as a flat [`APIError`] JSON body paired with the
//! HTTP status derived from the failure class.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roomgate_types::APIError;

use crate::signer::{SignerError, SignerErrorKind};
use crate::validate::ValidationError;

const UNCONFIGURED_HINT: &str = "Set WEB_PUBSUB_CONNECTION_STRING to the resource connection string \
     (Endpoint=...;AccessKey=...;Version=1.0;) and restart the gateway";

/// Application-level error that pairs an HTTP status code with an [`APIError`].
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub body: APIError,
}

impl AppError {
    pub fn new(status: StatusCode, body: APIError) -> Self {
        Self { status, body }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        let body = match &err {
            ValidationError::MissingRoom => APIError::missing_room(),
            ValidationError::InvalidRoom(detail) => APIError::invalid_room(detail),
            ValidationError::InvalidRole(role) => APIError::invalid_role(role),
            ValidationError::InvalidIdentity(detail) => APIError::invalid_identity(detail),
        };
        Self::new(StatusCode::BAD_REQUEST, body)
    }
}

impl From<SignerError> for AppError {
    fn from(err: SignerError) -> Self {
        match err.kind {
            SignerErrorKind::Unconfigured => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                APIError::provider_unconfigured()
                    .with_details(err.message)
                    .with_hint(UNCONFIGURED_HINT),
            ),
            SignerErrorKind::Unauthorized => Self::new(
                StatusCode::UNAUTHORIZED,
                APIError::provider_unauthorized()
                    .with_details(err.message)
                    .with_hint("Verify the AccessKey in the connection string is current"),
            ),
            SignerErrorKind::Unavailable => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                APIError::provider_unavailable().with_details(err.message),
            ),
            SignerErrorKind::Unknown => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                APIError::negotiation_failed().with_details(err.message),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
