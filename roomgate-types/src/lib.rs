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

//! Shared API types for the roomgate negotiation gateway.
//!
//! This crate defines the contract between the gateway, the browser clients
//! that negotiate access, and any server-side broadcaster that publishes into
//! rooms. It is intentionally framework-agnostic: no axum, no provider SDK.

pub mod envelope;
pub mod error;
pub mod permissions;
pub mod requests;
pub mod responses;
pub mod token;

pub use envelope::{EnvelopeError, GroupFrame, MessageKind, RoomMessage};
pub use error::APIError;
pub use permissions::{Capability, Grant, PermissionSet, Role};
pub use token::ClientAccessTokenClaims;
