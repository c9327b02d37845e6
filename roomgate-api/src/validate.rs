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

//! Negotiation request validation.
//!
//! Turns raw, untrusted parameters into a [`NegotiationRequest`]. Pure and
//! total: every input string yields either a request or a [`ValidationError`].

use std::sync::LazyLock;

use regex::Regex;
use roomgate_types::Role;
use thiserror::Error;

/// Longest accepted room identifier, in bytes.
pub const MAX_ROOM_LEN: usize = 256;

/// Room identifiers become transport group names and the scope suffix of
/// permission strings, so separators of both syntaxes are excluded.
const ROOM_PATTERN: &str = r"^[^\s\p{Cc}.,;/?#&$][^\s\p{Cc}.,;/?#&]*$";

/// Longest rejected role echoed back to the client.
const MAX_ECHOED_ROLE_LEN: usize = 32;

static ROOM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(ROOM_PATTERN).expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("room_id is required")]
    MissingRoom,
    #[error("invalid room_id: {0}")]
    InvalidRoom(String),
    #[error("invalid role '{0}'")]
    InvalidRole(String),
    #[error("invalid username: {0}")]
    InvalidIdentity(String),
}

/// Whether the caller supplied an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityRequest {
    Provided(String),
    /// The negotiation service must generate one.
    Generate,
}

/// Canonical, validated negotiation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationRequest {
    pub room: String,
    pub identity: IdentityRequest,
    pub role: Role,
}

#[derive(Debug, Clone, Copy)]
pub struct Validator {
    max_identity_len: usize,
}

impl Validator {
    pub fn new(max_identity_len: usize) -> Self {
        Self { max_identity_len }
    }

    pub fn validate(
        &self,
        raw_room: Option<&str>,
        raw_identity: Option<&str>,
        raw_role: Option<&str>,
    ) -> Result<NegotiationRequest, ValidationError> {
        let room = validate_room(raw_room)?;
        let role = validate_role(raw_role)?;
        let identity = match raw_identity {
            None => IdentityRequest::Generate,
            Some(raw) => IdentityRequest::Provided(self.validate_identity(raw)?),
        };
        Ok(NegotiationRequest {
            room,
            identity,
            role,
        })
    }

    fn validate_identity(&self, raw: &str) -> Result<String, ValidationError> {
        let identity = raw.trim();
        if identity.is_empty() {
            return Err(ValidationError::InvalidIdentity("cannot be empty".to_string()));
        }
        if identity.chars().count() > self.max_identity_len {
            return Err(ValidationError::InvalidIdentity(format!(
                "cannot exceed {} characters",
                self.max_identity_len
            )));
        }
        if identity.chars().any(char::is_control) {
            return Err(ValidationError::InvalidIdentity(
                "cannot contain control characters".to_string(),
            ));
        }
        Ok(identity.to_string())
    }
}

fn validate_room(raw: Option<&str>) -> Result<String, ValidationError> {
    let room = raw.map(str::trim).unwrap_or("");
    if room.is_empty() {
        return Err(ValidationError::MissingRoom);
    }
    if room.len() > MAX_ROOM_LEN {
        return Err(ValidationError::InvalidRoom(format!(
            "cannot exceed {MAX_ROOM_LEN} bytes"
        )));
    }
    if !ROOM_RE.is_match(room) {
        return Err(ValidationError::InvalidRoom(
            "cannot contain whitespace, control characters, '.', ',', ';', '/', '?', '#', '&' or start with '$'"
                .to_string(),
        ));
    }
    Ok(room.to_string())
}

fn validate_role(raw: Option<&str>) -> Result<Role, ValidationError> {
    let raw = raw.unwrap_or("");
    Role::parse(raw).ok_or_else(|| {
        let echoed: String = raw.trim().chars().take(MAX_ECHOED_ROLE_LEN).collect();
        ValidationError::InvalidRole(echoed)
    })
}
