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

//! Client access token claims as understood by the pub/sub provider.
//!
//! The provider accepts an HS256 JWT signed with the hub's access key. The
//! gateway produces one per negotiation; broadcasters holding the same key
//! may decode it to recover the granted room.

use serde::{Deserialize, Serialize};

use crate::permissions::{Capability, Grant, PermissionSet};

/// JWT payload of a client access token.
///
/// # Example payload
///
/// ```json
/// {
///   "aud": "https://demo.webpubsub.azure.com/client/hubs/default",
///   "iat": 1707001200,
///   "exp": 1707004800,
///   "sub": "alice",
///   "role": ["webpubsub.joinLeaveGroup.r1", "webpubsub.sendToGroup.r1"],
///   "webpubsub.group": ["r1"]
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientAccessTokenClaims {
    /// `<endpoint>/client/hubs/<hub>`.
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Provider permission strings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub role: Vec<String>,
    /// Groups the connection joins on connect.
    #[serde(
        rename = "webpubsub.group",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub groups: Vec<String>,
}

impl ClientAccessTokenClaims {
    /// Decode the `role` claim back into grants. Unscoped or unknown
    /// permission strings are dropped, so they can never widen access.
    pub fn permissions(&self) -> PermissionSet {
        self.role.iter().filter_map(|r| parse_role(r)).collect()
    }
}

const JOIN_LEAVE_GROUP: &str = "webpubsub.joinLeaveGroup";
const SEND_TO_GROUP: &str = "webpubsub.sendToGroup";

/// Provider permission string for a grant: `<capability>.<group>`.
pub fn role_string(grant: &Grant) -> String {
    let capability = match grant.capability {
        Capability::JoinLeaveGroup => JOIN_LEAVE_GROUP,
        Capability::SendToGroup => SEND_TO_GROUP,
    };
    format!("{capability}.{}", grant.scope)
}

/// Inverse of [`role_string`]. Returns `None` for unscoped strings.
pub fn parse_role(role: &str) -> Option<Grant> {
    let (capability, scope) = if let Some(scope) = role.strip_prefix(JOIN_LEAVE_GROUP) {
        (Capability::JoinLeaveGroup, scope)
    } else if let Some(scope) = role.strip_prefix(SEND_TO_GROUP) {
        (Capability::SendToGroup, scope)
    } else {
        return None;
    };
    let scope = scope.strip_prefix('.')?;
    if scope.is_empty() {
        return None;
    }
    Some(Grant::new(capability, scope))
}
