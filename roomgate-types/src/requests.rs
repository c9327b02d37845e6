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

//! Request types for the negotiation endpoint.
//!
//! Parameters arrive either in the query string or in a JSON body; both are
//! deserialized into [`NegotiateParams`] and merged by the gateway.

use serde::{Deserialize, Serialize};

/// Parameters for `GET|POST /api/negotiate`.
///
/// Every field is optional at this layer so that a partially filled query
/// string can be completed from the body. Validation happens server-side.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct NegotiateParams {
    /// Room to negotiate access for. Used verbatim as the transport group.
    #[serde(default)]
    pub room_id: Option<String>,

    /// Subject identity. Generated by the gateway when omitted.
    #[serde(default)]
    pub username: Option<String>,

    /// `writer`, `reader` or `admin`, case-insensitive.
    #[serde(default)]
    pub role: Option<String>,
}
