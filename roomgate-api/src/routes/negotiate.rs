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

//! Handler for the negotiation endpoint.

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    Json,
};
use roomgate_types::{requests::NegotiateParams, responses::NegotiateResponse};
use url::form_urlencoded;

use crate::error::AppError;
use crate::state::AppState;

/// GET|POST /api/negotiate
///
/// Parameters come from the query string or a JSON body; per field the query
/// wins. An unreadable body counts as empty.
pub async fn negotiate(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<NegotiateResponse>, AppError> {
    let params = merge_params(parse_query(query.as_deref()), parse_body(&body));
    let response = state.negotiation.negotiate_params(&params).await?;
    Ok(Json(response))
}

/// First occurrence of each parameter wins; empty values count as absent.
fn parse_query(query: Option<&str>) -> NegotiateParams {
    let mut params = NegotiateParams::default();
    let Some(query) = query else {
        return params;
    };
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let slot = match key.as_ref() {
            "room_id" => &mut params.room_id,
            "username" => &mut params.username,
            "role" => &mut params.role,
            _ => continue,
        };
        if slot.is_none() && !value.is_empty() {
            *slot = Some(value.into_owned());
        }
    }
    params
}

fn parse_body(body: &[u8]) -> NegotiateParams {
    if body.is_empty() {
        return NegotiateParams::default();
    }
    serde_json::from_slice(body).unwrap_or_default()
}

fn merge_params(query: NegotiateParams, body: NegotiateParams) -> NegotiateParams {
    fn pick(primary: Option<String>, fallback: Option<String>) -> Option<String> {
        primary.or(fallback.filter(|v| !v.is_empty()))
    }
    NegotiateParams {
        room_id: pick(query.room_id, body.room_id),
        username: pick(query.username, body.username),
        role: pick(query.role, body.role),
    }
}
