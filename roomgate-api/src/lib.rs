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

//! Negotiation gateway library.
//!
//! Validates room access requests, maps the requested role to room-scoped
//! grants and issues a signed, expiring pub/sub credential. The binary entry
//! point (`main.rs`) is a thin wrapper that calls into this library.

pub mod config;
pub mod error;
pub mod negotiate;
pub mod panic_hook;
pub mod permissions;
pub mod readiness;
pub mod routes;
pub mod signer;
pub mod state;
pub mod validate;
