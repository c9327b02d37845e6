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

//! Process panic hook that records where a panic happened, never its payload.
//!
//! Panic messages from provider adapters may carry connection details, so
//! only the source location reaches the log.

use std::panic::Location;

/// Replace the default hook, which prints the payload to stderr.
pub fn install() {
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("{}", describe(info.location()));
    }));
}

pub fn describe(location: Option<&Location<'_>>) -> String {
    match location {
        Some(loc) => format!("panic at {}:{}:{}", loc.file(), loc.line(), loc.column()),
        None => "panic at unknown location".to_string(),
    }
}
