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

//! Role to permission mapping.

use roomgate_types::{Capability, Grant, PermissionSet, Role};

/// Minimal grants for `role` in `room`.
///
/// Every grant is scoped to `room`; no role ever receives an unscoped or
/// cross-room capability.
pub fn map_permissions(role: Role, room: &str) -> PermissionSet {
    let capabilities: &[Capability] = match role {
        Role::Reader => &[Capability::JoinLeaveGroup],
        Role::Writer | Role::Admin => &[Capability::JoinLeaveGroup, Capability::SendToGroup],
    };
    capabilities
        .iter()
        .map(|&capability| Grant::new(capability, room))
        .collect()
}
