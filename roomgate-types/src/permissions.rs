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

//! Roles, capabilities and room-scoped permission grants.
//!
//! A client asks for a coarse [`Role`]; the gateway turns it into a
//! [`PermissionSet`] of [`Grant`]s, each scoped to exactly one room.

use serde::{Deserialize, Serialize};

/// Coarse capability tier requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reader,
    Writer,
    /// Same room-scoped grants as [`Role::Writer`].
    Admin,
}

impl Role {
    /// Parse a role token, ignoring surrounding whitespace and ASCII case.
    ///
    /// Returns `None` for anything that is not a recognized token; callers
    /// must reject rather than fall back to a default role.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reader" => Some(Self::Reader),
            "writer" => Some(Self::Writer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Writer => "writer",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single kind of action on a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Join and leave the group (and therefore receive its messages).
    JoinLeaveGroup,
    /// Publish messages to the group.
    SendToGroup,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JoinLeaveGroup => "join-leave-group",
            Self::SendToGroup => "send-to-group",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capability restricted to one room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    pub capability: Capability,
    /// The room (transport group) the capability applies to. Never empty.
    pub scope: String,
}

impl Grant {
    pub fn new(capability: Capability, scope: impl Into<String>) -> Self {
        Self {
            capability,
            scope: scope.into(),
        }
    }
}

/// Insertion-ordered set of grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    grants: Vec<Grant>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a grant, keeping first-insertion order. Returns `false` if the
    /// grant was already present.
    pub fn insert(&mut self, grant: Grant) -> bool {
        if self.grants.contains(&grant) {
            return false;
        }
        self.grants.push(grant);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Grant> {
        self.grants.iter()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn contains(&self, grant: &Grant) -> bool {
        self.grants.contains(grant)
    }

    /// Whether `capability` is granted on `group`.
    pub fn allows(&self, capability: Capability, group: &str) -> bool {
        self.grants
            .iter()
            .any(|g| g.capability == capability && g.scope == group)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.grants.iter().any(|g| g.capability == capability)
    }

    pub fn is_subset_of(&self, other: &PermissionSet) -> bool {
        self.grants.iter().all(|g| other.contains(g))
    }

    pub fn is_strict_subset_of(&self, other: &PermissionSet) -> bool {
        self.is_subset_of(other) && !other.is_subset_of(self)
    }

    /// True when every grant is scoped to exactly `room`.
    pub fn is_scoped_to(&self, room: &str) -> bool {
        self.grants.iter().all(|g| g.scope == room)
    }
}

impl FromIterator<Grant> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Grant>>(iter: I) -> Self {
        let mut set = Self::new();
        for grant in iter {
            set.insert(grant);
        }
        set
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a Grant;
    type IntoIter = std::slice::Iter<'a, Grant>;

    fn into_iter(self) -> Self::IntoIter {
        self.grants.iter()
    }
}
