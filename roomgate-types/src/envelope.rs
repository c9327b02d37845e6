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

//! Room message envelope exchanged over an established real-time connection.
//!
//! The gateway is not in this data path; the types live here so that the
//! browser client and any server-side broadcaster agree on one shape.
//!
//! Two layers are modelled:
//! - [`RoomMessage`]: the application payload (`join`, `leave`, `update`,
//!   `broadcast` or an application-defined `type`).
//! - [`GroupFrame`]: the client-to-transport frame of the
//!   `json.webpubsub.azure.v1` subprotocol that carries a message to a group.
//!
//! The transport enforces group scope at the protocol level only. A
//! broadcaster that trusts a client-declared room must cross-check it
//! against the credential with [`RoomMessage::authorize_sender`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::permissions::{Capability, PermissionSet};
use crate::token::ClientAccessTokenClaims;

/// Subprotocol clients must request when opening the connection.
pub const SUBPROTOCOL: &str = "json.webpubsub.azure.v1";

/// Discriminator of a [`RoomMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    Join,
    Leave,
    Update,
    Broadcast,
    /// Any other application-defined type, kept verbatim.
    Custom(String),
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Join => "join",
            Self::Leave => "leave",
            Self::Update => "update",
            Self::Broadcast => "broadcast",
            Self::Custom(kind) => kind,
        }
    }
}

impl From<String> for MessageKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "join" => Self::Join,
            "leave" => Self::Leave,
            "update" => Self::Update,
            "broadcast" => Self::Broadcast,
            _ => Self::Custom(value),
        }
    }
}

impl From<MessageKind> for String {
    fn from(value: MessageKind) -> Self {
        match value {
            MessageKind::Custom(kind) => kind,
            other => other.as_str().to_string(),
        }
    }
}

/// Application message addressed to one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,

    /// Target room (transport group).
    pub group: String,

    /// Sender identity. Convention only; the transport does not enforce it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    /// Display name. Convention only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Opaque application payload.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,

    /// RFC 3339 timestamp set by the sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl RoomMessage {
    pub fn new(kind: MessageKind, group: impl Into<String>) -> Self {
        Self {
            kind,
            group: group.into(),
            sender: None,
            username: None,
            payload: Value::Null,
            timestamp: None,
        }
    }

    pub fn join(group: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::new(MessageKind::Join, group)
        }
    }

    pub fn leave(group: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::new(MessageKind::Leave, group)
        }
    }

    pub fn update(group: impl Into<String>, payload: Value) -> Self {
        Self {
            payload,
            ..Self::new(MessageKind::Update, group)
        }
    }

    pub fn broadcast(group: impl Into<String>, payload: Value) -> Self {
        Self {
            payload,
            ..Self::new(MessageKind::Broadcast, group)
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// The declared group must equal the room the credential was issued for.
    pub fn check_declared_room(&self, granted_room: &str) -> Result<(), EnvelopeError> {
        if self.group == granted_room {
            Ok(())
        } else {
            Err(EnvelopeError::RoomMismatch {
                declared: self.group.clone(),
                granted: granted_room.to_string(),
            })
        }
    }

    /// Verify that the holder of `claims` was allowed to publish this message.
    pub fn authorize_sender(&self, claims: &ClientAccessTokenClaims) -> Result<(), EnvelopeError> {
        if claims.permissions().allows(Capability::SendToGroup, &self.group) {
            Ok(())
        } else {
            Err(EnvelopeError::NotGranted {
                capability: Capability::SendToGroup,
                group: self.group.clone(),
            })
        }
    }
}

/// Payload encoding of a [`GroupFrame::SendToGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Json,
    Text,
    Binary,
    Protobuf,
}

/// Client-to-transport frame addressing a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GroupFrame {
    JoinGroup {
        group: String,
        #[serde(rename = "ackId", default, skip_serializing_if = "Option::is_none")]
        ack_id: Option<u64>,
    },
    LeaveGroup {
        group: String,
        #[serde(rename = "ackId", default, skip_serializing_if = "Option::is_none")]
        ack_id: Option<u64>,
    },
    SendToGroup {
        group: String,
        #[serde(rename = "ackId", default, skip_serializing_if = "Option::is_none")]
        ack_id: Option<u64>,
        #[serde(rename = "noEcho", default, skip_serializing_if = "Option::is_none")]
        no_echo: Option<bool>,
        #[serde(rename = "dataType")]
        data_type: DataType,
        data: Value,
    },
}

impl GroupFrame {
    /// Wrap a [`RoomMessage`] in a `sendToGroup` frame targeting its group.
    pub fn send(message: &RoomMessage, ack_id: Option<u64>) -> Result<Self, serde_json::Error> {
        Ok(Self::SendToGroup {
            group: message.group.clone(),
            ack_id,
            no_echo: None,
            data_type: DataType::Json,
            data: serde_json::to_value(message)?,
        })
    }

    pub fn group(&self) -> &str {
        match self {
            Self::JoinGroup { group, .. }
            | Self::LeaveGroup { group, .. }
            | Self::SendToGroup { group, .. } => group,
        }
    }

    pub fn required_capability(&self) -> Capability {
        match self {
            Self::JoinGroup { .. } | Self::LeaveGroup { .. } => Capability::JoinLeaveGroup,
            Self::SendToGroup { .. } => Capability::SendToGroup,
        }
    }

    /// Check the frame against the grants of a credential.
    ///
    /// A `sendToGroup` frame whose JSON payload is a [`RoomMessage`] must
    /// also declare the same group as the frame itself.
    pub fn authorize(&self, granted: &PermissionSet) -> Result<(), EnvelopeError> {
        let capability = self.required_capability();
        let group = self.group();
        if !granted.allows(capability, group) {
            return Err(EnvelopeError::NotGranted {
                capability,
                group: group.to_string(),
            });
        }
        if let Self::SendToGroup {
            data_type: DataType::Json,
            data,
            ..
        } = self
        {
            if let Ok(message) = serde_json::from_value::<RoomMessage>(data.clone()) {
                message.check_declared_room(group)?;
            }
        }
        Ok(())
    }
}

/// Envelope rejected by a scope check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The message declares a room other than the one granted.
    RoomMismatch { declared: String, granted: String },
    /// The credential holds no grant for this capability on this group.
    NotGranted { capability: Capability, group: String },
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoomMismatch { declared, granted } => {
                write!(f, "message declares room '{declared}' but credential grants '{granted}'")
            }
            Self::NotGranted { capability, group } => {
                write!(f, "{capability} is not granted on group '{group}'")
            }
        }
    }
}

impl std::error::Error for EnvelopeError {}
