//! Wire frames exchanged with the `/ws` push-update endpoint.
//!
//! Inbound frames are a closed set of `type` tags. Anything outside that set
//! decodes to [`InboundMessage::Unknown`] and is ignored by consumers; payloads
//! that are not JSON at all surface as [`FrameError`].
//!
//! Only `type` and `data` decide whether a frame decodes. Optional metadata
//! with the wrong shape reads as absent.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::FrameError;
use crate::ids::{Room, TenantId};

/// A frame received from the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundMessage {
    /// The server acknowledged a new link.
    Connected {
        /// Tenant the server bound this socket to.
        #[serde(
            default,
            rename = "tenantId",
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        tenant_id: Option<TenantId>,
    },
    /// A room-scoped change.
    Update {
        /// Event tag, e.g. `status-update`.
        #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
        event: Option<String>,
        /// Room the update was broadcast to.
        #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
        room: Option<Room>,
        /// Update payload.
        #[serde(default)]
        data: Value,
        /// Server-side emission time.
        #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
        timestamp: Option<DateTime<Utc>>,
    },
    /// A change addressed to the current identity.
    Personal {
        /// Event tag.
        #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
        event: Option<String>,
        /// Update payload.
        #[serde(default)]
        data: Value,
        /// Server-side emission time.
        #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
        timestamp: Option<DateTime<Utc>>,
    },
    /// Any other `type` tag.
    #[serde(other)]
    Unknown,
}

/// Decode an optional field, reading a value of the wrong shape as `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

impl InboundMessage {
    /// Decode a text frame.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The `type` tag this frame was decoded from.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Update { .. } => "update",
            Self::Personal { .. } => "personal",
            Self::Unknown => "unknown",
        }
    }

    /// The consumer-facing payload, for frame types that are forwarded.
    pub fn into_update(self) -> Option<Update> {
        match self {
            Self::Update { data, event, .. } | Self::Personal { data, event, .. } => {
                Some(Update { data, event })
            }
            Self::Connected { .. } | Self::Unknown => None,
        }
    }
}

/// Payload delivered to a connection's message callback.
#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    /// The frame's `data` field.
    pub data: Value,
    /// The frame's `event` tag, if any.
    pub event: Option<String>,
}

/// A control frame sent to the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlFrame {
    /// Start receiving updates for a room.
    Subscribe {
        /// Room to join.
        room: Room,
    },
    /// Stop receiving updates for a room.
    Unsubscribe {
        /// Room to leave.
        room: Room,
    },
}

impl ControlFrame {
    /// Serialize to the JSON text sent on the wire.
    pub fn to_json(&self) -> String {
        // Two string-keyed variants with string fields cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }
}
