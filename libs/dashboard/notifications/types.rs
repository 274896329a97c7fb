//! Notification message types
//!
//! Inbound frames are JSON objects with a `type` discriminant. Known user
//! lifecycle events carry a `data` object:
//!
//! ```json
//! {
//!     "type": "user:created",
//!     "data": { "email": "a@x.com", "name": "A", "message": "Welcome A" },
//!     "timestamp": "2024-05-01T12:00:00Z"
//! }
//! ```
//!
//! Unknown types are delivered unchanged.

use chrono::{DateTime, Utc};
use pulsesocket::{decode_json_object, MessageDecoder, Result, SocketError, WsMessage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const USER_CREATED: &str = "user:created";
pub const USER_UPDATED: &str = "user:updated";
pub const USER_DELETED: &str = "user:deleted";

/// Prefix shared by every user lifecycle event
pub const USER_EVENT_PREFIX: &str = "user:";

const DEFAULT_MESSAGE: &str = "User event occurred";

// =============================================================================
// Notification
// =============================================================================

/// One server event, kept verbatim
///
/// Always a JSON object with a string `type`; everything else is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Notification(Value);

impl Notification {
    /// Wrap a JSON value; `None` unless it is an object with a string `type`
    pub fn from_value(value: Value) -> Option<Self> {
        match value.get("type") {
            Some(Value::String(_)) => Some(Self(value)),
            _ => None,
        }
    }

    pub fn event_type(&self) -> &str {
        self.0.get("type").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn kind(&self) -> NotificationKind {
        NotificationKind::from_type(self.event_type())
    }

    pub fn is_user_event(&self) -> bool {
        self.event_type().starts_with(USER_EVENT_PREFIX)
    }

    pub fn data(&self) -> Option<&Value> {
        self.0.get("data")
    }

    /// User record carried in `data`, if it has at least an email
    pub fn user(&self) -> Option<UserPayload> {
        self.data()
            .and_then(|data| serde_json::from_value(data.clone()).ok())
    }

    /// `data.message`, then top-level `message`, then a generic text
    pub fn display_message(&self) -> &str {
        self.data()
            .and_then(|data| non_empty_str(data, "message"))
            .or_else(|| non_empty_str(&self.0, "message"))
            .unwrap_or(DEFAULT_MESSAGE)
    }

    /// Server-side timestamp (RFC 3339 string or epoch milliseconds)
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self.0.get("timestamp")? {
            Value::String(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|ts| ts.with_timezone(&Utc)),
            Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
            _ => None,
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// `data` object of a user lifecycle event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// NotificationKind
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    UserCreated,
    UserUpdated,
    UserDeleted,
    Other,
}

/// Visual weight of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Info,
    Error,
}

impl NotificationKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            USER_CREATED => NotificationKind::UserCreated,
            USER_UPDATED => NotificationKind::UserUpdated,
            USER_DELETED => NotificationKind::UserDeleted,
            _ => NotificationKind::Other,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::UserCreated => "New user registered",
            NotificationKind::UserUpdated => "User updated",
            NotificationKind::UserDeleted => "User deleted",
            NotificationKind::Other => "Notification",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            NotificationKind::UserCreated => Severity::Success,
            NotificationKind::UserUpdated | NotificationKind::Other => Severity::Info,
            NotificationKind::UserDeleted => Severity::Error,
        }
    }
}

// =============================================================================
// NotificationDecoder
// =============================================================================

/// Accepts text frames holding a JSON object with a string `type`
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationDecoder;

impl MessageDecoder for NotificationDecoder {
    type Message = Notification;

    fn decode(&self, frame: &WsMessage) -> Result<Self::Message> {
        let value = decode_json_object(frame)?;
        Notification::from_value(value)
            .ok_or_else(|| SocketError::Decode("missing string 'type' field".into()))
    }
}
