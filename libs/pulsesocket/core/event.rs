use serde::{Deserialize, Serialize};

/// Discriminant carried by every locally synthesized status envelope
pub const STATUS_ENVELOPE_TYPE: &str = "connection";

/// Connection status reported to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Error,
}

/// Status envelope synthesized by the manager (never read from the wire)
///
/// Serializes as `{"type":"connection","status":"connected","message":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: ConnectionStatus,
    pub message: String,
}

impl StatusEnvelope {
    pub fn new(status: ConnectionStatus, message: impl Into<String>) -> Self {
        Self {
            kind: STATUS_ENVELOPE_TYPE.to_string(),
            status,
            message: message.into(),
        }
    }

    pub fn connected() -> Self {
        Self::new(ConnectionStatus::Connected, "Connected to server")
    }

    pub fn disconnected() -> Self {
        Self::new(ConnectionStatus::Disconnected, "Disconnected from server")
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ConnectionStatus::Error, message)
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }
}

/// Event delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent<M> {
    /// Locally synthesized connection status
    Status(StatusEnvelope),
    /// Decoded inbound message, forwarded as-is
    Message(M),
}

impl<M> SocketEvent<M> {
    pub fn as_status(&self) -> Option<&StatusEnvelope> {
        match self {
            SocketEvent::Status(status) => Some(status),
            SocketEvent::Message(_) => None,
        }
    }

    pub fn as_message(&self) -> Option<&M> {
        match self {
            SocketEvent::Status(_) => None,
            SocketEvent::Message(message) => Some(message),
        }
    }
}
