use crate::error::{Result, SocketError};
use std::fmt::Debug;

/// Data frame received from or sent to a WebSocket
///
/// Control frames (ping, pong, close) never reach this type; they are
/// handled by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl WsMessage {
    /// Get the message as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WsMessage::Text(s) => Some(s),
            WsMessage::Binary(_) => None,
        }
    }

    /// Get the message as binary, if it is binary
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            WsMessage::Text(_) => None,
            WsMessage::Binary(b) => Some(b),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, WsMessage::Text(_))
    }
}

/// Turns raw inbound frames into typed messages
///
/// Called on the connection task for every data frame. A decode error drops
/// the frame: it is counted in the metrics, logged at debug level, and never
/// reaches subscribers.
///
/// # Example
///
/// ```ignore
/// struct PriceDecoder;
///
/// impl MessageDecoder for PriceDecoder {
///     type Message = f64;
///
///     fn decode(&self, frame: &WsMessage) -> Result<f64> {
///         let text = frame.as_text().ok_or_else(|| SocketError::Decode("binary".into()))?;
///         text.trim().parse().map_err(|e| SocketError::Decode(format!("{e}")))
///     }
/// }
/// ```
pub trait MessageDecoder: Send + Sync + 'static {
    /// The decoded message type delivered to subscribers
    type Message: Clone + Send + Sync + Debug + 'static;

    /// Decode one frame
    fn decode(&self, frame: &WsMessage) -> Result<Self::Message>;
}

/// Decodes any UTF-8 JSON object into a `serde_json::Value`
///
/// Non-object JSON (arrays, scalars) and binary frames are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl MessageDecoder for JsonDecoder {
    type Message = serde_json::Value;

    fn decode(&self, frame: &WsMessage) -> Result<Self::Message> {
        decode_json_object(frame)
    }
}

/// Parse a text frame as a JSON object
pub fn decode_json_object(frame: &WsMessage) -> Result<serde_json::Value> {
    let text = frame
        .as_text()
        .ok_or_else(|| SocketError::Decode("binary frame".to_string()))?;

    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| SocketError::Decode(e.to_string()))?;

    if !value.is_object() {
        return Err(SocketError::Decode("expected a JSON object".to_string()));
    }

    Ok(value)
}
