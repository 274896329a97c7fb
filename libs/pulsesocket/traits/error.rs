use thiserror::Error;

/// Main error type for pulsesocket
#[derive(Error, Debug)]
pub enum SocketError {
    /// WebSocket transport error (handshake refused, I/O failure, protocol violation)
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Connection closed by the peer or the network
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Inbound frame could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Outbound payload could not be serialized
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Invalid manager configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operation timed out
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Subscriber callback failure
    #[error("Subscriber error: {0}")]
    Subscriber(String),
}

/// Result type for pulsesocket operations
pub type Result<T> = std::result::Result<T, SocketError>;
