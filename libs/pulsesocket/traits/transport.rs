use crate::decoder::WsMessage;
use crate::error::Result;
use async_trait::async_trait;

/// Opens duplex connections to an endpoint
///
/// The manager owns every transport it obtains from a connector; nothing
/// else ever sees the socket. Production code uses
/// [`TungsteniteConnector`](crate::core::TungsteniteConnector); tests inject
/// scripted connectors to control open failures and inbound frames.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Perform the opening handshake
    ///
    /// An `Err` is a failed open and is retried according to the
    /// reconnection strategy.
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>>;
}

/// One live duplex connection
#[async_trait]
pub trait Transport: Send {
    /// Receive the next data frame
    ///
    /// * `Some(Ok(frame))` - a text or binary frame
    /// * `Some(Err(e))` - the connection failed
    /// * `None` - the peer closed the connection
    ///
    /// Must be cancellation safe: dropping the future must not lose a frame.
    async fn recv(&mut self) -> Option<Result<WsMessage>>;

    /// Write one data frame
    async fn send(&mut self, message: WsMessage) -> Result<()>;

    /// Close the connection (best effort)
    async fn close(&mut self);
}
