//! Production transport over tokio-tungstenite

use crate::traits::{Connector, Result, SocketError, Transport, WsMessage};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens `ws://` and `wss://` connections (native-tls)
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>> {
        let (stream, response) = connect_async(url)
            .await
            .map_err(|e| SocketError::WebSocket(e.to_string()))?;
        debug!("Handshake with {} completed ({})", url, response.status());
        Ok(Box::new(TungsteniteTransport { stream }))
    }
}

struct TungsteniteTransport {
    stream: WsStream,
}

#[async_trait]
impl Transport for TungsteniteTransport {
    async fn recv(&mut self) -> Option<Result<WsMessage>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Close(frame)) => {
                    debug!("Close frame received: {:?}", frame);
                    return None;
                }
                Ok(message) => {
                    // Ping/pong are answered by tungstenite itself
                    if let Some(frame) = tungstenite_to_ws_message(message) {
                        return Some(Ok(frame));
                    }
                }
                Err(e) => return Some(Err(SocketError::WebSocket(e.to_string()))),
            }
        }
    }

    async fn send(&mut self, message: WsMessage) -> Result<()> {
        self.stream
            .send(ws_message_to_tungstenite(message))
            .await
            .map_err(|e| SocketError::WebSocket(e.to_string()))
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!("Close handshake failed: {}", e);
        }
    }
}

/// Convert WsMessage to tungstenite Message
fn ws_message_to_tungstenite(msg: WsMessage) -> Message {
    match msg {
        WsMessage::Text(text) => Message::Text(text),
        WsMessage::Binary(data) => Message::Binary(data),
    }
}

/// Convert tungstenite Message to WsMessage
fn tungstenite_to_ws_message(msg: Message) -> Option<WsMessage> {
    match msg {
        Message::Text(text) => Some(WsMessage::Text(text)),
        Message::Binary(data) => Some(WsMessage::Binary(data)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}
