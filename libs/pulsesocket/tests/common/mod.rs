//! Common test utilities for PulseSocket integration tests
//!
//! - `ScriptedConnector`: in-memory transports with scripted open outcomes
//! - `MockWsServer`: a real WebSocket server on localhost

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use pulsesocket::{Connector, Result, SocketError, SocketEvent, Transport, WsMessage};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Notify};

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

// =============================================================================
// Scripted connector
// =============================================================================

/// Outcome of one open attempt
pub enum Plan {
    /// Handshake fails
    Refuse,
    /// Handshake never completes
    Hang,
    /// Handshake succeeds; the test drives the connection through the peer
    Accept(PeerEnd),
}

/// Frames the fake server pushes to the client
enum ServerFrame {
    Data(WsMessage),
    Error(String),
    Close,
}

/// Test side of an accepted connection
pub struct Peer {
    to_client: mpsc::UnboundedSender<ServerFrame>,
    from_client: Mutex<mpsc::UnboundedReceiver<WsMessage>>,
}

/// Client side handed to the manager
pub struct PeerEnd {
    inbound: mpsc::UnboundedReceiver<ServerFrame>,
    outbound: mpsc::UnboundedSender<WsMessage>,
}

/// Create a connected peer pair
pub fn peer() -> (Peer, Plan) {
    let (to_client, inbound) = mpsc::unbounded_channel();
    let (outbound, from_client) = mpsc::unbounded_channel();
    (
        Peer {
            to_client,
            from_client: Mutex::new(from_client),
        },
        Plan::Accept(PeerEnd { inbound, outbound }),
    )
}

impl Peer {
    pub fn push_text(&self, text: &str) {
        let _ = self.to_client.send(ServerFrame::Data(WsMessage::Text(text.to_string())));
    }

    pub fn push_binary(&self, data: Vec<u8>) {
        let _ = self.to_client.send(ServerFrame::Data(WsMessage::Binary(data)));
    }

    pub fn fail(&self, reason: &str) {
        let _ = self.to_client.send(ServerFrame::Error(reason.to_string()));
    }

    pub fn close(&self) {
        let _ = self.to_client.send(ServerFrame::Close);
    }

    /// Frames the client has written so far
    pub fn sent(&self) -> Vec<WsMessage> {
        let mut rx = self.from_client.lock();
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

struct ScriptedTransport {
    end: PeerEnd,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn recv(&mut self) -> Option<Result<WsMessage>> {
        match self.end.inbound.recv().await {
            Some(ServerFrame::Data(frame)) => Some(Ok(frame)),
            Some(ServerFrame::Error(reason)) => Some(Err(SocketError::WebSocket(reason))),
            Some(ServerFrame::Close) | None => None,
        }
    }

    async fn send(&mut self, message: WsMessage) -> Result<()> {
        self.end
            .outbound
            .send(message)
            .map_err(|_| SocketError::ConnectionClosed("peer dropped".into()))
    }

    async fn close(&mut self) {
        self.end.inbound.close();
    }
}

/// Connector that plays back a script of open outcomes
///
/// Once the script is exhausted every further attempt is refused.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    plans: Arc<Mutex<VecDeque<Plan>>>,
    attempts: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    pub fn new(plans: impl IntoIterator<Item = Plan>) -> Self {
        Self {
            plans: Arc::new(Mutex::new(plans.into_iter().collect())),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn push(&self, plan: Plan) {
        self.plans.lock().push_back(plan);
    }

    /// Number of transports requested so far
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let plan = self.plans.lock().pop_front();

        match plan {
            Some(Plan::Accept(end)) => Ok(Box::new(ScriptedTransport { end })),
            Some(Plan::Hang) => std::future::pending().await,
            Some(Plan::Refuse) | None => Err(SocketError::WebSocket(format!(
                "connection refused: {}",
                url
            ))),
        }
    }
}

// =============================================================================
// Event collection
// =============================================================================

/// Subscriber that forwards events into a tokio channel
pub fn collector<M: Clone + Send + Sync + 'static>() -> (
    impl Fn(&SocketEvent<M>) + Send + Sync + 'static,
    mpsc::UnboundedReceiver<SocketEvent<M>>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let forward = move |event: &SocketEvent<M>| {
        let _ = tx.send(event.clone());
    };
    (forward, rx)
}

/// Wait for the next event (panics after 60s of virtual or real time)
pub async fn next_event<M>(rx: &mut mpsc::UnboundedReceiver<SocketEvent<M>>) -> SocketEvent<M> {
    tokio::time::timeout(Duration::from_secs(60), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

// =============================================================================
// Mock WebSocket server
// =============================================================================

/// A real WebSocket server for end-to-end tests
///
/// Sends `greeting` (if any) to every client right after the handshake,
/// then echoes text and binary frames.
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    connections: Arc<AtomicUsize>,
}

impl MockWsServer {
    pub async fn start(greeting: Option<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let connections = Arc::new(AtomicUsize::new(0));

        let shutdown_clone = Arc::clone(&shutdown);
        let connections_clone = Arc::clone(&connections);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                connections_clone.fetch_add(1, Ordering::SeqCst);
                                let shutdown = Arc::clone(&shutdown_clone);
                                let greeting = greeting.clone();
                                tokio::spawn(async move {
                                    Self::handle_connection(stream, greeting, shutdown).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => break,
                }
            }
        });

        Self {
            addr,
            shutdown,
            connections,
        }
    }

    async fn handle_connection(
        stream: tokio::net::TcpStream,
        greeting: Option<String>,
        shutdown: Arc<Notify>,
    ) {
        use futures::{SinkExt, StreamExt};
        use tokio_tungstenite::accept_async;
        use tokio_tungstenite::tungstenite::Message;

        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        if let Some(text) = greeting {
            if write.send(Message::Text(text)).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(msg)) => {
                            if msg.is_text() || msg.is_binary() {
                                if write.send(msg).await.is_err() {
                                    break;
                                }
                            } else if msg.is_close() {
                                break;
                            }
                        }
                        Some(Err(_)) | None => break,
                    }
                }
                _ = shutdown.notified() => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Number of accepted TCP connections
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
