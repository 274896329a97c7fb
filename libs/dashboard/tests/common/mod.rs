//! Common test utilities for dashboard integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use pulsesocket::{Connector, Result, SocketError, Transport, WsMessage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// Server side of one in-memory connection
pub struct Peer {
    pub url: String,
    to_client: mpsc::UnboundedSender<Option<WsMessage>>,
    from_client: Mutex<mpsc::UnboundedReceiver<WsMessage>>,
    closed: Arc<AtomicBool>,
}

impl Peer {
    pub fn push_text(&self, text: &str) {
        let _ = self.to_client.send(Some(WsMessage::Text(text.to_string())));
    }

    /// Close from the server side
    pub fn hang_up(&self) {
        let _ = self.to_client.send(None);
    }

    /// Whether the client closed this connection
    pub fn is_closed_by_client(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<WsMessage> {
        let mut rx = self.from_client.lock();
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

struct LoopbackTransport {
    url: String,
    inbound: mpsc::UnboundedReceiver<Option<WsMessage>>,
    outbound: mpsc::UnboundedSender<WsMessage>,
    closed: Arc<AtomicBool>,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn recv(&mut self) -> Option<Result<WsMessage>> {
        self.inbound.recv().await.flatten().map(Ok)
    }

    async fn send(&mut self, message: WsMessage) -> Result<()> {
        self.outbound
            .send(message)
            .map_err(|_| SocketError::ConnectionClosed("peer dropped".into()))
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        self.log.lock().push(format!("close {}", self.url));
    }
}

/// Accepts every connection in memory and records opens and closes
#[derive(Clone, Default)]
pub struct LoopbackConnector {
    log: Arc<Mutex<Vec<String>>>,
    peers: Arc<Mutex<Vec<Arc<Peer>>>>,
    refuse: Arc<AtomicBool>,
}

impl LoopbackConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> Arc<dyn Connector> {
        Arc::new(self.clone())
    }

    /// Refuse (or accept again) all further connections
    pub fn set_refusing(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// "open <url>" / "close <url>" entries in order
    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn peers(&self) -> Vec<Arc<Peer>> {
        self.peers.lock().clone()
    }

    /// Most recent peer whose URL contains `pattern`
    pub fn peer(&self, pattern: &str) -> Option<Arc<Peer>> {
        self.peers
            .lock()
            .iter()
            .rev()
            .find(|peer| peer.url.contains(pattern))
            .cloned()
    }

    pub fn open_count(&self) -> usize {
        self.log.lock().iter().filter(|e| e.starts_with("open ")).count()
    }
}

#[async_trait]
impl Connector for LoopbackConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(SocketError::WebSocket(format!("connection refused: {}", url)));
        }

        let (to_client, inbound) = mpsc::unbounded_channel();
        let (outbound, from_client) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        self.log.lock().push(format!("open {}", url));
        self.peers.lock().push(Arc::new(Peer {
            url: url.to_string(),
            to_client,
            from_client: Mutex::new(from_client),
            closed: Arc::clone(&closed),
        }));

        Ok(Box::new(LoopbackTransport {
            url: url.to_string(),
            inbound,
            outbound,
            closed,
            log: Arc::clone(&self.log),
        }))
    }
}

/// Poll `condition` until it holds (panics after 30s)
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 30s"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
