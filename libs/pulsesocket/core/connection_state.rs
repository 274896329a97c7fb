//! Lock-free connection state and metrics
//!
//! ```text
//!            connect()                 open ok
//!   Idle ───────────────> Connecting ───────────> Open
//!    ^                     ^      │                 │
//!    │ disconnect()        │      │ open failed     │ closed / error
//!    │ (from any state)    │      v                 v
//!    │                     └── PendingRetry <───────┘
//!    │                  delay      │
//!    │                             │ ceiling reached
//!    │                             v
//!    └─────────────────────────  Terminal
//! ```

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Lifecycle state of a connection manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionState {
    /// No socket, not connecting
    Idle = 0,
    /// Opening handshake in progress
    Connecting = 1,
    /// Connected and dispatching
    Open = 2,
    /// Closed, an automatic retry is scheduled
    PendingRetry = 3,
    /// Retry ceiling reached; inert until an explicit `connect()`
    Terminal = 4,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Open,
            3 => ConnectionState::PendingRetry,
            4 => ConnectionState::Terminal,
            _ => ConnectionState::Idle,
        }
    }

    /// A connection exists or is being established
    pub fn is_live(self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Open)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::PendingRetry => "pending-retry",
            ConnectionState::Terminal => "terminal",
        };
        f.write_str(name)
    }
}

/// Atomic wrapper around [`ConnectionState`]
#[derive(Debug)]
pub struct AtomicConnectionState(AtomicU8);

impl AtomicConnectionState {
    pub fn new(state: ConnectionState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    #[inline]
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::Release);
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.get() == ConnectionState::Open
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.get() == ConnectionState::Idle
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.get() == ConnectionState::Terminal
    }
}

/// Atomic counters for one manager
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    messages_received: AtomicU64,
    messages_sent: AtomicU64,
    decode_failures: AtomicU64,
    reconnect_count: AtomicU64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_decode_failures(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reconnects(&self) {
        self.reconnect_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn decode_failures(&self) -> u64 {
        self.decode_failures.load(Ordering::Relaxed)
    }

    pub fn reconnect_count(&self) -> u64 {
        self.reconnect_count.load(Ordering::Relaxed)
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    pub messages_received: u64,
    pub messages_sent: u64,
    pub decode_failures: u64,
    pub reconnect_count: u64,
    pub connection_state: ConnectionState,
}
