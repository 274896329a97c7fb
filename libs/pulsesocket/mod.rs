//! # PulseSocket
//!
//! A reconnecting publish/subscribe WebSocket client.
//!
//! ## Features
//!
//! - **At most one connection**: `connect()` is idempotent while connecting or open
//! - **Fan-out**: every decoded message reaches every subscriber exactly once
//! - **Bounded self-healing**: pluggable retry strategy with a ceiling
//! - **Explicit lifetimes**: subscriptions are handles, retries are cancellable
//! - **Status envelopes**: connection changes are broadcast like messages

pub mod traits;
pub mod core;

// Re-export all traits
pub use traits::*;

pub use crate::core::{
    builder, config, connection_state, event, manager, subscribers, tungstenite,
    ConnectionManager, ConnectionState, ConnectionStatus, ManagerBuilder, ManagerConfig, Metrics,
    SocketEvent, StatusEnvelope, Subscription, SubscriptionId, TungsteniteConnector,
};

/// Convenience entry point for the builder
pub use crate::core::builder as manager_builder;
