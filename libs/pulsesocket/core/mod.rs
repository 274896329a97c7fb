//! # PulseSocket Core
//!
//! The connection lifecycle manager and everything it is built from.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pulsesocket::{JsonDecoder, SocketEvent};
//!
//! #[tokio::main]
//! async fn main() -> pulsesocket::Result<()> {
//!     let manager = pulsesocket::builder()
//!         .url("ws://localhost:3000")
//!         .decoder(JsonDecoder)
//!         .build()?;
//!
//!     let _sub = manager.subscribe(|event: &SocketEvent<serde_json::Value>| {
//!         println!("Event: {:?}", event);
//!     });
//!
//!     manager.connect();
//!     manager.send(&serde_json::json!({"type": "ping"}))?;
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     manager.close().await;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config;
pub mod connection_state;
pub mod event;
pub mod manager;
pub mod subscribers;
pub mod tungstenite;

pub use builder::{states, ManagerBuilder};
pub use config::{ManagerConfig, DEFAULT_CONNECT_TIMEOUT};
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState, Metrics};
pub use event::{ConnectionStatus, SocketEvent, StatusEnvelope, STATUS_ENVELOPE_TYPE};
pub use manager::ConnectionManager;
pub use subscribers::{SubscriberRegistry, Subscription, SubscriptionId};
pub use tungstenite::TungsteniteConnector;

/// Create a new connection manager builder
pub fn builder() -> ManagerBuilder<states::NoUrl, states::NoDecoder, ()> {
    ManagerBuilder::new()
}
