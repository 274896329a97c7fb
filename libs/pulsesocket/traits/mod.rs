//! # PulseSocket Traits
//!
//! The seams of the connection manager:
//!
//! - **Connector / Transport**: open and drive one duplex connection
//! - **MessageDecoder**: turn raw frames into typed messages
//! - **Subscriber**: receive fanned-out events
//! - **ReconnectionStrategy**: bound and pace automatic retries

pub mod decoder;
pub mod error;
pub mod reconnect;
pub mod subscriber;
pub mod transport;

pub use decoder::{decode_json_object, JsonDecoder, MessageDecoder, WsMessage};
pub use error::{Result, SocketError};
pub use reconnect::{ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectionStrategy};
pub use subscriber::Subscriber;
pub use transport::{Connector, Transport};
