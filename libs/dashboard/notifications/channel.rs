//! Shared notification channel
//!
//! One connection to the notification endpoint, shared by every consumer in
//! the process. Construct it once at startup and hand out clones:
//!
//! ```ignore
//! let channel = NotificationChannel::new(&config.notifications)?;
//!
//! // Each consumer: subscribe, then connect (no-op if already open)
//! let _sub = channel.attach(|event: &SocketEvent<Notification>| {
//!     println!("{:?}", event);
//! });
//! ```

use super::types::{Notification, NotificationDecoder};
use crate::config::NotificationConfig;
use pulsesocket::{
    ConnectionManager, ConnectionState, Connector, Metrics, Result, SocketEvent, Subscriber,
    Subscription,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Process-wide notification connection
///
/// Clones share the same connection and subscriber set.
#[derive(Clone, Debug)]
pub struct NotificationChannel {
    manager: ConnectionManager<NotificationDecoder>,
}

impl NotificationChannel {
    /// Create an idle channel over the default WebSocket transport
    pub fn new(config: &NotificationConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Create an idle channel over a custom transport
    pub fn with_connector(config: &NotificationConfig, connector: Arc<dyn Connector>) -> Result<Self> {
        Self::build(config, Some(connector))
    }

    fn build(config: &NotificationConfig, connector: Option<Arc<dyn Connector>>) -> Result<Self> {
        let mut builder = pulsesocket::builder()
            .url(config.url.clone())
            .decoder(NotificationDecoder)
            .boxed_reconnect_strategy(config.reconnect.strategy())
            .connect_timeout(config.reconnect.connect_timeout());

        if let Some(connector) = connector {
            builder = builder.shared_connector(connector);
        }

        let manager = builder.build()?;
        info!("Notification channel ready for {}", manager.url());
        Ok(Self { manager })
    }

    /// Open the shared connection if it is not already open or opening
    pub fn connect(&self) {
        self.manager.connect();
    }

    pub fn disconnect(&self) {
        self.manager.disconnect();
    }

    /// Disconnect and wait until the socket is closed
    pub async fn close(&self) {
        self.manager.close().await;
    }

    pub fn subscribe<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<Notification>,
    {
        self.manager.subscribe(subscriber)
    }

    pub fn subscribe_channel(
        &self,
    ) -> (Subscription, crossbeam_channel::Receiver<SocketEvent<Notification>>) {
        self.manager.subscribe_channel()
    }

    /// Register a consumer and make sure the connection is up
    ///
    /// The subscriber is registered first, so it sees the `connected` status
    /// of a connection it triggers. Drop the returned handle to detach.
    pub fn attach<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<Notification>,
    {
        let subscription = self.subscribe(subscriber);
        self.connect();
        subscription
    }

    /// Send a JSON payload; `Ok(false)` if the connection is not open
    pub fn send<T: Serialize + ?Sized>(&self, payload: &T) -> Result<bool> {
        self.manager.send(payload)
    }

    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    pub fn metrics(&self) -> Metrics {
        self.manager.metrics()
    }

    pub fn subscriber_count(&self) -> usize {
        self.manager.subscriber_count()
    }

    pub fn manager(&self) -> &ConnectionManager<NotificationDecoder> {
        &self.manager
    }
}
