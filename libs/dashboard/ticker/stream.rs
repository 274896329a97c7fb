//! One live ticker connection

use super::types::{ticker_url, SharedTickerState, TickerDecoder, TickerState, TickerUpdate};
use crate::config::TickerConfig;
use pulsesocket::{
    ConnectionManager, ConnectionState, Connector, Metrics, Result, SocketEvent, Subscription,
};
use std::sync::Arc;
use tracing::{debug, info};

/// A dedicated connection for one symbol, feeding one [`TickerState`]
///
/// The connection is opened on creation. Dropping the stream disconnects
/// it; [`close`](Self::close) also waits for the socket to be closed.
pub struct TickerStream {
    symbol: String,
    manager: ConnectionManager<TickerDecoder>,
    state: SharedTickerState,
    _subscription: Subscription,
}

impl TickerStream {
    /// Connect to the stream of `symbol` over the default transport
    pub fn start(symbol: &str, config: &TickerConfig) -> Result<Self> {
        Self::build(symbol, config, None)
    }

    /// Connect to the stream of `symbol` over a custom transport
    pub fn start_with_connector(
        symbol: &str,
        config: &TickerConfig,
        connector: Arc<dyn Connector>,
    ) -> Result<Self> {
        Self::build(symbol, config, Some(connector))
    }

    fn build(symbol: &str, config: &TickerConfig, connector: Option<Arc<dyn Connector>>) -> Result<Self> {
        let symbol = symbol.trim().to_lowercase();
        let url = ticker_url(&config.base_url, &config.stream_path, &symbol);

        let mut builder = pulsesocket::builder()
            .url(url)
            .decoder(TickerDecoder)
            .boxed_reconnect_strategy(config.reconnect.strategy())
            .connect_timeout(config.reconnect.connect_timeout());
        if let Some(connector) = connector {
            builder = builder.shared_connector(connector);
        }
        let manager = builder.build()?;

        let state = TickerState::new(symbol.clone()).shared();
        let subscription = {
            let state = Arc::clone(&state);
            manager.subscribe(move |event: &SocketEvent<TickerUpdate>| {
                state.write().apply(event);
            })
        };

        info!("Starting ticker stream for {} ({})", symbol, manager.url());
        manager.connect();

        Ok(Self {
            symbol,
            manager,
            state,
            _subscription: subscription,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn url(&self) -> &str {
        self.manager.url()
    }

    pub fn state(&self) -> SharedTickerState {
        Arc::clone(&self.state)
    }

    /// Copy of the current widget state
    pub fn snapshot(&self) -> TickerState {
        self.state.read().clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    pub fn metrics(&self) -> Metrics {
        self.manager.metrics()
    }

    /// Manual reconnect, e.g. after retries were exhausted
    pub fn reconnect(&self) {
        self.manager.connect();
    }

    /// Disconnect and wait until the socket is closed
    pub async fn close(self) {
        debug!("Closing ticker stream for {}", self.symbol);
        self.manager.close().await;
    }
}

impl Drop for TickerStream {
    fn drop(&mut self) {
        self.manager.disconnect();
    }
}

impl std::fmt::Debug for TickerStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickerStream")
            .field("symbol", &self.symbol)
            .field("url", &self.url())
            .field("state", &self.connection_state())
            .finish()
    }
}
