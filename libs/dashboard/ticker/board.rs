//! Supervisor over many ticker streams

use super::stream::TickerStream;
use super::types::TickerState;
use crate::config::TickerConfig;
use parking_lot::RwLock;
use pulsesocket::{ConnectionState, Connector, Result, SocketError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Board key for a user-supplied symbol
fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_lowercase()
}

/// Set of ticker streams keyed by symbol
///
/// Symbols keep the order in which they were added, which is the order
/// snapshots are returned in.
pub struct TickerBoard {
    config: TickerConfig,
    connector: Option<Arc<dyn Connector>>,
    streams: RwLock<HashMap<String, TickerStream>>,
    order: RwLock<Vec<String>>,
}

impl TickerBoard {
    pub fn new(config: TickerConfig) -> Self {
        Self {
            config,
            connector: None,
            streams: RwLock::new(HashMap::new()),
            order: RwLock::new(Vec::new()),
        }
    }

    pub fn with_connector(config: TickerConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            connector: Some(connector),
            ..Self::new(config)
        }
    }

    /// Start streams for every configured symbol
    ///
    /// Stops at the first symbol that cannot be started.
    pub fn start_configured(&self) -> Result<()> {
        for symbol in self.config.symbols.clone() {
            self.add(&symbol)?;
        }
        Ok(())
    }

    /// Start streaming a symbol; error if it is already on the board
    pub fn add(&self, symbol: &str) -> Result<()> {
        let symbol = normalize_symbol(symbol);
        let mut streams = self.streams.write();

        if streams.contains_key(&symbol) {
            return Err(SocketError::Configuration(format!(
                "Ticker '{}' already exists",
                symbol
            )));
        }

        let stream = match &self.connector {
            Some(connector) => {
                TickerStream::start_with_connector(&symbol, &self.config, Arc::clone(connector))?
            }
            None => TickerStream::start(&symbol, &self.config)?,
        };

        streams.insert(symbol.clone(), stream);
        self.order.write().push(symbol.clone());
        info!("Added ticker '{}'", symbol);
        Ok(())
    }

    /// Stop streaming a symbol and wait for its socket to close
    pub async fn remove(&self, symbol: &str) -> Result<()> {
        let symbol = normalize_symbol(symbol);
        let stream = self
            .streams
            .write()
            .remove(&symbol)
            .ok_or_else(|| SocketError::Configuration(format!("Ticker '{}' not found", symbol)))?;
        self.order.write().retain(|s| s != &symbol);

        stream.close().await;
        info!("Removed ticker '{}'", symbol);
        Ok(())
    }

    pub fn has(&self, symbol: &str) -> bool {
        self.streams.read().contains_key(&normalize_symbol(symbol))
    }

    pub fn symbols(&self) -> Vec<String> {
        self.order.read().clone()
    }

    pub fn len(&self) -> usize {
        self.streams.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.read().is_empty()
    }

    pub fn snapshot(&self, symbol: &str) -> Option<TickerState> {
        self.streams
            .read()
            .get(&normalize_symbol(symbol))
            .map(TickerStream::snapshot)
    }

    /// Snapshots of every ticker in board order
    pub fn snapshots(&self) -> Vec<TickerState> {
        let streams = self.streams.read();
        self.order
            .read()
            .iter()
            .filter_map(|symbol| streams.get(symbol).map(TickerStream::snapshot))
            .collect()
    }

    pub fn statuses(&self) -> HashMap<String, ConnectionState> {
        self.streams
            .read()
            .iter()
            .map(|(symbol, stream)| (symbol.clone(), stream.connection_state()))
            .collect()
    }

    pub fn connected_count(&self) -> usize {
        self.streams
            .read()
            .values()
            .filter(|stream| stream.is_connected())
            .count()
    }

    /// Manually reconnect every stream that gave up
    pub fn reconnect_terminal(&self) -> usize {
        let streams = self.streams.read();
        let mut restarted = 0;
        for stream in streams.values() {
            if stream.connection_state() == ConnectionState::Terminal {
                debug!("Reconnecting ticker '{}'", stream.symbol());
                stream.reconnect();
                restarted += 1;
            }
        }
        restarted
    }

    /// Close every stream
    pub async fn shutdown(&self) {
        info!("Shutting down ticker board");

        let streams = {
            let mut streams = self.streams.write();
            std::mem::take(&mut *streams)
        };
        self.order.write().clear();

        for (symbol, stream) in streams {
            debug!("Closing ticker '{}'", symbol);
            stream.close().await;
        }

        info!("Ticker board shutdown complete");
    }
}
