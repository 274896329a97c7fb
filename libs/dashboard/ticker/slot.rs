//! A single ticker widget slot
//!
//! Switching a slot to another symbol closes the old socket completely
//! before the new one is opened, so a slot never holds two connections.

use super::stream::TickerStream;
use super::types::TickerState;
use crate::config::TickerConfig;
use pulsesocket::{Connector, Result};
use std::sync::Arc;
use tracing::debug;

pub struct TickerSlot {
    config: TickerConfig,
    connector: Option<Arc<dyn Connector>>,
    current: Option<TickerStream>,
}

impl TickerSlot {
    pub fn new(config: TickerConfig) -> Self {
        Self {
            config,
            connector: None,
            current: None,
        }
    }

    pub fn with_connector(config: TickerConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector: Some(connector),
            current: None,
        }
    }

    /// Show `symbol` in this slot
    ///
    /// No-op if the slot already shows it. On error the slot is left empty.
    pub async fn set_symbol(&mut self, symbol: &str) -> Result<()> {
        let symbol = symbol.trim().to_lowercase();
        if self.symbol() == Some(symbol.as_str()) {
            return Ok(());
        }

        self.clear().await;

        let stream = match &self.connector {
            Some(connector) => {
                TickerStream::start_with_connector(&symbol, &self.config, Arc::clone(connector))?
            }
            None => TickerStream::start(&symbol, &self.config)?,
        };
        self.current = Some(stream);
        Ok(())
    }

    /// Close the current stream, if any
    pub async fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            debug!("Slot releasing {}", previous.symbol());
            previous.close().await;
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        self.current.as_ref().map(TickerStream::symbol)
    }

    pub fn stream(&self) -> Option<&TickerStream> {
        self.current.as_ref()
    }

    pub fn snapshot(&self) -> Option<TickerState> {
        self.current.as_ref().map(TickerStream::snapshot)
    }
}
