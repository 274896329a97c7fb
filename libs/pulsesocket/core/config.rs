use crate::traits::*;
use std::sync::Arc;
use std::time::Duration;

/// Default time allowed for an opening handshake
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration of one connection manager
///
/// Built by [`ManagerBuilder`](crate::core::ManagerBuilder); immutable once
/// the manager exists.
pub struct ManagerConfig<D: MessageDecoder> {
    /// WebSocket URL (wss:// or ws://)
    pub(crate) url: String,

    /// Frame decoder
    pub(crate) decoder: D,

    /// Opens the underlying connection
    pub(crate) connector: Arc<dyn Connector>,

    /// Retry pacing and ceiling
    pub(crate) reconnect_strategy: Box<dyn ReconnectionStrategy>,

    /// An open attempt that takes longer than this counts as failed
    pub(crate) connect_timeout: Duration,
}

impl<D: MessageDecoder> ManagerConfig<D> {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Retry ceiling of the configured strategy
    pub fn max_attempts(&self) -> Option<usize> {
        self.reconnect_strategy.max_attempts()
    }
}

impl<D: MessageDecoder> std::fmt::Debug for ManagerConfig<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("url", &self.url)
            .field("reconnect_strategy", &self.reconnect_strategy)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
