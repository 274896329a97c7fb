pub mod states;

use crate::core::config::{ManagerConfig, DEFAULT_CONNECT_TIMEOUT};
use crate::core::manager::ConnectionManager;
use crate::core::tungstenite::TungsteniteConnector;
use crate::traits::*;
use states::*;
use std::sync::Arc;
use std::time::Duration;

/// Type-state builder for [`ConnectionManager`]
///
/// URL and decoder are required; everything else has a default:
/// - connector: [`TungsteniteConnector`]
/// - reconnect strategy: [`FixedDelay::default`] (3 s, 5 attempts)
/// - connect timeout: 10 s
///
/// ```ignore
/// let manager = pulsesocket::builder()
///     .url("ws://localhost:3000")
///     .decoder(JsonDecoder)
///     .reconnect_strategy(FixedDelay::new(Duration::from_secs(3), Some(5)))
///     .build()?;
/// manager.connect();
/// ```
pub struct ManagerBuilder<U, S, D>
where
    U: UrlState,
    S: DecoderState,
{
    _state: TypeState<U, S>,
    url: Option<String>,
    decoder: Option<D>,
    connector: Option<Arc<dyn Connector>>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
    connect_timeout: Duration,
}

impl ManagerBuilder<NoUrl, NoDecoder, ()> {
    pub fn new() -> Self {
        Self {
            _state: TypeState::new(),
            url: None,
            decoder: None,
            connector: None,
            reconnect_strategy: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl Default for ManagerBuilder<NoUrl, NoDecoder, ()> {
    fn default() -> Self {
        Self::new()
    }
}

// URL setting
impl<S, D> ManagerBuilder<NoUrl, S, D>
where
    S: DecoderState,
{
    pub fn url(self, url: impl Into<String>) -> ManagerBuilder<HasUrl, S, D> {
        ManagerBuilder {
            _state: TypeState::new(),
            url: Some(url.into()),
            decoder: self.decoder,
            connector: self.connector,
            reconnect_strategy: self.reconnect_strategy,
            connect_timeout: self.connect_timeout,
        }
    }
}

// Decoder setting
impl<U> ManagerBuilder<U, NoDecoder, ()>
where
    U: UrlState,
{
    pub fn decoder<NewD>(self, decoder: NewD) -> ManagerBuilder<U, HasDecoder, NewD>
    where
        NewD: MessageDecoder,
    {
        ManagerBuilder {
            _state: TypeState::new(),
            url: self.url,
            decoder: Some(decoder),
            connector: self.connector,
            reconnect_strategy: self.reconnect_strategy,
            connect_timeout: self.connect_timeout,
        }
    }
}

// Optional settings, available in every state
impl<U, S, D> ManagerBuilder<U, S, D>
where
    U: UrlState,
    S: DecoderState,
{
    /// Replace the transport (tests, custom TLS, proxies)
    pub fn connector<C: Connector>(mut self, connector: C) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Share an existing connector between managers
    pub fn shared_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn reconnect_strategy<R: ReconnectionStrategy>(mut self, strategy: R) -> Self {
        self.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    pub fn boxed_reconnect_strategy(mut self, strategy: Box<dyn ReconnectionStrategy>) -> Self {
        self.reconnect_strategy = Some(strategy);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl<D> ManagerBuilder<HasUrl, HasDecoder, D>
where
    D: MessageDecoder,
{
    /// Validate the configuration and create an idle manager
    ///
    /// Does not open a connection; call [`ConnectionManager::connect`].
    pub fn build(self) -> Result<ConnectionManager<D>> {
        let url = self
            .url
            .ok_or_else(|| SocketError::Configuration("URL is required".into()))?;
        let decoder = self
            .decoder
            .ok_or_else(|| SocketError::Configuration("Decoder is required".into()))?;

        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(SocketError::Configuration(format!(
                "URL must start with ws:// or wss://, got '{}'",
                url
            )));
        }

        if self.connect_timeout.is_zero() {
            return Err(SocketError::Configuration(
                "connect timeout must be greater than zero".into(),
            ));
        }

        let config = ManagerConfig {
            url,
            decoder,
            connector: self
                .connector
                .unwrap_or_else(|| Arc::new(TungsteniteConnector)),
            reconnect_strategy: self
                .reconnect_strategy
                .unwrap_or_else(|| Box::new(FixedDelay::default())),
            connect_timeout: self.connect_timeout,
        };

        Ok(ConnectionManager::new(config))
    }
}
