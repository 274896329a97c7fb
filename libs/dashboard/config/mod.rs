//! Dashboard configuration
//!
//! Loaded from YAML (`config/dashboard.yaml` by default), then overridden
//! from the environment (`.env` is honoured):
//!
//! - `WS_URL`: notification endpoint
//! - `TICKER_WS_URL`: ticker stream base URL
//! - `LOG_LEVEL`: log level

use pulsesocket::{ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectionStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub const DEFAULT_NOTIFICATION_URL: &str = "ws://localhost:3000";
pub const DEFAULT_TICKER_BASE_URL: &str = "wss://stream.binance.com:9443";
pub const DEFAULT_STREAM_PATH: &str = "ws";
pub const DEFAULT_SYMBOLS: [&str; 5] = ["btcusdt", "ethusdt", "bnbusdt", "adausdt", "dogeusdt"];

const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub notifications: NotificationConfig,
    pub tickers: TickerConfig,
    pub feed: FeedConfig,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: LogLevel,
}

/// Log level wrapper so the default is `info` under `#[serde(default)]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogLevel(pub String);

impl Default for LogLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Shared notification endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub url: String,
    pub reconnect: ReconnectConfig,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_NOTIFICATION_URL.to_string(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Per-symbol ticker streams
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    /// Scheme, host and port of the stream server
    pub base_url: String,
    /// Path segment between the base URL and the stream name
    pub stream_path: String,
    /// Symbols shown on the board (lowercase, e.g. "btcusdt")
    pub symbols: Vec<String>,
    pub reconnect: ReconnectConfig,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TICKER_BASE_URL.to_string(),
            stream_path: DEFAULT_STREAM_PATH.to_string(),
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Notification panel behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Number of notifications kept on screen
    pub capacity: usize,
    /// Seconds before a notification disappears on its own
    pub ttl_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            ttl_secs: 8,
        }
    }
}

impl FeedConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_secs as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Fixed,
    Exponential,
    Never,
}

/// Retry policy of one connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub strategy: StrategyKind,
    /// Fixed delay, or initial delay for exponential backoff
    pub delay_ms: u64,
    /// Cap for exponential backoff
    pub max_delay_ms: u64,
    /// Retry ceiling; `null` retries forever
    pub max_attempts: Option<usize>,
    pub connect_timeout_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Fixed,
            delay_ms: 3000,
            max_delay_ms: 30_000,
            max_attempts: Some(5),
            connect_timeout_ms: 10_000,
        }
    }
}

impl ReconnectConfig {
    pub fn strategy(&self) -> Box<dyn ReconnectionStrategy> {
        let delay = Duration::from_millis(self.delay_ms);
        match self.strategy {
            StrategyKind::Fixed => Box::new(FixedDelay::new(delay, self.max_attempts)),
            StrategyKind::Exponential => Box::new(ExponentialBackoff::new(
                delay,
                Duration::from_millis(self.max_delay_ms),
                self.max_attempts,
            )),
            StrategyKind::Never => Box::new(NeverReconnect),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    fn validate(&self, section: &str) -> Result<()> {
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{}.reconnect.connect_timeout_ms must be greater than 0",
                section
            )));
        }
        if self.strategy == StrategyKind::Exponential && self.max_delay_ms < self.delay_ms {
            return Err(ConfigError::ValidationError(format!(
                "{}.reconnect.max_delay_ms must be at least delay_ms",
                section
            )));
        }
        Ok(())
    }
}

impl DashboardConfig {
    /// Load configuration from a YAML file, then apply environment overrides
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let config: DashboardConfig = serde_yaml::from_str(&yaml_content)?;
        config.finish()
    }

    /// Like [`load`](Self::load), but a missing file means defaults
    pub fn load_or_default(config_path: impl AsRef<Path>) -> Result<Self> {
        let path = config_path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!("No config file at {}, using defaults", path.display());
            Self::default().finish()
        }
    }

    fn finish(mut self) -> Result<Self> {
        dotenv::dotenv().ok();
        self.apply_overrides(|key| std::env::var(key).ok());
        self.validate()?;
        Ok(self)
    }

    /// Apply `WS_URL`, `TICKER_WS_URL` and `LOG_LEVEL` from a lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("WS_URL") {
            info!("Overriding notification URL from environment variable");
            self.notifications.url = url;
        }
        if let Some(url) = lookup("TICKER_WS_URL") {
            info!("Overriding ticker base URL from environment variable");
            self.tickers.base_url = url;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = LogLevel(level);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        validate_ws_url("notifications.url", &self.notifications.url)?;
        validate_ws_url("tickers.base_url", &self.tickers.base_url)?;

        if self.tickers.symbols.is_empty() {
            return Err(ConfigError::ValidationError(
                "tickers.symbols cannot be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .tickers
            .symbols
            .iter()
            .find(|s| s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return Err(ConfigError::ValidationError(format!(
                "invalid ticker symbol '{}'",
                bad
            )));
        }

        if self.feed.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "feed.capacity must be greater than 0".to_string(),
            ));
        }
        if self.feed.ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "feed.ttl_secs must be greater than 0".to_string(),
            ));
        }

        self.notifications.reconnect.validate("notifications")?;
        self.tickers.reconnect.validate("tickers")?;

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str().to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Notification URL: {}", self.notifications.url);
        info!("  Ticker base URL: {}/{}", self.tickers.base_url, self.tickers.stream_path);
        info!("  Symbols: {}", self.tickers.symbols.join(", "));
        info!(
            "  Feed: {} notifications, {}s expiry",
            self.feed.capacity, self.feed.ttl_secs
        );
        info!("  Log level: {}", self.log_level.as_str());
    }
}

fn validate_ws_url(field: &str, url: &str) -> Result<()> {
    if url.starts_with("ws://") || url.starts_with("wss://") {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{} must start with ws:// or wss://, got '{}'",
            field, url
        )))
    }
}
