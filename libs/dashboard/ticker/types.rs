//! Ticker message types and presentation state
//!
//! Each symbol has its own stream at `<base>/<stream_path>/<symbol>@ticker`.
//! Only two fields of the 24h ticker payload are used:
//!
//! ```json
//! { "e": "24hrTicker", "s": "BTCUSDT", "c": "65000.50", "P": "-1.23", ... }
//! ```
//!
//! `c` is the last price and `P` the 24h change in percent, both decimal
//! strings.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use pulsesocket::{decode_json_object, MessageDecoder, Result, SocketError, SocketEvent, WsMessage};
use serde_json::Value;
use std::sync::Arc;

/// Shared state written by the stream subscriber and read by renderers
pub type SharedTickerState = Arc<RwLock<TickerState>>;

/// Build the stream URL for one symbol
pub fn ticker_url(base_url: &str, stream_path: &str, symbol: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = stream_path.trim_matches('/');
    let stream = format!("{}@ticker", symbol.to_lowercase());

    if path.is_empty() {
        format!("{}/{}", base, stream)
    } else {
        format!("{}/{}/{}", base, path, stream)
    }
}

// =============================================================================
// TickerUpdate / TickerDecoder
// =============================================================================

/// Price and 24h change carried by one ticker frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickerUpdate {
    pub price: f64,
    pub change_percent: f64,
}

/// Decodes `c` and `P`; frames missing either field are rejected
#[derive(Debug, Clone, Copy, Default)]
pub struct TickerDecoder;

impl MessageDecoder for TickerDecoder {
    type Message = TickerUpdate;

    fn decode(&self, frame: &WsMessage) -> Result<Self::Message> {
        let value = decode_json_object(frame)?;
        Ok(TickerUpdate {
            price: decimal_field(&value, "c")?,
            change_percent: decimal_field(&value, "P")?,
        })
    }
}

/// Read a decimal that may arrive as a string or a JSON number
fn decimal_field(value: &Value, key: &str) -> Result<f64> {
    let parsed = match value.get(key) {
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| SocketError::Decode(format!("field '{}' missing or not a decimal", key)))
}

// =============================================================================
// Trend / AssetInfo
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Up,
    Down,
    /// Unchanged, or no data yet
    Flat,
}

impl Trend {
    pub fn from_change(change_percent: Option<f64>) -> Self {
        match change_percent {
            Some(change) if change > 0.0 => Trend::Up,
            Some(change) if change < 0.0 => Trend::Down,
            _ => Trend::Flat,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Flat => "•",
        }
    }
}

/// Display metadata for a trading pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    /// Short label, e.g. "BTC" for "btcusdt"
    pub label: String,
    pub name: &'static str,
    pub icon: &'static str,
}

impl AssetInfo {
    pub fn for_symbol(symbol: &str) -> Self {
        let (name, icon) = match symbol.to_lowercase().as_str() {
            "btcusdt" => ("Bitcoin", "₿"),
            "ethusdt" => ("Ethereum", "Ξ"),
            "bnbusdt" => ("BNB", "🔸"),
            "adausdt" => ("Cardano", "₳"),
            "dogeusdt" => ("Dogecoin", "Ð"),
            _ => ("Crypto", "🪙"),
        };

        Self {
            label: symbol.to_uppercase().replace("USDT", ""),
            name,
            icon,
        }
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Two decimals with thousands separators: `65000.5` -> `"65,000.50"`
pub fn format_price(price: f64) -> String {
    let fixed = format!("{:.2}", price.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let is_zero = integer.chars().all(|c| c == '0') && fraction.chars().all(|c| c == '0');
    let sign = if price < 0.0 && !is_zero { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

/// Signed percentage with two decimals: `-1.234` -> `"-1.23%"`
pub fn format_change(change_percent: f64) -> String {
    format!("{:+.2}%", change_percent)
}

// =============================================================================
// TickerState
// =============================================================================

/// What one ticker widget shows
///
/// Price and change keep their last good values: decode failures never
/// reach this state, and status changes only flip `connected`.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerState {
    symbol: String,
    price: Option<f64>,
    change_percent: Option<f64>,
    connected: bool,
    updates: u64,
    last_update: Option<DateTime<Utc>>,
}

impl TickerState {
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol: String = symbol.into();
        Self {
            symbol: symbol.to_lowercase(),
            price: None,
            change_percent: None,
            connected: false,
            updates: 0,
            last_update: None,
        }
    }

    pub fn shared(self) -> SharedTickerState {
        Arc::new(RwLock::new(self))
    }

    pub fn apply(&mut self, event: &SocketEvent<TickerUpdate>) {
        match event {
            SocketEvent::Status(status) => self.connected = status.is_connected(),
            SocketEvent::Message(update) => self.update(*update, Utc::now()),
        }
    }

    pub fn update(&mut self, update: TickerUpdate, at: DateTime<Utc>) {
        self.price = Some(update.price);
        self.change_percent = Some(update.change_percent);
        self.updates += 1;
        self.last_update = Some(at);
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn change_percent(&self) -> Option<f64> {
        self.change_percent
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn update_count(&self) -> u64 {
        self.updates
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn trend(&self) -> Trend {
        Trend::from_change(self.change_percent)
    }

    /// `"0.00"` until the first update
    pub fn formatted_price(&self) -> String {
        format_price(self.price.unwrap_or(0.0))
    }

    pub fn formatted_change(&self) -> String {
        format_change(self.change_percent.unwrap_or(0.0))
    }

    pub fn asset(&self) -> AssetInfo {
        AssetInfo::for_symbol(&self.symbol)
    }
}
