//! Per-symbol price streaming

pub mod board;
pub mod slot;
pub mod stream;
pub mod types;

pub use board::TickerBoard;
pub use slot::TickerSlot;
pub use stream::TickerStream;
pub use types::{
    format_change, format_price, ticker_url, AssetInfo, SharedTickerState, TickerDecoder,
    TickerState, TickerUpdate, Trend,
};
