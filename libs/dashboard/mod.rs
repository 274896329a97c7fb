//! # Dashboard
//!
//! Real-time layer of the crypto dashboard, built on `pulsesocket`:
//!
//! - **notifications**: the shared notification channel and the panel state
//!   it feeds (newest user events, auto-expiry, live indicator)
//! - **ticker**: one connection per symbol feeding a price/change widget
//! - **config**: YAML + environment configuration
//! - **ui**: ratatui widgets used by the binaries

pub mod config;
pub mod logging;
pub mod notifications;
pub mod ticker;
pub mod ui;

pub use config::{ConfigError, DashboardConfig};
pub use logging::init_tracing;
pub use notifications::{NotificationChannel, NotificationFeed, SharedNotificationFeed};
pub use ticker::{TickerBoard, TickerSlot, TickerState, TickerStream};
