//! Crypto Dashboard - Main Library
//!
//! Terminal front end for the real-time dashboard: live user notifications
//! and per-symbol price tickers over reconnecting WebSocket connections.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runners)
//! - **dashboard**: Notification and ticker logic (re-exported from workspace)
//! - **pulsesocket**: WebSocket connection manager (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use crypto_dashboard::bin_common::{load_config_from_env, ConfigType};
//! use crypto_dashboard::dashboard::TickerBoard;
//! ```

// Re-export workspace libraries for convenience
pub use dashboard;
pub use pulsesocket;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config_from_env, load_dashboard_config, parse_args, ConfigType};
    pub use runner::{BinaryRunner, RunConfig, ShutdownManager};
}
