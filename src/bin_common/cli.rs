//! CLI utilities for binaries
//!
//! Handles configuration loading and environment variables
//! for all binary executables.

use anyhow::Context;
use dashboard::DashboardConfig;
use std::path::PathBuf;

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Dashboard configuration (config/dashboard.yaml)
    Dashboard,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Dashboard => "config/dashboard.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        match self {
            ConfigType::Dashboard => "DASHBOARD_CONFIG_PATH",
            ConfigType::Custom(_) => "DASHBOARD_CONFIG_PATH",
        }
    }
}

/// Load configuration path from environment or use default
///
/// # Examples
/// ```
/// use crypto_dashboard::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::Dashboard);
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    std::env::var(config_type.env_var_name())
        .unwrap_or_else(|_| config_type.default_path().to_string())
        .into()
}

/// Load the dashboard configuration
///
/// A missing file falls back to defaults; environment overrides apply
/// either way.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let path = load_config_from_env(ConfigType::Dashboard);
    DashboardConfig::load_or_default(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}
