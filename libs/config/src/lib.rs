//! # Trend Signal Configuration
//!
//! Centralized configuration management and default constants for the trend
//! signal services.
//!
//! ## Features
//!
//! - **Service Defaults**: Windows, cooldowns, thresholds and webhook retry policy
//! - **Layered Loading**: Built-in defaults, an optional TOML file, then `TREND__*`
//!   environment variables and the legacy `WEBHOOK_*` / `TRADING_PAIR` / `LOG_LEVEL`
//!   variables
//! - **Range Validation**: Out-of-range webhook settings fall back to defaults
//!
//! ## Usage
//!
//! ```rust,no_run
//! use trend_config::{load_config, service};
//!
//! let config = load_config(None).unwrap();
//! assert!(config.webhook.max_retries <= service::webhook::MAX_RETRIES_LIMIT);
//! ```

pub mod service;
pub mod service_config;

// Re-export commonly used types
pub use service_config::{
    load_config, GlobalConfig, MarketConfig, ServiceConfig, SignalSettings, WebhookSettings,
};
