//! Service Configuration Module
//!
//! Provides configuration loading for the trend signal services.
//! Supports built-in defaults, an optional TOML file and environment overrides.

use crate::service::{market, signals, webhook};
use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Main service configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ServiceConfig {
    pub global: GlobalConfig,
    pub market: MarketConfig,
    pub signals: SignalSettings,
    pub webhook: WebhookSettings,
}

/// Global configuration settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GlobalConfig {
    pub log_level: String,
    pub json_logs: bool,
}

/// Market being watched and where its candles come from
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MarketConfig {
    pub base_currency: String,
    pub quote_currency: String,
    /// Defaults to `BASE-QUOTE` when empty
    pub trading_pair: String,
    /// Candle file consumed by the file-backed candle source
    pub candles_path: Option<PathBuf>,
}

/// Evaluation windows, cooldowns and score thresholds
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SignalSettings {
    pub poll_interval_secs: u64,
    pub full_window: usize,
    pub lightweight_window: usize,
    pub trend_cooldown_secs: u64,
    pub dip_cooldown_secs: u64,
    pub trend_threshold: f64,
    pub dip_threshold: f64,
}

/// Outbound webhook notification settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebhookSettings {
    /// Notifications are disabled when unset
    pub url: Option<String>,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub backoff_base_ms: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_currency: market::DEFAULT_BASE_CURRENCY.to_string(),
            quote_currency: market::DEFAULT_QUOTE_CURRENCY.to_string(),
            trading_pair: String::new(),
            candles_path: None,
        }
    }
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: signals::POLL_INTERVAL_SECS,
            full_window: signals::FULL_WINDOW_CANDLES,
            lightweight_window: signals::LIGHTWEIGHT_WINDOW_CANDLES,
            trend_cooldown_secs: signals::TREND_COOLDOWN_SECS,
            dip_cooldown_secs: signals::DIP_COOLDOWN_SECS,
            trend_threshold: signals::TREND_SCORE_THRESHOLD,
            dip_threshold: signals::DIP_SCORE_THRESHOLD,
        }
    }
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_retries: webhook::DEFAULT_MAX_RETRIES,
            timeout_secs: webhook::DEFAULT_TIMEOUT_SECS,
            backoff_base_ms: webhook::BACKOFF_BASE_MS,
        }
    }
}

impl SignalSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn trend_cooldown(&self) -> Duration {
        Duration::from_secs(self.trend_cooldown_secs)
    }

    pub fn dip_cooldown(&self) -> Duration {
        Duration::from_secs(self.dip_cooldown_secs)
    }
}

impl WebhookSettings {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    /// Replace out-of-range values with defaults
    pub fn normalize(&mut self) {
        if self.max_retries > webhook::MAX_RETRIES_LIMIT {
            warn!(
                max_retries = self.max_retries,
                limit = webhook::MAX_RETRIES_LIMIT,
                "Webhook max_retries out of range, using default"
            );
            self.max_retries = webhook::DEFAULT_MAX_RETRIES;
        }

        if !(webhook::MIN_TIMEOUT_SECS..=webhook::MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            warn!(
                timeout_secs = self.timeout_secs,
                "Webhook timeout out of range, using default"
            );
            self.timeout_secs = webhook::DEFAULT_TIMEOUT_SECS;
        }

        if self.url.as_deref().map(str::trim).is_some_and(str::is_empty) {
            self.url = None;
        }
    }
}

impl ServiceConfig {
    /// Load configuration from defaults, an optional file and `TREND__*` variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&ServiceConfig::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = path {
            info!("Loading config file: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        // Override with environment variables (TREND__WEBHOOK__MAX_RETRIES etc.)
        builder = builder.add_source(
            Environment::with_prefix("TREND")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Apply the flat variable names used by earlier deployments
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("WEBHOOK_URL") {
            self.webhook.url = Some(url);
        }

        if let Some(raw) = lookup("WEBHOOK_MAX_RETRIES") {
            match raw.trim().parse::<u32>() {
                Ok(retries) => self.webhook.max_retries = retries,
                Err(_) => {
                    warn!(value = %raw, "Invalid WEBHOOK_MAX_RETRIES, using default");
                    self.webhook.max_retries = webhook::DEFAULT_MAX_RETRIES;
                }
            }
        }

        if let Some(raw) = lookup("WEBHOOK_TIMEOUT_SECONDS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.webhook.timeout_secs = secs,
                Err(_) => {
                    warn!(value = %raw, "Invalid WEBHOOK_TIMEOUT_SECONDS, using default");
                    self.webhook.timeout_secs = webhook::DEFAULT_TIMEOUT_SECS;
                }
            }
        }

        if let Some(pair) = lookup("TRADING_PAIR") {
            self.market.trading_pair = pair;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            self.global.log_level = level;
        }
    }

    /// Expand environment variables in string values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        if let Some(url) = &self.webhook.url {
            let expanded = shellexpand::env(url).context("Failed to expand webhook URL")?;
            self.webhook.url = Some(expanded.to_string());
        }

        if let Some(path) = &self.market.candles_path {
            let raw = path.to_string_lossy();
            let expanded = shellexpand::env(&raw).context("Failed to expand candles path")?;
            self.market.candles_path = Some(PathBuf::from(expanded.as_ref()));
        }

        Ok(())
    }

    /// Derive the trading pair and normalize ranges
    pub fn finalize(&mut self) {
        self.market.base_currency = self.market.base_currency.to_uppercase();
        self.market.quote_currency = self.market.quote_currency.to_uppercase();

        if self.market.trading_pair.trim().is_empty() {
            self.market.trading_pair =
                format!("{}-{}", self.market.base_currency, self.market.quote_currency);
        }
        self.market.trading_pair = self.market.trading_pair.to_uppercase();

        self.webhook.normalize();
    }
}

/// Convenience function to load configuration with all overrides applied
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let mut config = ServiceConfig::load(path)?;
    config.apply_legacy_env(|name| std::env::var(name).ok());
    config.expand_env_vars()?;
    config.finalize();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_file_over_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("trend.toml");

        let config_content = r#"
[global]
log_level = "debug"

[market]
trading_pair = "eth-usdc"

[webhook]
url = "https://hooks.example.com/trend"
max_retries = 5
"#;

        fs::write(&config_path, config_content).unwrap();

        let mut config = ServiceConfig::load(Some(&config_path)).unwrap();
        config.finalize();

        assert_eq!(config.global.log_level, "debug");
        assert_eq!(config.market.trading_pair, "ETH-USDC");
        assert_eq!(config.webhook.url.as_deref(), Some("https://hooks.example.com/trend"));
        assert_eq!(config.webhook.max_retries, 5);
        // Untouched sections keep their defaults
        assert_eq!(config.webhook.timeout_secs, webhook::DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.signals.trend_cooldown_secs, 480);
        assert_eq!(config.signals.lightweight_window, 145);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(ServiceConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_trading_pair_derived_from_currencies() {
        let mut config = ServiceConfig::default();
        config.market.base_currency = "sol".to_string();
        config.finalize();
        assert_eq!(config.market.trading_pair, "SOL-USDC");
    }

    #[test]
    fn test_legacy_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("WEBHOOK_URL", "https://n8n.local/webhook"),
            ("WEBHOOK_MAX_RETRIES", "0"),
            ("WEBHOOK_TIMEOUT_SECONDS", "12"),
            ("LOG_LEVEL", "DEBUG"),
        ]
        .into_iter()
        .collect();

        let mut config = ServiceConfig::default();
        config.apply_legacy_env(|name| vars.get(name).map(|v| v.to_string()));
        config.finalize();

        assert_eq!(config.webhook.url.as_deref(), Some("https://n8n.local/webhook"));
        assert_eq!(config.webhook.max_retries, 0);
        assert_eq!(config.webhook.timeout_secs, 12);
        assert_eq!(config.global.log_level, "DEBUG");
    }

    #[test]
    fn test_invalid_webhook_values_fall_back() {
        let vars: HashMap<&str, &str> = [
            ("WEBHOOK_MAX_RETRIES", "many"),
            ("WEBHOOK_TIMEOUT_SECONDS", "-3"),
        ]
        .into_iter()
        .collect();

        let mut config = ServiceConfig::default();
        config.webhook.max_retries = 7;
        config.apply_legacy_env(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.webhook.max_retries, webhook::DEFAULT_MAX_RETRIES);
        assert_eq!(config.webhook.timeout_secs, webhook::DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_out_of_range_values_normalized() {
        let mut settings = WebhookSettings {
            url: Some("   ".to_string()),
            max_retries: 11,
            timeout_secs: 31,
            backoff_base_ms: 1_000,
        };
        settings.normalize();

        assert_eq!(settings.max_retries, webhook::DEFAULT_MAX_RETRIES);
        assert_eq!(settings.timeout_secs, webhook::DEFAULT_TIMEOUT_SECS);
        assert!(settings.url.is_none());

        let mut edge = WebhookSettings {
            url: None,
            max_retries: 10,
            timeout_secs: 30,
            backoff_base_ms: 1_000,
        };
        edge.normalize();
        assert_eq!(edge.max_retries, 10);
        assert_eq!(edge.timeout_secs, 30);
    }
}
