//! Strategy configuration

use crate::notifier::NotifierConfig;
use crate::signals::EvaluatorConfig;
use crate::trend::TrendConfig;
use crate::error::Result;
use std::time::Duration;
use trend_config::service::signals;
use trend_config::ServiceConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    /// Trading pair the candles belong to, e.g. `BTC-USDC`
    pub trading_pair: String,

    /// Candles fetched for an on-demand evaluation
    pub full_window: usize,

    /// Candles fetched by the background poller
    pub lightweight_window: usize,

    /// Time between background checks
    pub poll_interval: Duration,

    pub evaluator: EvaluatorConfig,
    pub trend: TrendConfig,

    /// Webhook delivery; `None` disables notifications
    pub notifier: Option<NotifierConfig>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            trading_pair: "BTC-USDC".to_string(),
            full_window: signals::FULL_WINDOW_CANDLES,
            lightweight_window: signals::LIGHTWEIGHT_WINDOW_CANDLES,
            poll_interval: Duration::from_secs(signals::POLL_INTERVAL_SECS),
            evaluator: EvaluatorConfig::default(),
            trend: TrendConfig::default(),
            notifier: None,
        }
    }
}

impl StrategyConfig {
    /// Build from the layered service configuration
    pub fn from_service(config: &ServiceConfig) -> Result<Self> {
        let settings = &config.signals;

        Ok(Self {
            trading_pair: config.market.trading_pair.clone(),
            full_window: settings.full_window,
            lightweight_window: settings.lightweight_window,
            poll_interval: settings.poll_interval(),
            evaluator: EvaluatorConfig {
                trend_threshold: settings.trend_threshold,
                dip_threshold: settings.dip_threshold,
            },
            trend: TrendConfig {
                trend_cooldown: settings.trend_cooldown(),
                dip_cooldown: settings.dip_cooldown(),
            },
            notifier: NotifierConfig::from_settings(&config.webhook)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_defaults() {
        let mut service = ServiceConfig::default();
        service.finalize();

        let config = StrategyConfig::from_service(&service).unwrap();
        let defaults = StrategyConfig::default();

        assert_eq!(config, defaults);
        assert_eq!(config.trend.trend_cooldown, Duration::from_secs(480));
        assert_eq!(config.trend.dip_cooldown, Duration::from_secs(300));
    }

    #[test]
    fn test_webhook_enables_notifier() {
        let mut service = ServiceConfig::default();
        service.webhook.url = Some("https://hooks.example.com/trend".to_string());
        service.webhook.max_retries = 5;

        let notifier = StrategyConfig::from_service(&service).unwrap().notifier.unwrap();
        assert_eq!(notifier.max_retries, 5);
        assert_eq!(notifier.url.host_str(), Some("hooks.example.com"));
    }
}
