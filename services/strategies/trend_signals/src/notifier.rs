//! Webhook notification with bounded retries
//!
//! Events are encoded as query parameters on a GET request. Each attempt is
//! bounded by a timeout; failures back off exponentially (`base * 2^attempt`)
//! until `max_retries` retries are exhausted, after which the event is logged
//! and dropped.

use crate::error::{Result, StrategyError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use trend_config::WebhookSettings;
use types::{SignalEvent, TrendLabel};
use url::Url;

/// Failure of a single delivery attempt
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("Webhook responded with status {0}")]
    Status(u16),

    #[error("Attempt timed out after {0:?}")]
    Timeout(Duration),
}

/// Outbound side of the notifier
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Issue one GET request carrying `query`
    async fn send(&self, url: &Url, query: &[(&'static str, String)]) -> std::result::Result<(), NotifyError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpWebhookTransport {
    client: reqwest::Client,
}

impl HttpWebhookTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| StrategyError::Configuration {
                message: format!("Failed to create webhook HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookTransport for HttpWebhookTransport {
    async fn send(&self, url: &Url, query: &[(&'static str, String)]) -> std::result::Result<(), NotifyError> {
        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(NotifyError::Status(status.as_u16()));
        }

        Ok(())
    }
}

/// What gets delivered
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookPayload {
    /// An accepted trend change or immediate dip
    Signal(SignalEvent),
    /// Current regime announced once at startup
    Startup {
        current_trend: TrendLabel,
        triggers: Vec<String>,
        timestamp: DateTime<Utc>,
    },
}

impl WebhookPayload {
    /// Query parameters for the GET request
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            WebhookPayload::Signal(event) => vec![
                ("signal", "true".to_string()),
                ("bearish", event.is_bearish().to_string()),
                ("triggers", event.triggers.join(",")),
                ("timestamp", event.timestamp.timestamp().to_string()),
            ],
            WebhookPayload::Startup {
                current_trend,
                triggers,
                timestamp,
            } => {
                let mut pairs = vec![
                    ("startup", "true".to_string()),
                    ("baseline", "true".to_string()),
                    ("current_trend", current_trend.to_string()),
                    ("timestamp", timestamp.timestamp().to_string()),
                ];
                if !triggers.is_empty() {
                    pairs.push(("triggers", triggers.join(",")));
                }
                pairs.push(("bearish", (*current_trend == TrendLabel::Bearish).to_string()));
                pairs
            }
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            WebhookPayload::Signal(_) => "signal",
            WebhookPayload::Startup { .. } => "startup",
        }
    }
}

/// Final result of a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { attempts: u32 },
    Failed { attempts: u32 },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            DeliveryOutcome::Delivered { attempts } | DeliveryOutcome::Failed { attempts } => *attempts,
        }
    }
}

/// Retry policy and destination
#[derive(Debug, Clone, PartialEq)]
pub struct NotifierConfig {
    pub url: Url,
    /// Retries after the first attempt
    pub max_retries: u32,
    pub attempt_timeout: Duration,
    pub backoff_base: Duration,
}

impl NotifierConfig {
    /// `None` when no webhook URL is configured
    pub fn from_settings(settings: &WebhookSettings) -> Result<Option<Self>> {
        let Some(raw) = settings.url.as_deref() else {
            return Ok(None);
        };

        let url = Url::parse(raw).map_err(|e| StrategyError::Configuration {
            message: format!("Invalid webhook URL '{}': {}", raw, e),
        })?;

        Ok(Some(Self {
            url,
            max_retries: settings.max_retries,
            attempt_timeout: settings.attempt_timeout(),
            backoff_base: settings.backoff_base(),
        }))
    }

    /// Delay after failed attempt `attempt` (zero based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(2_u32.saturating_pow(attempt))
    }
}

/// Delivers payloads to the configured webhook
pub struct Notifier {
    config: NotifierConfig,
    transport: Arc<dyn WebhookTransport>,
}

impl Notifier {
    pub fn new(config: NotifierConfig) -> Result<Self> {
        let transport = HttpWebhookTransport::new(config.attempt_timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: NotifierConfig, transport: Arc<dyn WebhookTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Try up to `max_retries + 1` times, sleeping between failures
    pub async fn deliver(&self, payload: &WebhookPayload) -> DeliveryOutcome {
        let query = payload.query_pairs();
        let total = self.config.max_retries + 1;

        for attempt in 0..total {
            let result = tokio::time::timeout(
                self.config.attempt_timeout,
                self.transport.send(&self.config.url, &query),
            )
            .await
            .unwrap_or(Err(NotifyError::Timeout(self.config.attempt_timeout)));

            match result {
                Ok(()) => {
                    info!(
                        "Webhook {} delivered (attempt {}/{})",
                        payload.describe(),
                        attempt + 1,
                        total
                    );
                    return DeliveryOutcome::Delivered {
                        attempts: attempt + 1,
                    };
                }
                Err(e) if attempt + 1 < total => {
                    let delay = self.config.backoff_delay(attempt);
                    warn!(
                        "Webhook {} attempt {}/{} failed: {}, retrying in {:?}",
                        payload.describe(),
                        attempt + 1,
                        total,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(
                        "Webhook {} failed after {} attempts: {}",
                        payload.describe(),
                        total,
                        e
                    );
                }
            }
        }

        DeliveryOutcome::Failed { attempts: total }
    }

    /// Deliver in the background; the caller never waits on the webhook
    pub fn dispatch(self: &Arc<Self>, payload: WebhookPayload) -> JoinHandle<DeliveryOutcome> {
        let notifier = Arc::clone(self);
        debug!("Dispatching webhook {}", payload.describe());
        tokio::spawn(async move { notifier.deliver(&payload).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use types::SignalKind;

    fn config() -> NotifierConfig {
        NotifierConfig {
            url: Url::parse("http://localhost:9/hook").unwrap(),
            max_retries: 3,
            attempt_timeout: Duration::from_secs(5),
            backoff_base: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let config = config();
        assert_eq!(config.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(config.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(4));
    }

    #[test]
    fn test_signal_query_pairs() {
        let event = SignalEvent::new(
            TrendLabel::Bearish,
            SignalKind::TrendChange,
            vec!["MACD_BEARISH_CROSSOVER".into(), "RSI_OVERSOLD".into()],
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        )
        .unwrap();

        let pairs = WebhookPayload::Signal(event).query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("signal", "true".to_string()),
                ("bearish", "true".to_string()),
                ("triggers", "MACD_BEARISH_CROSSOVER,RSI_OVERSOLD".to_string()),
                ("timestamp", "1700000000".to_string()),
            ]
        );
    }

    #[test]
    fn test_startup_query_pairs() {
        let payload = WebhookPayload::Startup {
            current_trend: TrendLabel::Neutral,
            triggers: vec![],
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };

        let pairs = payload.query_pairs();
        assert!(pairs.contains(&("startup", "true".to_string())));
        assert!(pairs.contains(&("baseline", "true".to_string())));
        assert!(pairs.contains(&("current_trend", "neutral".to_string())));
        assert!(pairs.contains(&("bearish", "false".to_string())));
        assert!(!pairs.iter().any(|(key, _)| *key == "triggers"));
    }

    #[test]
    fn test_missing_url_disables_notifier() {
        let settings = WebhookSettings::default();
        assert!(NotifierConfig::from_settings(&settings).unwrap().is_none());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let settings = WebhookSettings {
            url: Some("not a url".to_string()),
            ..WebhookSettings::default()
        };
        assert!(NotifierConfig::from_settings(&settings).is_err());
    }
}
