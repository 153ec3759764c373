//! Background signal poller
//!
//! Announces the current regime once, checks immediately, then checks again
//! on a fixed interval. A slow check delays the next tick instead of causing
//! a burst of catch-up ticks.

use crate::history::PortfolioSource;
use crate::notifier::{DeliveryOutcome, WebhookPayload};
use crate::service::{EvaluationWindow, SignalService};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

pub struct SignalPoller {
    service: Arc<SignalService>,
    portfolio: Option<Arc<dyn PortfolioSource>>,
    interval: Duration,
}

impl SignalPoller {
    pub fn new(service: Arc<SignalService>) -> Self {
        let interval = service.config().poll_interval;
        Self {
            service,
            portfolio: None,
            interval,
        }
    }

    /// Record an account value before every check
    pub fn with_portfolio(mut self, portfolio: Arc<dyn PortfolioSource>) -> Self {
        self.portfolio = Some(portfolio);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Starting signal poller (interval {:?}, pair {})",
            self.interval,
            self.service.config().trading_pair
        );

        self.send_startup_baseline().await;

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // The first tick completes immediately
                _ = ticker.tick() => self.check().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Signal poller stopped");
    }

    /// Evaluate the lightweight window and announce the resulting regime
    pub async fn send_startup_baseline(&self) -> Option<DeliveryOutcome> {
        let decision = match self.service.evaluate(EvaluationWindow::Lightweight).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!("Startup baseline evaluation failed: {}", e);
                return None;
            }
        };

        let current_trend = self.service.trend_state().label;
        info!("Startup baseline: trend {}", current_trend);

        let payload = WebhookPayload::Startup {
            current_trend,
            triggers: decision.triggers,
            timestamp: Utc::now(),
        };

        match self.service.notify(payload)?.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Startup webhook task failed: {}", e);
                None
            }
        }
    }

    /// One poll cycle; failures are logged and the poller keeps going
    pub async fn check(&self) {
        if let Some(portfolio) = &self.portfolio {
            if let Err(e) = self.service.track_asset_value(portfolio.as_ref()).await {
                warn!("Failed to track asset value: {}", e);
            }
        }

        match self.service.evaluate(EvaluationWindow::Lightweight).await {
            Ok(decision) => match &decision.event {
                Some(event) => info!(
                    "Signal emitted: {} {:?} (triggers: {:?})",
                    event.label, event.kind, event.triggers
                ),
                None => debug!(
                    "No signal: label {}, bearish {}",
                    decision.label, decision.bearish_signal
                ),
            },
            Err(e) => error!("Signal check failed: {}", e),
        }
    }
}
