//! Signal service: one evaluation cycle end to end
//!
//! fetch candles → [`PriceSeries`] → [`IndicatorEngine`] → [`Evaluator`] →
//! [`TrendTracker`] → optional webhook dispatch. The on-demand path and the
//! background poller both go through [`SignalService::evaluate`] and share the
//! same tracker.

use crate::config::StrategyConfig;
use crate::engine::{Calculator, IndicatorEngine};
use crate::error::Result;
use crate::history::{AssetValueHistory, PortfolioSource};
use crate::metrics::{MetricsCollector, StrategyMetrics};
use crate::notifier::{DeliveryOutcome, Notifier, WebhookPayload};
use crate::signals::Evaluator;
use crate::source::CandleSource;
use crate::trend::TrendTracker;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use types::{AccountValue, Candle, PriceSeries, SignalDecision, TrendLabel, TrendState};

/// How many candles an evaluation looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationWindow {
    /// On-demand evaluation, long enough for EMA200
    Full,
    /// Background poller
    Lightweight,
}

/// Shared pipeline state
pub struct SignalService {
    config: StrategyConfig,
    source: Arc<dyn CandleSource>,
    engine: IndicatorEngine,
    evaluator: Evaluator,
    tracker: TrendTracker,
    notifier: Option<Arc<Notifier>>,
    history: AssetValueHistory,
    metrics: Arc<MetricsCollector>,
}

impl SignalService {
    /// Build with the HTTP notifier when a webhook URL is configured
    pub fn new(config: StrategyConfig, source: Arc<dyn CandleSource>) -> Result<Self> {
        let notifier = match &config.notifier {
            Some(notifier_config) => Some(Arc::new(Notifier::new(notifier_config.clone())?)),
            None => None,
        };

        Ok(Self::with_notifier(config, source, notifier))
    }

    pub fn with_notifier(
        config: StrategyConfig,
        source: Arc<dyn CandleSource>,
        notifier: Option<Arc<Notifier>>,
    ) -> Self {
        let evaluator = Evaluator::new(config.evaluator);

        Self {
            engine: IndicatorEngine::new(evaluator),
            evaluator,
            tracker: TrendTracker::new(config.trend),
            notifier,
            source,
            history: AssetValueHistory::default(),
            metrics: Arc::new(MetricsCollector::new()),
            config,
        }
    }

    /// Swap the indicator math, e.g. for instrumented or slow calculators
    pub fn with_calculator(mut self, calculator: Arc<dyn Calculator>) -> Self {
        self.engine = IndicatorEngine::with_calculator(self.evaluator, calculator);
        self
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn trend_state(&self) -> TrendState {
        self.tracker.snapshot()
    }

    pub fn history(&self) -> &AssetValueHistory {
        &self.history
    }

    pub fn metrics(&self) -> StrategyMetrics {
        self.metrics.get_metrics()
    }

    pub fn notifier(&self) -> Option<&Arc<Notifier>> {
        self.notifier.as_ref()
    }

    fn window_len(&self, window: EvaluationWindow) -> usize {
        match window {
            EvaluationWindow::Full => self.config.full_window,
            EvaluationWindow::Lightweight => self.config.lightweight_window,
        }
    }

    /// Fetch the window and run one cycle now
    pub async fn evaluate(&self, window: EvaluationWindow) -> Result<SignalDecision> {
        let (decision, _) = self.evaluate_at(window, Utc::now()).await?;
        Ok(decision)
    }

    /// Fetch the window and run one cycle at `now`.
    ///
    /// Also returns the handle of the webhook delivery when an event was sent.
    pub async fn evaluate_at(
        &self,
        window: EvaluationWindow,
        now: DateTime<Utc>,
    ) -> Result<(SignalDecision, Option<JoinHandle<DeliveryOutcome>>)> {
        let count = self.window_len(window);
        let candles = match self.source.recent(count).await {
            Ok(candles) => candles,
            Err(e) => {
                self.metrics.increment_errors();
                return Err(e);
            }
        };

        debug!("Evaluating {:?} window: {} candles", window, candles.len());
        Ok(self.evaluate_candles(&candles, now).await)
    }

    /// Run one cycle over already-fetched candles
    pub async fn evaluate_candles(
        &self,
        candles: &[Candle],
        now: DateTime<Utc>,
    ) -> (SignalDecision, Option<JoinHandle<DeliveryOutcome>>) {
        self.metrics.increment_evaluations();

        let series = PriceSeries::from_candles(candles);
        let outcome = self.engine.compute(&series).await;
        if outcome.early_exit {
            self.metrics.increment_early_exits();
        }

        if outcome.indicators.is_insufficient() {
            self.metrics.increment_insufficient();
            warn!(
                "Insufficient data: {} candles, trend state untouched",
                series.len()
            );
            return (
                SignalDecision {
                    bearish_signal: false,
                    label: TrendLabel::Neutral,
                    triggers: Vec::new(),
                    timestamp: now.timestamp(),
                    indicators: outcome.indicators,
                    event: None,
                },
                None,
            );
        }

        let assessment = self.evaluator.score(&outcome.indicators);
        let dip = self.evaluator.dip_score(&outcome.indicators);
        let event = self.tracker.observe(&assessment, &dip, now);

        let label = assessment.label();
        debug!(
            bearish = assessment.bearish.score,
            bullish = assessment.bullish.score,
            dip = dip.score(),
            "Scored {} (early exit: {})",
            label,
            outcome.early_exit
        );

        let delivery = event.as_ref().and_then(|event| {
            self.metrics.increment_events();
            self.notify(WebhookPayload::Signal(event.clone()))
        });

        let triggers = match &event {
            Some(event) => event.triggers.clone(),
            None => assessment.triggers(),
        };
        let bearish_signal =
            label == TrendLabel::Bearish || event.as_ref().is_some_and(|e| e.is_bearish());

        (
            SignalDecision {
                bearish_signal,
                label,
                triggers,
                timestamp: now.timestamp(),
                indicators: outcome.indicators,
                event,
            },
            delivery,
        )
    }

    /// Deliver in the background if a notifier is configured
    pub fn notify(&self, payload: WebhookPayload) -> Option<JoinHandle<DeliveryOutcome>> {
        let Some(notifier) = &self.notifier else {
            debug!("No webhook configured, skipping notification");
            return None;
        };

        let notifier = Arc::clone(notifier);
        let metrics = Arc::clone(&self.metrics);
        Some(tokio::spawn(async move {
            let outcome = notifier.deliver(&payload).await;
            if !outcome.is_delivered() {
                metrics.increment_failed_deliveries();
            }
            outcome
        }))
    }

    /// Value the portfolio at the latest close and append it to the history
    pub async fn track_asset_value(&self, portfolio: &dyn PortfolioSource) -> Result<AccountValue> {
        let (base, quote) = match portfolio.balances().await {
            Ok(balances) => balances,
            Err(e) => {
                self.metrics.increment_errors();
                return Err(e);
            }
        };

        let price = self
            .source
            .recent(1)
            .await?
            .last()
            .and_then(|candle| candle.close.to_f64())
            .unwrap_or(0.0);

        let value = AccountValue::at_price(Utc::now(), base, quote, price);
        self.history.record(value);
        info!(
            "Asset value {:.2} ({} base @ {:.2} + {:.2} quote)",
            value.total_quote, base, price, quote
        );

        Ok(value)
    }
}
