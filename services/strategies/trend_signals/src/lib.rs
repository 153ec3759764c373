//! # Trend Signals Strategy - Weighted Trend-Change Detection
//!
//! ## Purpose
//!
//! Detects bullish/bearish regime changes in a single trading pair from a
//! window of OHLCV candles. Indicators are computed concurrently, scored by a
//! weighted evaluator, gated by a cooldown state machine and, when a change is
//! accepted, pushed to an external webhook.
//!
//! ## Integration Points
//!
//! - **Input Sources**: any [`CandleSource`] (JSON candle files for the binary)
//! - **Output Destinations**: [`SignalDecision`] for callers, GET webhook for
//!   accepted events
//! - **Portfolio**: optional [`PortfolioSource`] sampled into the
//!   [`AssetValueHistory`] on every poll
//! - **Configuration**: [`trend_config`] layered settings
//!
//! ## Architecture Role
//!
//! ```text
//! Candles → [PriceSeries] → [IndicatorEngine] → [Evaluator] → [TrendTracker] → [Notifier]
//!              ↓                  ↓                 ↓               ↓              ↓
//!        close/high/low     8 blocking tasks   bull/bear score   cooldowns     GET + retries
//!        volume arrays      early bearish exit  dip fast path    one lock      exp. backoff
//! ```
//!
//! The on-demand path ([`SignalService::evaluate`] with
//! [`EvaluationWindow::Full`]) and the [`SignalPoller`] share one
//! [`SignalService`] and therefore one trend state.
//!
//! ## Examples
//!
//! ### One-Shot Evaluation
//! ```rust,no_run
//! use std::sync::Arc;
//! use trend_signals::{EvaluationWindow, JsonFileCandleSource, SignalService, StrategyConfig};
//!
//! # async fn run() -> trend_signals::Result<()> {
//! let source = Arc::new(JsonFileCandleSource::new("candles.json"));
//! let service = SignalService::new(StrategyConfig::default(), source)?;
//!
//! let decision = service.evaluate(EvaluationWindow::Full).await?;
//! println!("{} {:?}", decision.label, decision.triggers);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod notifier;
pub mod poller;
pub mod service;
pub mod signals;
pub mod source;
pub mod trend;

pub use config::StrategyConfig;
pub use engine::{Calculator, EngineOutcome, IndicatorEngine, StandardCalculator};
pub use error::{Result, StrategyError};
pub use history::{AssetValueHistory, FixedPortfolio, PortfolioSource};
pub use metrics::StrategyMetrics;
pub use notifier::{
    DeliveryOutcome, HttpWebhookTransport, Notifier, NotifierConfig, NotifyError, WebhookPayload,
    WebhookTransport,
};
pub use poller::SignalPoller;
pub use service::{EvaluationWindow, SignalService};
pub use signals::{Assessment, DipAssessment, Evaluator, EvaluatorConfig};
pub use source::{CandleSource, InMemoryCandleSource, JsonFileCandleSource};
pub use trend::{TrendConfig, TrendTracker};

/// Re-export key domain types
pub use types::{Candle, IndicatorSet, SignalDecision, SignalEvent, SignalKind, TrendLabel, TrendState};
