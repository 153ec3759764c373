//! Concurrent indicator computation with early termination
//!
//! Every indicator family runs on its own blocking task and publishes one
//! update into a bounded channel. The aggregator merges updates as they
//! arrive. As soon as MACD, the signal line, both short EMAs and RSI are all
//! present it scores that group; a decisive bearish reading cancels the
//! remaining work and returns the partial set immediately.

use crate::indicators::{self, MacdReading, VolumeProfile};
use crate::signals::Evaluator;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace};
use types::{IndicatorSet, PriceSeries, TrendLabel};

/// Candles required before any indicator is attempted
pub const MIN_CANDLES: usize = 50;

/// Indicator computations, overridable per family.
///
/// The defaults call the functions in [`crate::indicators`]; tests swap in
/// slow implementations to exercise cancellation.
pub trait Calculator: Send + Sync + 'static {
    fn macd(&self, close: &[f64]) -> Option<MacdReading> {
        indicators::macd(close)
    }

    fn ema(&self, values: &[f64], period: usize) -> Option<f64> {
        indicators::ema(values, period)
    }

    fn rsi(&self, close: &[f64]) -> f64 {
        indicators::rsi(close, indicators::RSI_PERIOD)
    }

    fn adx(&self, high: &[f64], low: &[f64]) -> Option<f64> {
        indicators::adx(high, low, indicators::ADX_PERIOD)
    }

    fn percent_change(&self, close: &[f64]) -> Option<f64> {
        indicators::percent_change(close, indicators::PRICE_CHANGE_LOOKBACK)
    }

    fn volume(&self, volume: &[f64]) -> Option<VolumeProfile> {
        indicators::volume_spike(volume)
    }
}

/// Plain indicator math
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCalculator;

impl Calculator for StandardCalculator {}

/// Unit of concurrent work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorFamily {
    Macd,
    Ema12,
    Ema26,
    Ema200,
    Rsi,
    Adx,
    PriceChange,
    Volume,
}

impl IndicatorFamily {
    pub const ALL: [IndicatorFamily; 8] = [
        IndicatorFamily::Macd,
        IndicatorFamily::Ema12,
        IndicatorFamily::Ema26,
        IndicatorFamily::Ema200,
        IndicatorFamily::Rsi,
        IndicatorFamily::Adx,
        IndicatorFamily::PriceChange,
        IndicatorFamily::Volume,
    ];

    /// Families that must arrive before early termination is considered
    pub const QUARTET: [IndicatorFamily; 4] = [
        IndicatorFamily::Macd,
        IndicatorFamily::Ema12,
        IndicatorFamily::Ema26,
        IndicatorFamily::Rsi,
    ];

    fn bit(self) -> u8 {
        1 << self as u8
    }

    fn compute(self, calculator: &dyn Calculator, series: &PriceSeries) -> IndicatorUpdate {
        match self {
            IndicatorFamily::Macd => IndicatorUpdate::Macd(calculator.macd(&series.close)),
            IndicatorFamily::Ema12 => {
                IndicatorUpdate::Ema12(calculator.ema(&series.close, indicators::EMA_FAST_PERIOD))
            }
            IndicatorFamily::Ema26 => {
                IndicatorUpdate::Ema26(calculator.ema(&series.close, indicators::EMA_SLOW_PERIOD))
            }
            IndicatorFamily::Ema200 => {
                IndicatorUpdate::Ema200(calculator.ema(&series.close, indicators::EMA_TREND_PERIOD))
            }
            IndicatorFamily::Rsi => IndicatorUpdate::Rsi(calculator.rsi(&series.close)),
            IndicatorFamily::Adx => IndicatorUpdate::Adx(calculator.adx(&series.high, &series.low)),
            IndicatorFamily::PriceChange => {
                IndicatorUpdate::PriceChange(calculator.percent_change(&series.close))
            }
            IndicatorFamily::Volume => IndicatorUpdate::Volume(calculator.volume(&series.volume)),
        }
    }
}

/// One family's result, published exactly once
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorUpdate {
    Macd(Option<MacdReading>),
    Ema12(Option<f64>),
    Ema26(Option<f64>),
    Ema200(Option<f64>),
    Rsi(f64),
    Adx(Option<f64>),
    PriceChange(Option<f64>),
    Volume(Option<VolumeProfile>),
}

impl IndicatorUpdate {
    pub fn family(&self) -> IndicatorFamily {
        match self {
            IndicatorUpdate::Macd(_) => IndicatorFamily::Macd,
            IndicatorUpdate::Ema12(_) => IndicatorFamily::Ema12,
            IndicatorUpdate::Ema26(_) => IndicatorFamily::Ema26,
            IndicatorUpdate::Ema200(_) => IndicatorFamily::Ema200,
            IndicatorUpdate::Rsi(_) => IndicatorFamily::Rsi,
            IndicatorUpdate::Adx(_) => IndicatorFamily::Adx,
            IndicatorUpdate::PriceChange(_) => IndicatorFamily::PriceChange,
            IndicatorUpdate::Volume(_) => IndicatorFamily::Volume,
        }
    }

    /// Merge into the aggregate set
    pub fn apply(self, set: &mut IndicatorSet) {
        match self {
            IndicatorUpdate::Macd(reading) => {
                set.macd = reading.map(|r| r.macd);
                set.signal_line = reading.and_then(|r| r.signal);
            }
            IndicatorUpdate::Ema12(value) => set.ema12 = value,
            IndicatorUpdate::Ema26(value) => set.ema26 = value,
            IndicatorUpdate::Ema200(value) => set.ema200 = value,
            IndicatorUpdate::Rsi(value) => set.rsi = Some(value),
            IndicatorUpdate::Adx(value) => set.adx = value,
            IndicatorUpdate::PriceChange(value) => set.price_change_pct = value,
            IndicatorUpdate::Volume(profile) => {
                set.volume_spike = profile.map(|p| p.spike);
                set.average_volume = profile.map(|p| p.average);
                set.last_volume = profile.map(|p| p.last);
            }
        }
    }
}

/// Set of families that have reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Arrivals(u8);

impl Arrivals {
    fn insert(&mut self, family: IndicatorFamily) {
        self.0 |= family.bit();
    }

    fn contains_all(&self, families: &[IndicatorFamily]) -> bool {
        families.iter().all(|f| self.0 & f.bit() != 0)
    }

    fn count(&self) -> u32 {
        self.0.count_ones()
    }
}

/// Result of one engine run
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutcome {
    pub indicators: IndicatorSet,
    /// The run stopped before every family reported
    pub early_exit: bool,
}

/// Fans indicator families out onto blocking tasks and merges their results
#[derive(Clone)]
pub struct IndicatorEngine {
    calculator: Arc<dyn Calculator>,
    evaluator: Evaluator,
}

impl IndicatorEngine {
    pub fn new(evaluator: Evaluator) -> Self {
        Self::with_calculator(evaluator, Arc::new(StandardCalculator))
    }

    pub fn with_calculator(evaluator: Evaluator, calculator: Arc<dyn Calculator>) -> Self {
        Self {
            calculator,
            evaluator,
        }
    }

    /// Compute the indicator set for `series`.
    ///
    /// Returns the all-absent set when the window holds fewer than
    /// [`MIN_CANDLES`] candles. Workers still running after an early exit
    /// observe the cancel flag and drop their result.
    pub async fn compute(&self, series: &PriceSeries) -> EngineOutcome {
        let Some(current_price) = series.last_close().filter(|_| series.len() >= MIN_CANDLES)
        else {
            debug!("Insufficient candles for indicators: {}", series.len());
            return EngineOutcome {
                indicators: IndicatorSet::insufficient(),
                early_exit: false,
            };
        };

        let series = Arc::new(series.clone());
        let (cancel_tx, cancel_rx) = watch::channel(false);
        // One slot per family so no worker ever waits on a send
        let (update_tx, mut update_rx) = mpsc::channel(IndicatorFamily::ALL.len());

        for family in IndicatorFamily::ALL {
            let calculator = Arc::clone(&self.calculator);
            let series = Arc::clone(&series);
            let cancelled = cancel_rx.clone();
            let update_tx = update_tx.clone();

            tokio::task::spawn_blocking(move || {
                if *cancelled.borrow() {
                    trace!(?family, "Skipping cancelled indicator");
                    return;
                }

                let update = family.compute(calculator.as_ref(), &series);

                if *cancelled.borrow() {
                    trace!(?family, "Discarding late indicator");
                    return;
                }
                if update_tx.try_send(update).is_err() {
                    trace!(?family, "Aggregator gone, dropping indicator");
                }
            });
        }
        drop(update_tx);

        let mut indicators = IndicatorSet::at_price(current_price);
        let mut arrivals = Arrivals::default();
        let mut quartet_checked = false;

        while let Some(update) = update_rx.recv().await {
            arrivals.insert(update.family());
            update.apply(&mut indicators);

            let pending = IndicatorFamily::ALL.len() as u32 - arrivals.count();
            if quartet_checked || pending == 0 || !arrivals.contains_all(&IndicatorFamily::QUARTET) {
                continue;
            }
            // A quartet family that reported no value leaves nothing to decide on
            if !indicators.has_quartet() {
                quartet_checked = true;
                continue;
            }
            quartet_checked = true;

            // Decide on the quartet alone so arrival order of the rest cannot matter
            let label = self.evaluator.score(&quartet_view(&indicators)).label();
            if label == TrendLabel::Bearish {
                cancel_tx.send_replace(true);
                debug!(
                    pending,
                    "Decisive bearish reading, cancelling remaining indicators"
                );
                return EngineOutcome {
                    indicators,
                    early_exit: true,
                };
            }
        }

        EngineOutcome {
            indicators,
            early_exit: false,
        }
    }
}

/// MACD, signal line, EMA12, EMA26, RSI and the current price only
fn quartet_view(set: &IndicatorSet) -> IndicatorSet {
    IndicatorSet {
        macd: set.macd,
        signal_line: set.signal_line,
        ema12: set.ema12,
        ema26: set.ema26,
        rsi: set.rsi,
        current_price: set.current_price,
        ..IndicatorSet::default()
    }
}
