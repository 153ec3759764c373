//! Early termination of the indicator engine on a bearish quartet

mod common;

use common::{crash, rising};
use std::sync::Arc;
use std::time::{Duration, Instant};
use trend_signals::{Calculator, Evaluator, IndicatorEngine, TrendLabel};
use types::PriceSeries;

/// Blocks for `delay` in the ADX and EMA200 families only
struct SlowCalculator {
    delay: Duration,
}

impl Calculator for SlowCalculator {
    fn ema(&self, values: &[f64], period: usize) -> Option<f64> {
        if period == 200 {
            std::thread::sleep(self.delay);
        }
        trend_signals::indicators::ema(values, period)
    }

    fn adx(&self, high: &[f64], low: &[f64]) -> Option<f64> {
        std::thread::sleep(self.delay);
        trend_signals::indicators::adx(high, low, trend_signals::indicators::ADX_PERIOD)
    }
}

fn slow_engine() -> IndicatorEngine {
    IndicatorEngine::with_calculator(
        Evaluator::default(),
        Arc::new(SlowCalculator {
            delay: Duration::from_secs(2),
        }),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_bearish_quartet_returns_before_slow_families() {
    let series = PriceSeries::from_candles(&crash(300, 20));

    let started = Instant::now();
    let outcome = slow_engine().compute(&series).await;
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_secs(1), "took {:?}", elapsed);
    assert!(outcome.early_exit);
    assert!(outcome.indicators.has_quartet());
    assert!(outcome.indicators.adx.is_none());
    assert!(outcome.indicators.ema200.is_none());
    assert!(outcome.indicators.macd_bearish().unwrap());

    let assessment = Evaluator::default().score(&outcome.indicators);
    assert_eq!(assessment.label(), TrendLabel::Bearish);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_non_bearish_quartet_waits_for_every_family() {
    let series = PriceSeries::from_candles(&rising(300));

    let started = Instant::now();
    let outcome = slow_engine().compute(&series).await;

    assert!(started.elapsed() >= Duration::from_secs(2));
    assert!(!outcome.early_exit);
    assert!(outcome.indicators.is_complete());
}
