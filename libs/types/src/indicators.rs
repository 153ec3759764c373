//! Indicator snapshot produced by one evaluation cycle

use serde::{Deserialize, Serialize};

/// Technical indicators computed from one candle window.
///
/// `None` means the value has not been computed (early termination) or the
/// window was too short for it. A `Some(0.0)` is a genuine reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub macd: Option<f64>,
    pub signal_line: Option<f64>,
    pub ema12: Option<f64>,
    pub ema26: Option<f64>,
    pub ema200: Option<f64>,
    pub rsi: Option<f64>,
    pub adx: Option<f64>,
    /// Percent change of the close over the lookback window (144 candles)
    pub price_change_pct: Option<f64>,
    pub volume_spike: Option<bool>,
    pub average_volume: Option<f64>,
    pub last_volume: Option<f64>,
    pub current_price: Option<f64>,
}

impl IndicatorSet {
    /// The set returned when the window is too short to compute anything
    pub fn insufficient() -> Self {
        Self::default()
    }

    /// Empty set anchored at the latest close
    pub fn at_price(current_price: f64) -> Self {
        Self {
            current_price: Some(current_price),
            ..Self::default()
        }
    }

    /// True when nothing at all was computed
    pub fn is_insufficient(&self) -> bool {
        *self == Self::default()
    }

    /// MACD, signal line, EMA12, EMA26 and RSI are all present.
    ///
    /// Early termination is only considered once this group has arrived.
    pub fn has_quartet(&self) -> bool {
        self.macd.is_some()
            && self.signal_line.is_some()
            && self.ema12.is_some()
            && self.ema26.is_some()
            && self.rsi.is_some()
    }

    /// Every indicator family has published a value
    pub fn is_complete(&self) -> bool {
        self.has_quartet()
            && self.ema200.is_some()
            && self.adx.is_some()
            && self.price_change_pct.is_some()
            && self.volume_spike.is_some()
            && self.average_volume.is_some()
            && self.last_volume.is_some()
            && self.current_price.is_some()
    }

    /// MACD below its signal line; `None` while either is missing
    pub fn macd_bearish(&self) -> Option<bool> {
        Some(self.macd? < self.signal_line?)
    }

    /// MACD above its signal line; `None` while either is missing
    pub fn macd_bullish(&self) -> Option<bool> {
        Some(self.macd? > self.signal_line?)
    }
}
