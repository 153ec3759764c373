//! Technical indicators for trend detection
//!
//! Pure functions over closing, high/low and volume slices. Each returns
//! `None` when the window is too short to produce a meaningful value, so a
//! missing reading can never be confused with a genuine zero.

/// Short EMA period used by MACD
pub const EMA_FAST_PERIOD: usize = 12;
/// Long EMA period used by MACD
pub const EMA_SLOW_PERIOD: usize = 26;
/// MACD signal line period
pub const SIGNAL_PERIOD: usize = 9;
/// Long-term trend EMA
pub const EMA_TREND_PERIOD: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const ADX_PERIOD: usize = 14;
/// 144 five-minute candles, 12 hours
pub const PRICE_CHANGE_LOOKBACK: usize = 144;
/// A volume spike is strictly more than this multiple of the prior average
pub const VOLUME_SPIKE_MULTIPLIER: f64 = 2.0;

/// Neutral RSI reported when there is not enough data
pub const RSI_NEUTRAL: f64 = 50.0;

/// Exponential moving average over the whole slice.
///
/// Seeded with the simple average of the first `period` values, then smoothed
/// with `k = 2 / (period + 1)` over the remainder.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    Some(
        values[period..]
            .iter()
            .fold(seed, |prev, value| value * k + prev * (1.0 - k)),
    )
}

/// MACD line and signal line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdReading {
    pub macd: f64,
    /// `None` when fewer than nine MACD samples exist
    pub signal: Option<f64>,
}

/// MACD (EMA12 - EMA26) with a 9-period EMA signal line.
///
/// The MACD history feeding the signal line recomputes both EMAs over every
/// prefix `close[..=i]` for `i` in `26..len`. That is quadratic in the window
/// length; windows are at most a few hundred candles.
pub fn macd(close: &[f64]) -> Option<MacdReading> {
    if close.len() < EMA_SLOW_PERIOD {
        return None;
    }

    let macd = ema(close, EMA_FAST_PERIOD)? - ema(close, EMA_SLOW_PERIOD)?;

    let history: Vec<f64> = (EMA_SLOW_PERIOD..close.len())
        .filter_map(|i| {
            let window = &close[..=i];
            Some(ema(window, EMA_FAST_PERIOD)? - ema(window, EMA_SLOW_PERIOD)?)
        })
        .collect();

    Some(MacdReading {
        macd,
        signal: ema(&history, SIGNAL_PERIOD),
    })
}

/// Wilder-smoothed RSI.
///
/// Returns [`RSI_NEUTRAL`] when there are not `period + 1` closes. Returns 100
/// as soon as the first `period` deltas hold no loss, before any smoothing, and
/// again if the smoothed average loss ends at zero.
pub fn rsi(close: &[f64], period: usize) -> f64 {
    if period == 0 || close.len() < period + 1 {
        return RSI_NEUTRAL;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..=period {
        let change = close[i] - close[i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    if losses == 0.0 {
        return 100.0;
    }

    let period_f = period as f64;
    let mut avg_gain = gains / period_f;
    let mut avg_loss = losses / period_f;
    let multiplier = 1.0 / period_f;

    for i in (period + 1)..close.len() {
        let change = close[i] - close[i - 1];
        let (gain, loss) = if change > 0.0 { (change, 0.0) } else { (0.0, -change) };
        avg_gain = avg_gain * (1.0 - multiplier) + gain * multiplier;
        avg_loss = avg_loss * (1.0 - multiplier) + loss * multiplier;
    }

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Simplified ADX over a single `period` window.
///
/// Accumulates true range and directional movement over the first `period`
/// bar pairs of the slice (not the most recent ones) and reports the single
/// DX value from that window. No Wilder smoothing of DX is applied.
pub fn adx(high: &[f64], low: &[f64], period: usize) -> Option<f64> {
    let len = high.len().min(low.len());
    if period == 0 || len < period + 1 {
        return None;
    }

    let mut true_range = 0.0;
    let mut plus_dm = 0.0;
    let mut minus_dm = 0.0;

    for i in 1..=period {
        true_range += bar_range(high[i], low[i], high[i - 1], low[i - 1]);

        let up_move = high[i] - high[i - 1];
        let down_move = low[i - 1] - low[i];
        if up_move > down_move && up_move > 0.0 {
            plus_dm += up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm += down_move;
        }
    }

    if true_range == 0.0 {
        return Some(0.0);
    }

    let plus_di = 100.0 * plus_dm / true_range;
    let minus_di = 100.0 * minus_dm / true_range;
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return Some(0.0);
    }

    Some(100.0 * (plus_di - minus_di).abs() / di_sum)
}

/// Largest of the bar's own range and the high-to-high and low-to-low moves
fn bar_range(high: f64, low: f64, prev_high: f64, prev_low: f64) -> f64 {
    let range = high - low;
    let high_move = (high - prev_high).abs();
    let low_move = (low - prev_low).abs();
    range.max(high_move).max(low_move)
}

/// Percent change between the latest close and the close `lookback` candles earlier
pub fn percent_change(close: &[f64], lookback: usize) -> Option<f64> {
    if close.len() < lookback + 1 {
        return None;
    }

    let current = close[close.len() - 1];
    let past = close[close.len() - 1 - lookback];
    if past == 0.0 {
        return None;
    }

    Some((current - past) / past * 100.0)
}

/// Latest volume against the mean of everything before it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeProfile {
    pub spike: bool,
    pub average: f64,
    pub last: f64,
}

/// Volume spike detection: last volume strictly above twice the prior average
pub fn volume_spike(volume: &[f64]) -> Option<VolumeProfile> {
    let (last, prior) = volume.split_last()?;
    if prior.is_empty() {
        return None;
    }

    let average = prior.iter().sum::<f64>() / prior.len() as f64;

    Some(VolumeProfile {
        spike: *last > average * VOLUME_SPIKE_MULTIPLIER,
        average,
        last: *last,
    })
}
