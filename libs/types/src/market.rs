//! Candle input and the parallel price arrays derived from it

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OHLCV observation over a fixed granularity.
///
/// Supplied by the candle-fetch collaborator in ascending chronological order.
/// Every numeric field may arrive as a decimal string on the wire; `start` is
/// unix seconds, as a string or an integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(with = "unix_seconds")]
    pub start: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Exchange response envelope for a candle request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandlesResponse {
    pub candles: Vec<Candle>,
}

impl CandlesResponse {
    /// Candles sorted oldest first. Exchanges commonly return newest first.
    pub fn into_ascending(mut self) -> Vec<Candle> {
        self.candles.sort_by_key(|c| c.start);
        self.candles
    }
}

/// Four same-length sequences derived 1:1 from a candle window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    pub close: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub volume: Vec<f64>,
}

impl PriceSeries {
    /// Extract close/high/low/volume arrays.
    ///
    /// A decimal that has no `f64` representation becomes `0.0`; the indicator
    /// math guards every division against zero.
    pub fn from_candles(candles: &[Candle]) -> Self {
        let mut series = Self {
            close: Vec::with_capacity(candles.len()),
            high: Vec::with_capacity(candles.len()),
            low: Vec::with_capacity(candles.len()),
            volume: Vec::with_capacity(candles.len()),
        };

        for candle in candles {
            series.close.push(to_f64(candle.close));
            series.high.push(to_f64(candle.high));
            series.low.push(to_f64(candle.low));
            series.volume.push(to_f64(candle.volume));
        }

        series
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Most recent close, if any
    pub fn last_close(&self) -> Option<f64> {
        self.close.last().copied()
    }
}

impl From<&[Candle]> for PriceSeries {
    fn from(candles: &[Candle]) -> Self {
        Self::from_candles(candles)
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Unix-second timestamps that tolerate both `"1700000000"` and `1700000000`
mod unix_seconds {
    use super::*;
    use serde::de::Error as _;
    use serde::{Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSeconds {
        Text(String),
        Number(i64),
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.timestamp().to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let seconds = match RawSeconds::deserialize(deserializer)? {
            RawSeconds::Number(n) => n,
            RawSeconds::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| D::Error::custom(crate::TypesError::InvalidTimestamp { input: text }))?,
        };

        Utc.timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| D::Error::custom(crate::TypesError::InvalidTimestamp { input: seconds.to_string() }))
    }
}
