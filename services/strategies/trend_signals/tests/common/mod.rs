//! Candle builders shared by the integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use trend_signals::Candle;

pub const GRANULARITY_SECS: i64 = 300;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn minutes(m: i64) -> Duration {
    Duration::minutes(m)
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap().round_dp(8)
}

/// Ascending candles with a ±0.2% high/low band around each close
pub fn candles_from_closes(closes: &[f64], volumes: &[f64]) -> Vec<Candle> {
    assert_eq!(closes.len(), volumes.len());
    let start = t0().timestamp() - GRANULARITY_SECS * closes.len() as i64;

    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| Candle {
            start: Utc
                .timestamp_opt(start + GRANULARITY_SECS * i as i64, 0)
                .unwrap(),
            open: decimal(close),
            high: decimal(close * 1.002),
            low: decimal(close * 0.998),
            close: decimal(close),
            volume: decimal(volume),
        })
        .collect()
}

/// +1% per candle from 100
pub fn rising(count: usize) -> Vec<Candle> {
    let closes: Vec<f64> = (0..count).map(|i| 100.0 * 1.01_f64.powi(i as i32)).collect();
    candles_from_closes(&closes, &vec![10.0; count])
}

/// -1% per candle from 300
pub fn falling(count: usize) -> Vec<Candle> {
    let closes: Vec<f64> = (0..count).map(|i| 300.0 * 0.99_f64.powi(i as i32)).collect();
    candles_from_closes(&closes, &vec![10.0; count])
}

/// Flat at 100, then -2% per candle over the last `drop` candles
pub fn crash(count: usize, drop: usize) -> Vec<Candle> {
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            let dropped = (i + drop + 1).saturating_sub(count);
            100.0 * 0.98_f64.powi(dropped as i32)
        })
        .collect();
    candles_from_closes(&closes, &vec![10.0; count])
}

/// Transport that fails its first `failures` calls and records every call
pub struct ScriptedTransport {
    failures: u32,
    calls: parking_lot::Mutex<Vec<(tokio::time::Instant, Vec<(&'static str, String)>)>>,
}

impl ScriptedTransport {
    pub fn succeeding() -> Self {
        Self::failing_first(0)
    }

    pub fn failing_first(failures: u32) -> Self {
        Self {
            failures,
            calls: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn call_times(&self) -> Vec<tokio::time::Instant> {
        self.calls.lock().iter().map(|(at, _)| *at).collect()
    }

    pub fn queries(&self) -> Vec<Vec<(&'static str, String)>> {
        self.calls.lock().iter().map(|(_, query)| query.clone()).collect()
    }
}

#[async_trait::async_trait]
impl trend_signals::WebhookTransport for ScriptedTransport {
    async fn send(
        &self,
        _url: &url::Url,
        query: &[(&'static str, String)],
    ) -> Result<(), trend_signals::NotifyError> {
        let mut calls = self.calls.lock();
        calls.push((tokio::time::Instant::now(), query.to_vec()));
        if calls.len() as u32 <= self.failures {
            return Err(trend_signals::NotifyError::Status(503));
        }
        Ok(())
    }
}

pub fn notifier_config(max_retries: u32) -> trend_signals::NotifierConfig {
    trend_signals::NotifierConfig {
        url: url::Url::parse("http://127.0.0.1:9/hook").unwrap(),
        max_retries,
        attempt_timeout: std::time::Duration::from_secs(5),
        backoff_base: std::time::Duration::from_secs(1),
    }
}

/// Value of `key` in a recorded query
pub fn query_value<'a>(query: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, value)| value.as_str())
}
