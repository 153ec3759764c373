//! Rolling account value history
//!
//! A bounded in-memory record of portfolio valuations taken each poll cycle.
//! Writers take the write lock only long enough to push; readers copy out.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::VecDeque;
use trend_config::service::market::ASSET_HISTORY_CAPACITY;
use types::AccountValue;

/// Supplies the current account balances
#[async_trait]
pub trait PortfolioSource: Send + Sync {
    /// Base and quote balances
    async fn balances(&self) -> Result<(f64, f64)>;
}

/// Balances supplied up front, e.g. from the command line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPortfolio {
    pub base: f64,
    pub quote: f64,
}

#[async_trait]
impl PortfolioSource for FixedPortfolio {
    async fn balances(&self) -> Result<(f64, f64)> {
        Ok((self.base, self.quote))
    }
}

/// Fixed-capacity ring of [`AccountValue`] snapshots, oldest first
#[derive(Debug)]
pub struct AssetValueHistory {
    entries: RwLock<VecDeque<AccountValue>>,
    capacity: usize,
}

impl Default for AssetValueHistory {
    fn default() -> Self {
        Self::new(ASSET_HISTORY_CAPACITY)
    }
}

impl AssetValueHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append, evicting the oldest entry when full
    pub fn record(&self, value: AccountValue) {
        let mut entries = self.entries.write();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(value);
    }

    pub fn snapshot(&self) -> Vec<AccountValue> {
        self.entries.read().iter().copied().collect()
    }

    /// Entries strictly after `start` and strictly before `end`
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<AccountValue> {
        self.entries
            .read()
            .iter()
            .filter(|v| v.timestamp > start && v.timestamp < end)
            .copied()
            .collect()
    }

    pub fn latest(&self) -> Option<AccountValue> {
        self.entries.read().back().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn value_at(seconds: i64) -> AccountValue {
        AccountValue::at_price(Utc.timestamp_opt(seconds, 0).unwrap(), 1.0, 0.0, seconds as f64)
    }

    #[test]
    fn test_evicts_oldest_at_capacity() {
        let history = AssetValueHistory::new(3);
        for s in 1..=5 {
            history.record(value_at(s));
        }

        let kept: Vec<i64> = history.snapshot().iter().map(|v| v.timestamp.timestamp()).collect();
        assert_eq!(kept, vec![3, 4, 5]);
        assert_eq!(history.latest().unwrap().total_quote, 5.0);
    }

    #[test]
    fn test_default_capacity() {
        let history = AssetValueHistory::default();
        assert_eq!(history.capacity(), 1000);
        for s in 0..1001 {
            history.record(value_at(s));
        }
        assert_eq!(history.len(), 1000);
        assert_eq!(history.snapshot()[0].timestamp.timestamp(), 1);
    }

    #[test]
    fn test_between_is_exclusive() {
        let history = AssetValueHistory::new(10);
        for s in 1..=5 {
            history.record(value_at(s));
        }

        let start = Utc.timestamp_opt(2, 0).unwrap();
        let end = Utc.timestamp_opt(5, 0).unwrap();
        let inside: Vec<i64> = history
            .between(start, end)
            .iter()
            .map(|v| v.timestamp.timestamp())
            .collect();
        assert_eq!(inside, vec![3, 4]);
    }

    #[test]
    fn test_empty_history() {
        let history = AssetValueHistory::new(0);
        assert!(history.is_empty());
        assert!(history.latest().is_none());
        assert_eq!(history.capacity(), 1);
    }

    #[test]
    fn test_fixed_portfolio_balances() {
        let portfolio = FixedPortfolio {
            base: 0.25,
            quote: 500.0,
        };
        let balances = tokio_test::block_on(portfolio.balances());
        assert_eq!(tokio_test::assert_ok!(balances), (0.25, 500.0));
    }
}
