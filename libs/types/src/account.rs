//! Portfolio valuation snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account value at a point in time, denominated in the quote currency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountValue {
    pub timestamp: DateTime<Utc>,
    pub base_balance: f64,
    pub quote_balance: f64,
    pub total_quote: f64,
}

impl AccountValue {
    /// Value a base/quote balance pair at `price`
    pub fn at_price(timestamp: DateTime<Utc>, base_balance: f64, quote_balance: f64, price: f64) -> Self {
        Self {
            timestamp,
            base_balance,
            quote_balance,
            total_quote: quote_balance + base_balance * price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_value() {
        let value = AccountValue::at_price(Utc::now(), 0.5, 1000.0, 30_000.0);
        assert_eq!(value.total_quote, 16_000.0);
    }
}
