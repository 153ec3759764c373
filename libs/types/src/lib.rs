//! # Trend Signal Types Library
//!
//! Shared data model for the trend detection services.
//!
//! ## Design Philosophy
//!
//! - **Decimal at the boundary**: candles arrive as decimal strings and are kept as
//!   [`rust_decimal::Decimal`] until the indicator math converts them to `f64`
//! - **Explicit absence**: every indicator value is an `Option`, so "not computed yet"
//!   can never be mistaken for a genuine zero reading
//! - **Immutable snapshots**: [`PriceSeries`], [`IndicatorSet`] and [`SignalEvent`] are
//!   built once per evaluation cycle and never mutated afterwards
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{Candle, PriceSeries};
//! use rust_decimal::Decimal;
//! use chrono::{TimeZone, Utc};
//!
//! let candle = Candle {
//!     start: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
//!     open: Decimal::from(100),
//!     high: Decimal::from(101),
//!     low: Decimal::from(99),
//!     close: Decimal::from(100),
//!     volume: Decimal::from(12),
//! };
//! let series = PriceSeries::from_candles(&[candle]);
//! assert_eq!(series.len(), 1);
//! ```

pub mod account;
pub mod errors;
pub mod indicators;
pub mod market;
pub mod signal;

pub use account::AccountValue;
pub use errors::TypesError;
pub use indicators::IndicatorSet;
pub use market::{Candle, CandlesResponse, PriceSeries};
pub use signal::{SignalDecision, SignalEvent, SignalKind, TrendLabel, TrendState};

pub type Result<T> = std::result::Result<T, TypesError>;
