//! Service configuration defaults
//!
//! Default values and limits shared by the trend signal services.

/// Signal evaluation defaults
pub mod signals {
    /// Background poll interval (10 minutes)
    pub const POLL_INTERVAL_SECS: u64 = 600;

    /// Candles fetched for an on-demand evaluation
    pub const FULL_WINDOW_CANDLES: usize = 300;

    /// Candles fetched by the background poller.
    /// 144 five-minute intervals (12 hours) need 145 closes.
    pub const LIGHTWEIGHT_WINDOW_CANDLES: usize = 145;

    /// Minimum time between accepted trend transitions (8 minutes)
    pub const TREND_COOLDOWN_SECS: u64 = 480;

    /// Minimum time between immediate-dip events (5 minutes)
    pub const DIP_COOLDOWN_SECS: u64 = 300;

    /// Weighted score required for a bullish or bearish label
    pub const TREND_SCORE_THRESHOLD: f64 = 7.0;

    /// Weighted score required for the immediate-dip path
    pub const DIP_SCORE_THRESHOLD: f64 = 6.0;
}

/// Webhook notifier defaults
pub mod webhook {
    /// Retries after the first attempt
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Upper bound accepted for `max_retries`
    pub const MAX_RETRIES_LIMIT: u32 = 10;

    /// Per-attempt timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

    /// Accepted per-attempt timeout range (seconds)
    pub const MIN_TIMEOUT_SECS: u64 = 1;
    pub const MAX_TIMEOUT_SECS: u64 = 30;

    /// Base delay for exponential backoff (milliseconds)
    pub const BACKOFF_BASE_MS: u64 = 1_000;
}

/// Market defaults
pub mod market {
    pub const DEFAULT_BASE_CURRENCY: &str = "BTC";
    pub const DEFAULT_QUOTE_CURRENCY: &str = "USDC";

    /// Asset value snapshots retained in memory
    pub const ASSET_HISTORY_CAPACITY: usize = 1_000;
}
