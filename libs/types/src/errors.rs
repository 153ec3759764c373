//! Error types for the shared data model

use thiserror::Error;

/// Errors raised while building or validating shared types
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypesError {
    /// Signal events always carry a directional label
    #[error("signal events cannot carry a neutral trend label")]
    NeutralSignal,

    /// Trend label text did not match `neutral`, `bullish` or `bearish`
    #[error("unknown trend label: '{input}'")]
    UnknownTrendLabel { input: String },

    /// Candle start time was not a valid unix timestamp
    #[error("invalid candle start time: '{input}'")]
    InvalidTimestamp { input: String },
}
