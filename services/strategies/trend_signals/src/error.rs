//! Error types for the trend signals strategy

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Candle decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Candle source error: {message}")]
    CandleSource { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Portfolio error: {message}")]
    Portfolio { message: String },
}

pub type Result<T> = std::result::Result<T, StrategyError>;
