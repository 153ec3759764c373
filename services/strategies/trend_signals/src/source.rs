//! Candle sources
//!
//! The pipeline only needs "the most recent N candles, oldest first". Where
//! they come from is behind [`CandleSource`].

use crate::error::{Result, StrategyError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use types::{Candle, CandlesResponse};

#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Up to `count` most recent candles in ascending time order
    async fn recent(&self, count: usize) -> Result<Vec<Candle>>;
}

fn tail(mut candles: Vec<Candle>, count: usize) -> Vec<Candle> {
    let skip = candles.len().saturating_sub(count);
    candles.drain(..skip);
    candles
}

/// Reads a `{"candles": [...]}` document from disk on every request
#[derive(Debug, Clone)]
pub struct JsonFileCandleSource {
    path: PathBuf,
}

impl JsonFileCandleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CandleSource for JsonFileCandleSource {
    async fn recent(&self, count: usize) -> Result<Vec<Candle>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            StrategyError::CandleSource {
                message: format!("Failed to read {}: {}", self.path.display(), e),
            }
        })?;

        let response: CandlesResponse = serde_json::from_str(&raw)?;
        let candles = response.into_ascending();
        debug!(
            "Loaded {} candles from {}",
            candles.len(),
            self.path.display()
        );

        Ok(tail(candles, count))
    }
}

/// Fixed candle set held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCandleSource {
    candles: Vec<Candle>,
}

impl InMemoryCandleSource {
    /// Candles are sorted ascending on construction
    pub fn new(candles: Vec<Candle>) -> Self {
        Self {
            candles: CandlesResponse { candles }.into_ascending(),
        }
    }
}

#[async_trait]
impl CandleSource for InMemoryCandleSource {
    async fn recent(&self, count: usize) -> Result<Vec<Candle>> {
        Ok(tail(self.candles.clone(), count))
    }
}
