//! Trend labels, tracked trend state and emitted signal events

use crate::errors::TypesError;
use crate::indicators::IndicatorSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market regime classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    #[default]
    Neutral,
    Bullish,
    Bearish,
}

impl TrendLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::Neutral => "neutral",
            TrendLabel::Bullish => "bullish",
            TrendLabel::Bearish => "bearish",
        }
    }

    pub fn is_directional(&self) -> bool {
        !matches!(self, TrendLabel::Neutral)
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendLabel {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neutral" => Ok(TrendLabel::Neutral),
            "bullish" => Ok(TrendLabel::Bullish),
            "bearish" => Ok(TrendLabel::Bearish),
            _ => Err(TypesError::UnknownTrendLabel { input: s.to_string() }),
        }
    }
}

/// The single tracked regime plus the time of the last accepted signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrendState {
    pub label: TrendLabel,
    /// `None` until the first event has been emitted
    pub last_signal_at: Option<DateTime<Utc>>,
}

/// Which decision path produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    TrendChange,
    ImmediateDip,
}

/// An accepted transition, ready for notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub label: TrendLabel,
    pub kind: SignalKind,
    pub triggers: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl SignalEvent {
    pub fn new(
        label: TrendLabel,
        kind: SignalKind,
        triggers: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, TypesError> {
        if !label.is_directional() {
            return Err(TypesError::NeutralSignal);
        }

        Ok(Self {
            label,
            kind,
            triggers,
            timestamp,
        })
    }

    pub fn is_bearish(&self) -> bool {
        self.label == TrendLabel::Bearish
    }
}

/// Result of one evaluation, returned to the HTTP layer and the poller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDecision {
    pub bearish_signal: bool,
    pub label: TrendLabel,
    pub triggers: Vec<String>,
    /// Unix seconds
    pub timestamp: i64,
    pub indicators: IndicatorSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<SignalEvent>,
}
