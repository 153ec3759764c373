//! Trend state machine
//!
//! Holds the single tracked regime and decides whether an assessment becomes
//! a [`SignalEvent`]. All reads and writes of the state happen under one lock
//! so concurrent evaluations are serialized.

use crate::signals::{Assessment, DipAssessment};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::Duration;
use tracing::{debug, info};
use trend_config::service::signals::{DIP_COOLDOWN_SECS, TREND_COOLDOWN_SECS};
use types::{SignalEvent, SignalKind, TrendLabel, TrendState};

/// Cooldowns between accepted events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendConfig {
    /// Minimum time between opposite-direction transitions
    pub trend_cooldown: Duration,
    /// Minimum time between immediate-dip events
    pub dip_cooldown: Duration,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            trend_cooldown: Duration::from_secs(TREND_COOLDOWN_SECS),
            dip_cooldown: Duration::from_secs(DIP_COOLDOWN_SECS),
        }
    }
}

/// Thread-safe owner of the [`TrendState`]
#[derive(Debug, Default)]
pub struct TrendTracker {
    state: Mutex<TrendState>,
    config: TrendConfig,
}

impl TrendTracker {
    pub fn new(config: TrendConfig) -> Self {
        Self {
            state: Mutex::new(TrendState::default()),
            config,
        }
    }

    /// Start from a known state, e.g. when replaying a window
    pub fn with_state(config: TrendConfig, state: TrendState) -> Self {
        Self {
            state: Mutex::new(state),
            config,
        }
    }

    pub fn snapshot(&self) -> TrendState {
        *self.state.lock()
    }

    pub fn config(&self) -> TrendConfig {
        self.config
    }

    /// Apply one cycle's assessments at `now`.
    ///
    /// The trend transition is checked first. The immediate-dip path only runs
    /// when no transition was accepted, so a cycle emits at most one event.
    pub fn observe(
        &self,
        assessment: &Assessment,
        dip: &DipAssessment,
        now: DateTime<Utc>,
    ) -> Option<SignalEvent> {
        let mut state = self.state.lock();

        if let Some(event) = self.transition(&mut state, assessment, now) {
            return Some(event);
        }

        if !dip.fires() {
            return None;
        }

        if !cooldown_elapsed(state.last_signal_at, now, self.config.dip_cooldown) {
            debug!(score = dip.score(), "Immediate dip suppressed by cooldown");
            return None;
        }

        // Only the cooldown clock moves; the tracked label is left untouched.
        // Whether a dip should also flip a bullish regime is still undecided.
        state.last_signal_at = Some(now);
        info!(
            score = dip.score(),
            triggers = ?dip.triggers(),
            "Immediate dip detected"
        );

        SignalEvent::new(
            TrendLabel::Bearish,
            SignalKind::ImmediateDip,
            dip.triggers().to_vec(),
            now,
        )
        .ok()
    }

    fn transition(
        &self,
        state: &mut TrendState,
        assessment: &Assessment,
        now: DateTime<Utc>,
    ) -> Option<SignalEvent> {
        let candidate = assessment.label();

        // A neutral reading never moves the state
        if candidate == TrendLabel::Neutral || candidate == state.label {
            return None;
        }

        // Leaving neutral is immediate; reversals wait out the cooldown
        if state.label.is_directional()
            && !cooldown_elapsed(state.last_signal_at, now, self.config.trend_cooldown)
        {
            debug!(
                "Trend change {} -> {} suppressed by cooldown",
                state.label, candidate
            );
            return None;
        }

        let event = SignalEvent::new(
            candidate,
            SignalKind::TrendChange,
            assessment.triggers(),
            now,
        )
        .ok()?;

        info!(
            "Trend changed {} -> {} (triggers: {:?})",
            state.label, candidate, event.triggers
        );
        state.label = candidate;
        state.last_signal_at = Some(now);

        Some(event)
    }
}

/// `true` when no signal has been emitted yet or `cooldown` has passed since
/// the last one. A clock that moved backwards counts as no time elapsed.
fn cooldown_elapsed(last: Option<DateTime<Utc>>, now: DateTime<Utc>, cooldown: Duration) -> bool {
    match last {
        None => true,
        Some(last) => (now - last).to_std().unwrap_or(Duration::ZERO) >= cooldown,
    }
}
