//! Evaluation counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StrategyMetrics {
    pub evaluations: u64,
    pub early_exits: u64,
    pub insufficient_windows: u64,
    pub events_emitted: u64,
    pub deliveries_failed: u64,
    pub errors: u64,
}

/// Thread-safe counters shared by the on-demand path and the poller
#[derive(Debug)]
pub struct MetricsCollector {
    evaluations: AtomicU64,
    early_exits: AtomicU64,
    insufficient_windows: AtomicU64,
    events_emitted: AtomicU64,
    deliveries_failed: AtomicU64,
    errors: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            evaluations: AtomicU64::new(0),
            early_exits: AtomicU64::new(0),
            insufficient_windows: AtomicU64::new(0),
            events_emitted: AtomicU64::new(0),
            deliveries_failed: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub fn increment_evaluations(&self) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_early_exits(&self) {
        self.early_exits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_insufficient(&self) {
        self.insufficient_windows.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_events(&self) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed_deliveries(&self) {
        self.deliveries_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self) -> StrategyMetrics {
        StrategyMetrics {
            evaluations: self.evaluations.load(Ordering::Relaxed),
            early_exits: self.early_exits.load(Ordering::Relaxed),
            insufficient_windows: self.insufficient_windows.load(Ordering::Relaxed),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            deliveries_failed: self.deliveries_failed.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
