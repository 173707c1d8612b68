// Pipeline counters shared by all workers

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, updated by workers without locking
#[derive(Debug, Default)]
pub struct PipelineStats {
    produced: AtomicU64,
    consumed: AtomicU64,
    persisted: AtomicU64,
    generation_failures: AtomicU64,
    sink_failures: AtomicU64,
    monitor_samples: AtomicU64,
    report_failures: AtomicU64,
}

/// Point-in-time copy of `PipelineStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub produced: u64,
    pub consumed: u64,
    pub persisted: u64,
    pub generation_failures: u64,
    pub sink_failures: u64,
    pub monitor_samples: u64,
    pub report_failures: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_produced(&self) {
        self.produced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_consumed(&self) {
        self.consumed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_persisted(&self) {
        self.persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_generation_failure(&self) {
        self.generation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sink_failure(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_monitor_sample(&self) {
        self.monitor_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_report_failure(&self) {
        self.report_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            produced: self.produced.load(Ordering::Relaxed),
            consumed: self.consumed.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            generation_failures: self.generation_failures.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            monitor_samples: self.monitor_samples.load(Ordering::Relaxed),
            report_failures: self.report_failures.load(Ordering::Relaxed),
        }
    }
}
