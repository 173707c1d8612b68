// Worker - Producer, consumer and monitor loops

pub mod constants;
mod consumer;
mod monitor;
pub(crate) mod panic_guard;
mod producer;
mod shutdown;
mod stats;

pub use consumer::ConsumerWorker;
pub use monitor::QueueMonitor;
pub use producer::ProducerWorker;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use stats::{PipelineStats, StatsSnapshot};

use constants::MAX_WORKER_PAUSE;
use rand::Rng;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Lifecycle of a producer or consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// Pausing before the next unit of work
    Sleeping = 0,
    /// Generating/putting or taking/persisting
    Working = 1,
    /// Loop exited after shutdown
    Stopped = 2,
}

/// Shared, lock-free view of a worker's state
#[derive(Debug, Clone)]
pub struct StateCell(Arc<AtomicU8>);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicU8::new(WorkerState::Sleeping as u8)))
    }

    pub(crate) fn set(&self, state: WorkerState) {
        self.0.store(state as u8, Ordering::Release);
    }

    pub fn get(&self) -> WorkerState {
        match self.0.load(Ordering::Acquire) {
            0 => WorkerState::Sleeping,
            1 => WorkerState::Working,
            _ => WorkerState::Stopped,
        }
    }
}

/// Loop timing shared by producers and consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    /// Each iteration pauses for a uniform duration in `[0, max_pause]`
    pub max_pause: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            max_pause: MAX_WORKER_PAUSE,
        }
    }
}

/// Random pause, cut short by shutdown. Returns `false` if interrupted.
async fn pause(max: Duration, shutdown: &mut ShutdownToken) -> bool {
    let max_ms = max.as_millis() as u64;
    let delay = Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms));

    tokio::select! {
        biased;
        _ = shutdown.wait() => false,
        _ = sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_cell_transitions() {
        let cell = StateCell::new();
        let view = cell.clone();
        assert_eq!(view.get(), WorkerState::Sleeping);

        cell.set(WorkerState::Working);
        assert_eq!(view.get(), WorkerState::Working);

        cell.set(WorkerState::Stopped);
        assert_eq!(view.get(), WorkerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_interrupted_by_shutdown() {
        let (tx, mut token) = shutdown_channel();
        tx.shutdown();
        assert!(!pause(Duration::from_secs(3600), &mut token).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_completes() {
        let (_tx, mut token) = shutdown_channel();
        assert!(pause(Duration::from_millis(100), &mut token).await);
    }
}
