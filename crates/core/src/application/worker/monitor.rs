// Queue monitor - periodic queue depth samples

use super::constants::MONITOR_INTERVAL;
use super::{PipelineStats, ShutdownToken};
use crate::application::queue::BoundedStringQueue;
use crate::port::SizeReporter;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

/// Read-only observer of the queue size
pub struct QueueMonitor {
    queue: Arc<BoundedStringQueue>,
    reporter: Arc<dyn SizeReporter>,
    period: Duration,
    stats: Arc<PipelineStats>,
}

impl QueueMonitor {
    pub fn new(
        queue: Arc<BoundedStringQueue>,
        reporter: Arc<dyn SizeReporter>,
        period: Duration,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            queue,
            reporter,
            period,
            stats,
        }
    }

    /// Monitor with the default 100ms period
    pub fn with_default_period(
        queue: Arc<BoundedStringQueue>,
        reporter: Arc<dyn SizeReporter>,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self::new(queue, reporter, MONITOR_INTERVAL, stats)
    }

    /// Sample and report every period until shutdown
    pub async fn run(&self, mut shutdown: ShutdownToken) {
        info!(period_ms = self.period.as_millis() as u64, "Queue monitor started");

        let mut tick = interval(self.period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; report after one full period
        tick.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                _ = tick.tick() => {}
            }

            let size = self.queue.size();
            match self.reporter.report(size) {
                Ok(()) => self.stats.record_monitor_sample(),
                Err(e) => {
                    self.stats.record_report_failure();
                    warn!(size, error = %e, "Failed to report queue size");
                }
            }
        }
        info!("Queue monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::queue::BoundedQueue;
    use crate::application::worker::shutdown_channel;
    use crate::port::size_reporter::mocks::{FailingReporter, RecordingReporter};

    #[tokio::test(start_paused = true)]
    async fn test_monitor_reports_every_period() {
        let queue = Arc::new(BoundedQueue::default());
        for i in 0..3 {
            queue.put(format!("item{}", i)).await.unwrap();
        }
        let reporter = Arc::new(RecordingReporter::new());
        let stats = Arc::new(PipelineStats::new());
        let monitor = QueueMonitor::with_default_period(queue.clone(), reporter.clone(), stats.clone());
        let (tx, token) = shutdown_channel();

        let handle = tokio::spawn(async move { monitor.run(token).await });

        tokio::time::sleep(Duration::from_millis(350)).await;
        tx.shutdown();
        handle.await.unwrap();

        let samples = reporter.samples();
        assert_eq!(samples, vec![3, 3, 3]);
        assert_eq!(stats.snapshot().monitor_samples, 3);
        // Observing never changes the queue
        assert_eq!(queue.size(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_survives_reporter_failures() {
        let queue = Arc::new(BoundedQueue::default());
        let reporter = Arc::new(FailingReporter::new());
        let stats = Arc::new(PipelineStats::new());
        let monitor = QueueMonitor::new(queue, reporter.clone(), Duration::from_millis(10), stats.clone());
        let (tx, token) = shutdown_channel();

        let handle = tokio::spawn(async move { monitor.run(token).await });

        tokio::time::sleep(Duration::from_millis(55)).await;
        tx.shutdown();
        handle.await.unwrap();

        assert_eq!(reporter.calls(), 5);
        assert_eq!(stats.snapshot().report_failures, 5);
    }
}
