// Pipeline - builds the shared queue and generator, runs workers, shuts down

use super::generator::{GeneratorSettings, PayloadGenerator, PayloadSizeRange};
use super::queue::{BoundedQueue, BoundedStringQueue};
use super::worker::constants::{MONITOR_INTERVAL, SHUTDOWN_GRACE};
use super::worker::panic_guard::panic_message;
use super::worker::{
    shutdown_channel, ConsumerWorker, PipelineStats, ProducerWorker, QueueMonitor, ShutdownSender,
    StateCell, StatsSnapshot, WorkerSettings, WorkerState,
};
use crate::domain::{PipelineConfig, QueueLimits};
use crate::error::Result;
use crate::port::{RecordSink, SegmentSource, SizeReporter};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Tunables of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub queue_limits: QueueLimits,
    pub generator: GeneratorSettings,
    pub payload_sizes: PayloadSizeRange,
    pub worker: WorkerSettings,
    pub monitor_interval: Duration,
    pub shutdown_grace: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            queue_limits: QueueLimits::default(),
            generator: GeneratorSettings::default(),
            payload_sizes: PayloadSizeRange::default(),
            worker: WorkerSettings::default(),
            monitor_interval: MONITOR_INTERVAL,
            shutdown_grace: SHUTDOWN_GRACE,
        }
    }
}

/// Composition of one queue, one generator and the external collaborators
pub struct Pipeline {
    config: PipelineConfig,
    settings: PipelineSettings,
    queue: Arc<BoundedStringQueue>,
    generator: Arc<PayloadGenerator>,
    sink: Arc<dyn RecordSink>,
    reporter: Arc<dyn SizeReporter>,
    stats: Arc<PipelineStats>,
}

impl Pipeline {
    /// Build the pipeline; nothing runs until `start`
    ///
    /// # Errors
    /// - AppError::Domain if the generator settings are invalid
    pub fn new(
        config: PipelineConfig,
        settings: PipelineSettings,
        source: Arc<dyn SegmentSource>,
        sink: Arc<dyn RecordSink>,
        reporter: Arc<dyn SizeReporter>,
    ) -> Result<Self> {
        let generator = PayloadGenerator::new(source, settings.generator)?;

        Ok(Self {
            config,
            settings,
            queue: Arc::new(BoundedQueue::new(settings.queue_limits)),
            generator: Arc::new(generator),
            sink,
            reporter,
            stats: Arc::new(PipelineStats::new()),
        })
    }

    pub fn queue(&self) -> Arc<BoundedStringQueue> {
        Arc::clone(&self.queue)
    }

    /// Spawn producers, consumers and the monitor
    pub fn start(self) -> PipelineHandle {
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let mut tasks = JoinSet::new();
        let mut states = Vec::new();

        info!(
            producers = self.config.producers.get(),
            consumers = self.config.consumers.get(),
            capacity = self.queue.capacity(),
            low_watermark = self.queue.low_watermark(),
            "Starting pipeline"
        );

        for id in 0..self.config.producers.get() {
            let worker = ProducerWorker::new(
                id,
                Arc::clone(&self.queue),
                Arc::clone(&self.generator),
                self.settings.payload_sizes,
                self.settings.worker,
                Arc::clone(&self.stats),
            );
            states.push(worker.state_cell());
            let token = shutdown_rx.clone();
            tasks.spawn(async move { worker.run(token).await });
        }

        for id in 0..self.config.consumers.get() {
            let worker = ConsumerWorker::new(
                id,
                Arc::clone(&self.queue),
                Arc::clone(&self.sink),
                self.settings.worker,
                Arc::clone(&self.stats),
            );
            states.push(worker.state_cell());
            let token = shutdown_rx.clone();
            tasks.spawn(async move { worker.run(token).await });
        }

        let monitor = QueueMonitor::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.reporter),
            self.settings.monitor_interval,
            Arc::clone(&self.stats),
        );
        tasks.spawn(async move { monitor.run(shutdown_rx).await });

        PipelineHandle {
            queue: self.queue,
            stats: self.stats,
            shutdown_tx,
            tasks,
            states,
            grace: self.settings.shutdown_grace,
        }
    }
}

/// Running pipeline
pub struct PipelineHandle {
    queue: Arc<BoundedStringQueue>,
    stats: Arc<PipelineStats>,
    shutdown_tx: ShutdownSender,
    tasks: JoinSet<()>,
    states: Vec<StateCell>,
    grace: Duration,
}

impl PipelineHandle {
    pub fn queue(&self) -> &Arc<BoundedStringQueue> {
        &self.queue
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Producer states first, then consumer states
    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.states.iter().map(StateCell::get).collect()
    }

    /// Live state cells, in `worker_states` order; they stay readable after shutdown
    pub fn state_cells(&self) -> Vec<StateCell> {
        self.states.clone()
    }

    /// Stop every worker and wait for them to exit.
    ///
    /// Signals shutdown, closes the queue so parked puts/takes return, then
    /// waits up to the grace period before aborting what is left.
    pub async fn shutdown(mut self) -> StatsSnapshot {
        info!("Pipeline shutting down");
        self.shutdown_tx.shutdown();
        self.queue.close();

        let tasks = &mut self.tasks;
        let drained = timeout(self.grace, async {
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    if e.is_panic() {
                        error!(panic_msg = %panic_message(e.into_panic()), "Worker panicked");
                    }
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                remaining = self.tasks.len(),
                grace_ms = self.grace.as_millis() as u64,
                "Workers did not stop within grace period, aborting"
            );
            self.tasks.abort_all();
            while self.tasks.join_next().await.is_some() {}
        }

        let snapshot = self.stats.snapshot();
        info!(
            produced = snapshot.produced,
            consumed = snapshot.consumed,
            persisted = snapshot.persisted,
            "Pipeline stopped"
        );
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkerCount;
    use crate::port::record_sink::mocks::MemorySink;
    use crate::port::segment_source::mocks::IndexedSource;
    use crate::port::size_reporter::mocks::RecordingReporter;

    fn small_settings() -> PipelineSettings {
        PipelineSettings {
            payload_sizes: PayloadSizeRange::new(16, 64).unwrap(),
            worker: WorkerSettings {
                max_pause: Duration::from_millis(3),
            },
            monitor_interval: Duration::from_millis(10),
            ..PipelineSettings::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pipeline_moves_items_and_stops_cleanly() {
        let sink = Arc::new(MemorySink::new());
        let reporter = Arc::new(RecordingReporter::new());
        let config = PipelineConfig::new(WorkerCount::new(3).unwrap(), WorkerCount::new(2).unwrap());

        let pipeline = Pipeline::new(
            config,
            small_settings(),
            Arc::new(IndexedSource),
            sink.clone(),
            reporter.clone(),
        )
        .unwrap();
        let handle = pipeline.start();

        timeout(Duration::from_secs(5), async {
            while sink.len() < 20 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(handle.worker_states().len(), 5);
        let queue = Arc::clone(handle.queue());
        let snapshot = timeout(Duration::from_secs(2), handle.shutdown()).await.unwrap();

        assert!(queue.is_closed());
        assert!(snapshot.produced >= snapshot.consumed);
        assert_eq!(snapshot.persisted as usize, sink.len());
        assert!(snapshot.monitor_samples > 0);
        assert!(reporter.samples().iter().all(|s| *s <= 100));
        for line in sink.lines() {
            // Segment 0 of every payload is filled with 'A'
            assert!(line.starts_with("<A"), "{}", line);
        }
    }

    #[tokio::test]
    async fn test_shutdown_reports_stopped_workers() {
        let config = PipelineConfig::new(WorkerCount::new(1).unwrap(), WorkerCount::new(1).unwrap());
        let pipeline = Pipeline::new(
            config,
            small_settings(),
            Arc::new(IndexedSource),
            Arc::new(MemorySink::new()),
            Arc::new(RecordingReporter::new()),
        )
        .unwrap();
        let handle = pipeline.start();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let cells = handle.state_cells();
        handle.shutdown().await;

        assert!(cells.iter().all(|s| s.get() == WorkerState::Stopped));
    }

    #[test]
    fn test_invalid_generator_settings_rejected() {
        let config = PipelineConfig::new(WorkerCount::new(1).unwrap(), WorkerCount::new(1).unwrap());
        let settings = PipelineSettings {
            generator: GeneratorSettings {
                width: 0,
                subtask_timeout: Duration::from_secs(1),
            },
            ..PipelineSettings::default()
        };

        let result = Pipeline::new(
            config,
            settings,
            Arc::new(IndexedSource),
            Arc::new(MemorySink::new()),
            Arc::new(RecordingReporter::new()),
        );
        assert!(result.is_err());
    }
}
