// Producer worker - generate a payload, put it on the queue, repeat

use super::{pause, PipelineStats, ShutdownToken, StateCell, WorkerSettings, WorkerState};
use crate::application::generator::{PayloadGenerator, PayloadSizeRange};
use crate::application::queue::BoundedStringQueue;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ProducerWorker {
    id: usize,
    queue: Arc<BoundedStringQueue>,
    generator: Arc<PayloadGenerator>,
    sizes: PayloadSizeRange,
    settings: WorkerSettings,
    stats: Arc<PipelineStats>,
    state: StateCell,
}

impl ProducerWorker {
    pub fn new(
        id: usize,
        queue: Arc<BoundedStringQueue>,
        generator: Arc<PayloadGenerator>,
        sizes: PayloadSizeRange,
        settings: WorkerSettings,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            id,
            queue,
            generator,
            sizes,
            settings,
            stats,
            state: StateCell::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state.get()
    }

    /// Handle that keeps observing this worker's state
    pub fn state_cell(&self) -> StateCell {
        self.state.clone()
    }

    /// Run producer loop until shutdown or queue close
    pub async fn run(&self, mut shutdown: ShutdownToken) {
        info!(producer_id = self.id, "Producer started");
        loop {
            if shutdown.is_shutdown() {
                break;
            }

            self.state.set(WorkerState::Sleeping);
            if !pause(self.settings.max_pause, &mut shutdown).await {
                break;
            }

            self.state.set(WorkerState::Working);
            let size = self.sizes.sample();
            let generated = tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    info!(producer_id = self.id, size, "Producer interrupted while generating");
                    break;
                }
                result = self.generator.generate(size) => result,
            };
            let payload = match generated {
                Ok(payload) => payload,
                Err(e) => {
                    // Transient: the next iteration generates a fresh payload
                    self.stats.record_generation_failure();
                    warn!(producer_id = self.id, size, error = %e, "Payload generation failed");
                    continue;
                }
            };

            tokio::select! {
                result = self.queue.put(payload) => match result {
                    Ok(()) => self.stats.record_produced(),
                    Err(e) => {
                        info!(producer_id = self.id, reason = %e, "Producer leaving queue");
                        break;
                    }
                },
                _ = shutdown.wait() => {
                    info!(producer_id = self.id, "Producer interrupted while waiting for capacity");
                    break;
                }
            }
        }
        self.state.set(WorkerState::Stopped);
        info!(producer_id = self.id, "Producer stopped");
    }
}
