// Consumer worker - take a payload, summarize it, persist the record, repeat

use super::{pause, PipelineStats, ShutdownToken, StateCell, WorkerSettings, WorkerState};
use crate::application::queue::BoundedStringQueue;
use crate::domain::Record;
use crate::port::RecordSink;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ConsumerWorker {
    id: usize,
    queue: Arc<BoundedStringQueue>,
    sink: Arc<dyn RecordSink>,
    settings: WorkerSettings,
    stats: Arc<PipelineStats>,
    state: StateCell,
}

impl ConsumerWorker {
    pub fn new(
        id: usize,
        queue: Arc<BoundedStringQueue>,
        sink: Arc<dyn RecordSink>,
        settings: WorkerSettings,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            id,
            queue,
            sink,
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

    pub fn state_cell(&self) -> StateCell {
        self.state.clone()
    }

    /// Run consumer loop until shutdown or queue close
    pub async fn run(&self, mut shutdown: ShutdownToken) {
        info!(consumer_id = self.id, "Consumer started");
        loop {
            if shutdown.is_shutdown() {
                break;
            }

            self.state.set(WorkerState::Sleeping);
            if !pause(self.settings.max_pause, &mut shutdown).await {
                break;
            }

            self.state.set(WorkerState::Working);
            let payload = tokio::select! {
                result = self.queue.take() => match result {
                    Ok(payload) => payload,
                    Err(e) => {
                        info!(consumer_id = self.id, reason = %e, "Consumer leaving queue");
                        break;
                    }
                },
                _ = shutdown.wait() => {
                    info!(consumer_id = self.id, "Consumer interrupted while waiting for items");
                    break;
                }
            };
            self.stats.record_consumed();

            let record = Record::from_payload(&payload);
            drop(payload);
            self.persist(&record).await;
        }
        self.state.set(WorkerState::Stopped);
        info!(consumer_id = self.id, "Consumer stopped");
    }

    async fn persist(&self, record: &Record) {
        match self.sink.append(record).await {
            Ok(()) => {
                self.stats.record_persisted();
                debug!(consumer_id = self.id, record = %record, "Record persisted");
            }
            Err(e) => {
                // Record is dropped; the loop carries on
                self.stats.record_sink_failure();
                warn!(consumer_id = self.id, record = %record, error = %e, "Failed to persist record");
            }
        }
    }
}
