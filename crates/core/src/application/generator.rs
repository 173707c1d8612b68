// Payload Generator - fan-out/fan-in over a fixed-width blocking pool
//
// One generate call splits the payload into `width` contiguous tasks, runs them
// on tokio's blocking pool, and joins results in submission order. Each result
// is awaited with its own timeout. On any failure the remaining tasks are
// cancelled and awaited before the error is returned. Dropping the generate
// future raises the cancel flag, so abandoned tasks stop at their next check.

use super::worker::constants::{GENERATOR_WIDTH, SUBTASK_TIMEOUT};
use super::worker::panic_guard::panic_message;
use crate::domain::{plan_segments, DomainError, GenerationTask, MAX_PAYLOAD_LEN, MIN_PAYLOAD_LEN};
use crate::port::{CancelFlag, SegmentError, SegmentSource};
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Generation errors (all recoverable: the caller retries on its next iteration)
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Segment {index} timed out after {after:?}")]
    Timeout { index: usize, after: Duration },

    #[error("Segment {index} failed: {source}")]
    SubtaskFailed {
        index: usize,
        #[source]
        source: SegmentError,
    },

    #[error("Segment {index} panicked: {message}")]
    SubtaskPanicked { index: usize, message: String },

    #[error("Segment {index} cancelled")]
    Cancelled { index: usize },

    #[error("Segment {index} length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Pool width and per-task timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub width: usize,
    pub subtask_timeout: Duration,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            width: GENERATOR_WIDTH,
            subtask_timeout: SUBTASK_TIMEOUT,
        }
    }
}

/// Inclusive range producers draw payload sizes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadSizeRange {
    min: usize,
    max: usize,
}

impl PayloadSizeRange {
    pub fn new(min: usize, max: usize) -> Result<Self, DomainError> {
        if min > max {
            return Err(DomainError::ValidationError(format!(
                "payload size range {}..={} is empty",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Uniform sample from the range
    pub fn sample(&self) -> usize {
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

impl Default for PayloadSizeRange {
    fn default() -> Self {
        Self {
            min: MIN_PAYLOAD_LEN,
            max: MAX_PAYLOAD_LEN,
        }
    }
}

/// Builds payloads by scattering segment work and gathering it in order
pub struct PayloadGenerator {
    source: Arc<dyn SegmentSource>,
    settings: GeneratorSettings,
}

impl PayloadGenerator {
    /// Create a generator
    ///
    /// # Errors
    /// - DomainError::InvalidWidth if `settings.width` is zero
    pub fn new(source: Arc<dyn SegmentSource>, settings: GeneratorSettings) -> Result<Self, DomainError> {
        if settings.width == 0 {
            return Err(DomainError::InvalidWidth(settings.width));
        }
        Ok(Self { source, settings })
    }

    pub fn settings(&self) -> GeneratorSettings {
        self.settings
    }

    /// Generate a payload of exactly `total` characters.
    ///
    /// No partial payload is ever returned. By the time this returns, every
    /// sub-task spawned for the call has finished.
    ///
    /// The per-task timeout bounds how long one result is awaited, not how
    /// long the call takes: after a failure the cancelled stragglers are
    /// drained, so a source that ignores `CancelFlag` keeps the call open until
    /// its fill returns. If the future is dropped instead (shutdown, caller
    /// timeout) the flag is raised and nothing is awaited.
    pub async fn generate(&self, total: usize) -> Result<String, GenerationError> {
        let started = Instant::now();
        let tasks = plan_segments(total, self.settings.width);
        let cancel = CancelFlag::new();
        let _cancel_on_drop = CancelOnDrop(cancel.clone());

        let mut handles = tasks
            .iter()
            .map(|task| self.spawn_segment(*task, cancel.clone()))
            .collect::<Vec<_>>()
            .into_iter();

        let mut payload = String::with_capacity(total);
        let mut stragglers = Vec::new();
        let mut failure = None;

        for task in &tasks {
            let Some(mut handle) = handles.next() else {
                break;
            };

            match timeout(self.settings.subtask_timeout, &mut handle).await {
                Ok(Ok(Ok(segment))) if segment.len() == task.len => payload.push_str(&segment),
                Ok(Ok(Ok(segment))) => {
                    failure = Some(GenerationError::LengthMismatch {
                        index: task.index,
                        expected: task.len,
                        actual: segment.len(),
                    });
                }
                Ok(Ok(Err(SegmentError::Cancelled))) => {
                    failure = Some(GenerationError::Cancelled { index: task.index });
                }
                Ok(Ok(Err(source))) => {
                    failure = Some(GenerationError::SubtaskFailed {
                        index: task.index,
                        source,
                    });
                }
                Ok(Err(join_err)) if join_err.is_panic() => {
                    failure = Some(GenerationError::SubtaskPanicked {
                        index: task.index,
                        message: panic_message(join_err.into_panic()),
                    });
                }
                Ok(Err(_)) => {
                    failure = Some(GenerationError::Cancelled { index: task.index });
                }
                Err(_elapsed) => {
                    stragglers.push(handle);
                    failure = Some(GenerationError::Timeout {
                        index: task.index,
                        after: self.settings.subtask_timeout,
                    });
                }
            }

            if failure.is_some() {
                break;
            }
        }

        if let Some(err) = failure {
            stragglers.extend(handles);
            self.release(cancel, stragglers).await;
            warn!(total, error = %err, "Payload generation aborted");
            return Err(err);
        }

        debug!(
            total,
            width = self.settings.width,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Payload generated"
        );
        Ok(payload)
    }

    fn spawn_segment(
        &self,
        task: GenerationTask,
        cancel: CancelFlag,
    ) -> JoinHandle<Result<String, SegmentError>> {
        let source = Arc::clone(&self.source);
        tokio::task::spawn_blocking(move || source.fill(&task, &cancel))
    }

    /// Cancel and wait out every sub-task that has not been collected
    async fn release(&self, cancel: CancelFlag, stragglers: Vec<JoinHandle<Result<String, SegmentError>>>) {
        cancel.cancel();
        for handle in &stragglers {
            handle.abort();
        }
        let pending = stragglers.len();
        futures::future::join_all(stragglers).await;
        debug!(pending, "Generation sub-tasks released");
    }
}

/// Raises the flag when the owning generate call ends, however it ends
struct CancelOnDrop(CancelFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}
