// Application Layer - Coordination services

pub mod generator;
pub mod pipeline;
pub mod queue;
pub mod worker;

// Re-exports
pub use generator::{GenerationError, GeneratorSettings, PayloadGenerator, PayloadSizeRange};
pub use pipeline::{Pipeline, PipelineHandle, PipelineSettings};
pub use queue::{BoundedQueue, BoundedStringQueue, QueueError, TryPutError};
pub use worker::{
    shutdown_channel, ConsumerWorker, PipelineStats, ProducerWorker, QueueMonitor, ShutdownSender,
    ShutdownToken, StateCell, StatsSnapshot, WorkerSettings, WorkerState,
};
