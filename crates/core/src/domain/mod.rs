// Domain Layer - Pure values and validation

pub mod config;
pub mod error;
pub mod generation;
pub mod queue;
pub mod record;

// Re-exports
pub use config::{parse_count, PipelineConfig, WorkerCount, MAX_WORKERS, MIN_WORKERS};
pub use error::DomainError;
pub use generation::{
    plan_segments, GenerationTask, MAX_PAYLOAD_LEN, MIN_PAYLOAD_LEN, PAYLOAD_ALPHABET,
};
pub use queue::{QueueLimits, DEFAULT_CAPACITY, DEFAULT_LOW_WATERMARK};
pub use record::Record;
