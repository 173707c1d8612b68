// Port Layer - Interfaces for external collaborators

pub mod record_sink;
pub mod segment_source;
pub mod size_reporter;

// Re-exports
pub use record_sink::{RecordSink, SinkError};
pub use segment_source::{CancelFlag, RandomAlphabetSource, SegmentError, SegmentSource};
pub use size_reporter::{ReportError, SizeReporter};
