// Bufferline Infrastructure - System Adapters
// Implements: RecordSink, SizeReporter, interactive count prompt

pub mod console_reporter;
pub mod file_sink;
pub mod prompt;

pub use console_reporter::ConsoleSizeReporter;
pub use file_sink::FileRecordSink;
pub use prompt::prompt_count;
