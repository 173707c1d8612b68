// Console reporter for queue size samples
use bufferline_core::port::{ReportError, SizeReporter};
use tracing::info;

/// Emits `Queue size is <n>` on the `bufferline::monitor` target
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSizeReporter;

impl ConsoleSizeReporter {
    pub fn new() -> Self {
        Self
    }
}

impl SizeReporter for ConsoleSizeReporter {
    fn report(&self, size: usize) -> Result<(), ReportError> {
        info!(target: "bufferline::monitor", size, "Queue size is {}", size);
        Ok(())
    }
}
