// Size Reporter Port
// Output channel for periodic queue-depth samples

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report rejected: {0}")]
    Rejected(String),
}

/// Receives queue size samples from the monitor
pub trait SizeReporter: Send + Sync {
    fn report(&self, size: usize) -> Result<(), ReportError>;
}

pub mod mocks {
    use super::*;
    use parking_lot::Mutex;

    /// Reporter that remembers every sample
    #[derive(Default)]
    pub struct RecordingReporter {
        samples: Mutex<Vec<usize>>,
    }

    impl RecordingReporter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn samples(&self) -> Vec<usize> {
            self.samples.lock().clone()
        }
    }

    impl SizeReporter for RecordingReporter {
        fn report(&self, size: usize) -> Result<(), ReportError> {
            self.samples.lock().push(size);
            Ok(())
        }
    }

    /// Reporter that fails on every call but counts them
    #[derive(Default)]
    pub struct FailingReporter {
        calls: Mutex<usize>,
    }

    impl FailingReporter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> usize {
            *self.calls.lock()
        }
    }

    impl SizeReporter for FailingReporter {
        fn report(&self, _size: usize) -> Result<(), ReportError> {
            *self.calls.lock() += 1;
            Err(ReportError::Rejected("mock reporter always fails".to_string()))
        }
    }
}
