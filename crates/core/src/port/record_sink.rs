// Record Sink Port
// Where consumers persist transformed records

use crate::domain::Record;
use async_trait::async_trait;
use thiserror::Error;

/// Sink errors
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

/// Append-only destination for records
///
/// Implementations must write each record as one whole line; concurrent
/// appends may interleave between lines but never within one.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Append one record as a newline-terminated line
    ///
    /// # Errors
    /// - SinkError::Io if the underlying write fails
    async fn append(&self, record: &Record) -> Result<(), SinkError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use parking_lot::Mutex;

    /// In-memory sink collecting rendered lines
    #[derive(Default)]
    pub struct MemorySink {
        lines: Mutex<Vec<String>>,
    }

    impl MemorySink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().clone()
        }

        pub fn len(&self) -> usize {
            self.lines.lock().len()
        }

        pub fn is_empty(&self) -> bool {
            self.lines.lock().is_empty()
        }
    }

    #[async_trait]
    impl RecordSink for MemorySink {
        async fn append(&self, record: &Record) -> Result<(), SinkError> {
            self.lines.lock().push(record.to_string());
            Ok(())
        }
    }

    /// Sink whose appends wait until `open` is called, then behave like `MemorySink`
    pub struct GatedSink {
        gate: tokio::sync::watch::Sender<bool>,
        waiting: std::sync::atomic::AtomicUsize,
        inner: MemorySink,
    }

    impl Default for GatedSink {
        fn default() -> Self {
            Self {
                gate: tokio::sync::watch::channel(false).0,
                waiting: Default::default(),
                inner: MemorySink::new(),
            }
        }
    }

    impl GatedSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Release every pending and future append
        pub fn open(&self) {
            self.gate.send_replace(true);
        }

        /// Appends currently held at the gate
        pub fn waiting(&self) -> usize {
            self.waiting.load(std::sync::atomic::Ordering::SeqCst)
        }

        pub fn lines(&self) -> Vec<String> {
            self.inner.lines()
        }
    }

    #[async_trait]
    impl RecordSink for GatedSink {
        async fn append(&self, record: &Record) -> Result<(), SinkError> {
            use std::sync::atomic::Ordering;

            self.waiting.fetch_add(1, Ordering::SeqCst);
            let mut gate = self.gate.subscribe();
            let opened = gate.wait_for(|open| *open).await.is_ok();
            self.waiting.fetch_sub(1, Ordering::SeqCst);

            if !opened {
                return Err(SinkError::Unavailable("gate dropped".to_string()));
            }
            self.inner.append(record).await
        }
    }

    /// Sink that rejects every write
    #[derive(Default)]
    pub struct FailingSink {
        attempts: Mutex<usize>,
    }

    impl FailingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn attempts(&self) -> usize {
            *self.attempts.lock()
        }
    }

    #[async_trait]
    impl RecordSink for FailingSink {
        async fn append(&self, _record: &Record) -> Result<(), SinkError> {
            *self.attempts.lock() += 1;
            Err(SinkError::Unavailable("mock sink always fails".to_string()))
        }
    }
}
