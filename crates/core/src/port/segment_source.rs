// Segment Source Port
// Produces the characters of one generation task on a blocking pool thread

use crate::domain::{GenerationTask, PAYLOAD_ALPHABET};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Characters produced between two cancellation checks (64 KiB)
pub const CANCEL_CHECK_INTERVAL: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("Segment cancelled")]
    Cancelled,

    #[error("Segment produced invalid text: {0}")]
    InvalidText(String),

    #[error("Segment failed: {0}")]
    Failed(String),
}

/// Cooperative cancellation flag shared by the sub-tasks of one generate call
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Fills one generation task
///
/// Called from a blocking thread. Long-running implementations should poll
/// `cancel` and return `SegmentError::Cancelled` once it is raised.
pub trait SegmentSource: Send + Sync {
    fn fill(&self, task: &GenerationTask, cancel: &CancelFlag) -> Result<String, SegmentError>;
}

/// Uniformly random uppercase letters, one independent RNG per task
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAlphabetSource;

impl SegmentSource for RandomAlphabetSource {
    fn fill(&self, task: &GenerationTask, cancel: &CancelFlag) -> Result<String, SegmentError> {
        let mut rng = SmallRng::from_entropy();
        let mut bytes = Vec::with_capacity(task.len);

        while bytes.len() < task.len {
            if cancel.is_cancelled() {
                return Err(SegmentError::Cancelled);
            }
            let chunk = CANCEL_CHECK_INTERVAL.min(task.len - bytes.len());
            bytes.extend(
                (0..chunk).map(|_| PAYLOAD_ALPHABET[rng.gen_range(0..PAYLOAD_ALPHABET.len())]),
            );
        }

        String::from_utf8(bytes).map_err(|e| SegmentError::InvalidText(e.to_string()))
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Fills task N with the N-th alphabet letter, so segment order is visible
    #[derive(Debug, Default)]
    pub struct IndexedSource;

    impl SegmentSource for IndexedSource {
        fn fill(&self, task: &GenerationTask, _cancel: &CancelFlag) -> Result<String, SegmentError> {
            let letter = PAYLOAD_ALPHABET[task.index % PAYLOAD_ALPHABET.len()] as char;
            Ok(std::iter::repeat(letter).take(task.len).collect())
        }
    }

    /// Behaviour of a scripted source for one task index
    #[derive(Debug, Clone)]
    pub enum ScriptedBehavior {
        /// Sleep for the duration (ignoring cancellation), then succeed
        Stall(Duration),
        /// Sleep for the duration, returning early once cancelled
        StallUntilCancelled(Duration),
        /// Return an error
        Fail(String),
        /// Panic with the message
        Panic(String),
    }

    /// Behaves like `IndexedSource` except for one scripted task index
    /// (or every task). Tracks how many fills are running at any moment.
    pub struct ScriptedSource {
        target_index: Option<usize>,
        behavior: ScriptedBehavior,
        active: AtomicUsize,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        pub fn new(target_index: usize, behavior: ScriptedBehavior) -> Self {
            Self::scripted(Some(target_index), behavior)
        }

        /// Apply `behavior` to every task
        pub fn every_task(behavior: ScriptedBehavior) -> Self {
            Self::scripted(None, behavior)
        }

        fn scripted(target_index: Option<usize>, behavior: ScriptedBehavior) -> Self {
            Self {
                target_index,
                behavior,
                active: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }

        /// Fills currently executing
        pub fn active(&self) -> usize {
            self.active.load(Ordering::SeqCst)
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    struct ActiveGuard<'a>(&'a AtomicUsize);

    impl Drop for ActiveGuard<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl SegmentSource for ScriptedSource {
        fn fill(&self, task: &GenerationTask, cancel: &CancelFlag) -> Result<String, SegmentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.active.fetch_add(1, Ordering::SeqCst);
            let _guard = ActiveGuard(&self.active);

            if self.target_index.map_or(true, |index| index == task.index) {
                match &self.behavior {
                    ScriptedBehavior::Stall(delay) => std::thread::sleep(*delay),
                    ScriptedBehavior::StallUntilCancelled(delay) => {
                        let deadline = std::time::Instant::now() + *delay;
                        while std::time::Instant::now() < deadline {
                            if cancel.is_cancelled() {
                                return Err(SegmentError::Cancelled);
                            }
                            std::thread::sleep(Duration::from_millis(5));
                        }
                    }
                    ScriptedBehavior::Fail(msg) => return Err(SegmentError::Failed(msg.clone())),
                    ScriptedBehavior::Panic(msg) => panic!("{}", msg),
                }
            }
            IndexedSource.fill(task, cancel)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_alphabet_length_and_charset() {
        let task = GenerationTask {
            index: 0,
            offset: 0,
            len: CANCEL_CHECK_INTERVAL * 2 + 17,
        };
        let text = RandomAlphabetSource.fill(&task, &CancelFlag::new()).unwrap();

        assert_eq!(text.len(), task.len);
        assert!(text.bytes().all(|b| b.is_ascii_uppercase()));
    }

    #[test]
    fn test_random_alphabet_honours_cancel() {
        let task = GenerationTask {
            index: 0,
            offset: 0,
            len: 1_000,
        };
        let cancel = CancelFlag::new();
        cancel.cancel();

        let result = RandomAlphabetSource.fill(&task, &cancel);
        assert!(matches!(result, Err(SegmentError::Cancelled)));
    }

    #[test]
    fn test_random_alphabet_empty_task() {
        let task = GenerationTask {
            index: 3,
            offset: 9,
            len: 0,
        };
        let cancel = CancelFlag::new();
        cancel.cancel();

        assert_eq!(RandomAlphabetSource.fill(&task, &cancel).unwrap(), "");
    }
}
