// Worker Count Configuration

use super::error::{DomainError, Result};
use std::fmt;

/// Smallest accepted producer/consumer count
pub const MIN_WORKERS: usize = 1;

/// Largest accepted producer/consumer count
pub const MAX_WORKERS: usize = 10;

/// Validated worker count in `MIN_WORKERS..=MAX_WORKERS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkerCount(usize);

impl WorkerCount {
    pub fn new(value: usize) -> Result<Self> {
        if (MIN_WORKERS..=MAX_WORKERS).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::OutOfRange {
                value: value as i64,
                min: MIN_WORKERS,
                max: MAX_WORKERS,
            })
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse raw user input into a worker count.
///
/// Surrounding whitespace is ignored. Anything that is not an integer yields
/// `DomainError::NotANumber`; integers outside the range yield
/// `DomainError::OutOfRange`.
pub fn parse_count(raw: &str) -> Result<WorkerCount> {
    let trimmed = raw.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| DomainError::NotANumber(trimmed.to_string()))?;

    if value < MIN_WORKERS as i64 || value > MAX_WORKERS as i64 {
        return Err(DomainError::OutOfRange {
            value,
            min: MIN_WORKERS,
            max: MAX_WORKERS,
        });
    }

    WorkerCount::new(value as usize)
}

/// Producer/consumer counts, fixed for the lifetime of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub producers: WorkerCount,
    pub consumers: WorkerCount,
}

impl PipelineConfig {
    pub fn new(producers: WorkerCount, consumers: WorkerCount) -> Self {
        Self {
            producers,
            consumers,
        }
    }
}
