// Queue Domain Model

use super::error::{DomainError, Result};

/// Hard ceiling on queued items
pub const DEFAULT_CAPACITY: usize = 100;

/// Producers parked at capacity resume only once size drops below this
pub const DEFAULT_LOW_WATERMARK: usize = 80;

/// Capacity ceiling and low watermark of a bounded queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueLimits {
    capacity: usize,
    low_watermark: usize,
}

impl QueueLimits {
    pub fn new(capacity: usize, low_watermark: usize) -> Result<Self> {
        if capacity == 0 || low_watermark > capacity {
            return Err(DomainError::InvalidQueueLimits {
                capacity,
                low_watermark,
            });
        }
        Ok(Self {
            capacity,
            low_watermark,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn low_watermark(&self) -> usize {
        self.low_watermark
    }

    /// `true` when a put must wait
    pub fn is_full(&self, len: usize) -> bool {
        len >= self.capacity
    }

    /// `true` when a take leaving `len` items must wake parked producers
    pub fn is_below_low_watermark(&self, len: usize) -> bool {
        len < self.low_watermark
    }
}

impl Default for QueueLimits {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            low_watermark: DEFAULT_LOW_WATERMARK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = QueueLimits::default();
        assert_eq!(limits.capacity(), 100);
        assert_eq!(limits.low_watermark(), 80);
    }

    #[test]
    fn test_watermark_boundaries_are_strict() {
        let limits = QueueLimits::default();
        assert!(!limits.is_full(99));
        assert!(limits.is_full(100));
        assert!(limits.is_below_low_watermark(79));
        assert!(!limits.is_below_low_watermark(80));
    }

    #[test]
    fn test_invalid_limits() {
        assert!(QueueLimits::new(0, 0).is_err());
        assert!(QueueLimits::new(10, 11).is_err());
        assert!(QueueLimits::new(10, 10).is_ok());
    }
}
