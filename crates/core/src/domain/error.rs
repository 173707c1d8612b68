// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Not a number: {0:?}")]
    NotANumber(String),

    #[error("Value {value} out of range, expected {min}..={max}")]
    OutOfRange { value: i64, min: usize, max: usize },

    #[error("Invalid queue limits: capacity={capacity}, low_watermark={low_watermark}")]
    InvalidQueueLimits {
        capacity: usize,
        low_watermark: usize,
    },

    #[error("Invalid generator width: {0}")]
    InvalidWidth(usize),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
