//! Error types for availability-engine operations.
//!
//! Every variant describes bad caller input. The engine has no transient
//! failure mode and never retries; callers map these to validation-class
//! responses (e.g. HTTP 400).

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Invalid timezone: '{0}'")]
    InvalidTimeZone(String),

    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Unsupported recurrence type: '{0}'")]
    UnsupportedRecurrenceType(String),

    #[error("Ambiguous local time: {0}")]
    AmbiguousLocalTime(String),

    #[error("Input out of range: {0}")]
    InputOutOfRange(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl SchedulingError {
    /// Always `true`: the engine only fails on caller input, so no variant
    /// is worth retrying with the same arguments.
    pub fn is_caller_error(&self) -> bool {
        match self {
            SchedulingError::InvalidTimeZone(_)
            | SchedulingError::InvalidInterval { .. }
            | SchedulingError::UnsupportedRecurrenceType(_)
            | SchedulingError::AmbiguousLocalTime(_)
            | SchedulingError::InputOutOfRange(_)
            | SchedulingError::InvalidDatetime(_)
            | SchedulingError::Config(_) => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulingError>;
