use crate::common::Timestamp;
use thiserror::Error;

/// Tagged errors the engine can return. Never logged or swallowed internally
/// — every fallible operation propagates one of these to its caller, who
/// decides whether it is fatal for the call or recoverable.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CarbonaraError {
    #[error("{bad_timestamp} is before {first_timestamp}")]
    BackWindowViolation {
        bad_timestamp: Timestamp,
        first_timestamp: Timestamp,
    },

    #[error("Invalid aggregation method: {name}")]
    InvalidAggregationMethod { name: String },

    #[error("Cannot aggregate timeseries: {reason}")]
    UnAggregableTimeseries { reason: String },

    #[error("Length mismatch: {timestamps} timestamps, {values} values")]
    LengthMismatch { timestamps: usize, values: usize },

    #[error("Cannot serialize archive: {reason}")]
    Serialization { reason: String },

    #[error("Cannot deserialize archive: {reason}")]
    Deserialization { reason: String },

    #[error("Invalid duration: {input}")]
    InvalidDuration { input: String },

    #[error("Invalid timestamp: {input}")]
    InvalidTimestamp { input: String },
}

pub type CarbonaraResult<T> = Result<T, CarbonaraError>;
