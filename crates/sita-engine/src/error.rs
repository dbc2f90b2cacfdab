//! Error types for the scheduling engine.

use thiserror::Error;

use crate::time::ClockTime;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid clock time '{0}': expected HH:MM in 24-hour form")]
    InvalidTime(String),

    #[error("clock time out of range: {0} minutes from midnight")]
    TimeOutOfRange(u32),

    #[error("empty time range: {start} is not before {end}")]
    EmptyRange { start: ClockTime, end: ClockTime },
}

pub type Result<T> = std::result::Result<T, EngineError>;
