//! Error taxonomy for the storage layer and its services.

use sita_engine::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A referenced session, thesis, room, or lecturer does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A scheduling rule rejected the write; nothing was persisted.
    #[error("schedule conflict: {0}")]
    Conflict(String),

    /// Input rejected before any query was issued.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Malformed clock time or interval.
    #[error(transparent)]
    Time(#[from] EngineError),

    /// Underlying SQLite failure, propagated unmodified.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
