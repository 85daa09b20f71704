//! Error types for qpmatch-core.
//!
//! Only [`EngineError`] ever reaches a `transform` caller. [`LookupError`] is
//! absorbed at the span level and [`CacheError`] at the cache boundary.

use std::time::Duration;

/// Caller precondition violations, reported before any lookup is issued.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}

/// A single lookup failed. The resolver turns every variant into "zero hits".
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
    #[error("lookup backend returned HTTP {status}")]
    Status { status: u16 },
    #[error("lookup backend failed: {0}")]
    Backend(String),
    #[error("could not decode lookup response: {0}")]
    Decode(String),
}

/// Durable cache tier failure.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache record is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("cache task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for CacheError {
    fn from(e: tokio::task::JoinError) -> Self {
        CacheError::Task(e.to_string())
    }
}
