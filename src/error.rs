//! Error types shared across the engine and its stores.
//!
//! Read commands never fail from the engine itself; mutations fail only when
//! the WAL append (the commit point) fails. Peer sink failures are handled by
//! eviction and never reach the caller of the originating operation.

use thiserror::Error;

/// Errors surfaced to callers of engine commands.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The feature payload failed validation (missing or non-string id,
    /// missing geometry, or no computable bounding rectangle).
    #[error("invalid feature payload: {0}")]
    InvalidPayload(String),

    /// WAL or snapshot I/O failure. In-memory state was not mutated.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The engine has stopped; the command was not (or will never be) served.
    #[error("engine stopped")]
    Stopped,
}

/// I/O-level failures from the WAL or snapshot stores.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failure writing to a peer sink. Triggers eviction of that peer; never
/// propagated to mutation callers.
#[derive(Debug, Error)]
#[error("peer sink closed")]
pub struct SinkError;
