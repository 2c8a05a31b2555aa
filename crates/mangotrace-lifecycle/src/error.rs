//! Error types for asset operations.

use mango_core::{AssetStatus, BatchId};
use mangotrace_ledger::LedgerError;
use thiserror::Error;

use crate::engine::Action;

/// Result type alias for asset operations.
pub type TraceResult<T> = Result<T, TraceError>;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("batch {batch_id} does not exist")]
    NotFound { batch_id: BatchId },

    #[error("batch {batch_id} already exists")]
    AlreadyExists { batch_id: BatchId },

    /// The batch is left in ERROR when this is returned.
    #[error("cannot {action} batch {batch_id}: status is {actual}, expected {expected}")]
    InvalidTransition {
        batch_id: BatchId,
        action: Action,
        expected: AssetStatus,
        actual: AssetStatus,
    },

    #[error("malformed record at {key}: {reason}")]
    Serialization { key: String, reason: String },

    #[error("ledger unavailable: {0}")]
    StoreUnavailable(#[from] LedgerError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),
}
