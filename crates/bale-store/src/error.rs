use bale_types::ArtifactId;
use thiserror::Error;

/// Errors produced by staging store operations.
///
/// [`StoreError::Open`] is the only variant callers should treat as
/// fatal: without the staging database the tool has no usable state.
/// Everything else is recoverable per record or per query.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("staging database not accessible at '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("record {0} not found in the staging area")]
    NotFound(i64),

    #[error("no staged record with uuid {0}")]
    UnknownUuid(ArtifactId),

    #[error("corrupt staging row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },

    #[error("record field encoding: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
