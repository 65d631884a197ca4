use thiserror::Error;

use bale_api::ApiError;
use bale_store::StoreError;
use bale_types::ArtifactId;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("staging store error: {0}")]
    Store(#[from] StoreError),

    #[error("ledger api error: {0}")]
    Api(#[from] ApiError),

    #[error("default part uuid is not set or not a valid uuid: '{0}'")]
    PartNotSet(String),

    #[error("record {0} is not an envelope")]
    NotAnEnvelope(ArtifactId),

    #[error("network '{0}' has no ledger nodes registered")]
    NoNodesRegistered(String),

    #[error("no active ledger node found on network '{0}'")]
    NoLiveNode(String),
}

pub type SyncResult<T> = Result<T, SyncError>;
