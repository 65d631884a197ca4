use thiserror::Error;

/// Errors produced by identity and record operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid uuid: '{0}'")]
    InvalidUuid(String),

    #[error("invalid checksum: '{0}' is not a 40-character hex digest")]
    InvalidChecksum(String),

    #[error("invalid flag value: '{0}' (expected \"true\" or \"false\")")]
    InvalidFlag(String),

    #[error("unknown content type: '{0}'")]
    UnknownContentType(String),
}
