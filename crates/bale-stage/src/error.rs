use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning files, URLs, or directories into
/// staged records.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("no such file: '{}'", .0.display())]
    MissingFile(PathBuf),

    #[error("'{}' is a directory; stage it with --dir to build an envelope", .0.display())]
    IsDirectory(PathBuf),

    #[error("'{}' is not a regular file", .0.display())]
    NotRegular(PathBuf),

    #[error("'{}' is not a directory", .0.display())]
    NotDirectory(PathBuf),

    #[error("'{0}' is not an http or https url")]
    NotUrl(String),

    #[error("could not read '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("directory walk failed")]
    Walk(#[from] walkdir::Error),
}

pub type StageResult<T> = Result<T, StageError>;
