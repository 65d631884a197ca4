//! Working directory discovery. A `.bale` directory marks the root and
//! holds the local config and the staging database; commands find it by
//! walking up from wherever they were invoked.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Name of the metadata directory that marks a bale working directory.
pub const BALE_DIR: &str = ".bale";

const LOCAL_CONFIG_FILE: &str = "config.yml";
const STAGING_DB_FILE: &str = "staging.db";

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not a bale working directory (no {BALE_DIR} here or in any parent); run 'bale init' first")]
    NotFound,

    #[error("cannot create '{}': {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// A discovered or freshly created working directory root.
#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Find the working directory governing the current directory.
    pub fn discover() -> Result<Self, WorkspaceError> {
        let cwd = std::env::current_dir().map_err(WorkspaceError::CurrentDir)?;
        Self::discover_from(&cwd)
    }

    /// Walk `start` and its ancestors looking for a `.bale` directory.
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        for dir in start.ancestors() {
            if dir.join(BALE_DIR).is_dir() {
                debug!(root = %dir.display(), "workspace found");
                return Ok(Self {
                    root: dir.to_path_buf(),
                });
            }
        }
        Err(WorkspaceError::NotFound)
    }

    /// Create the metadata directory under `root` unless it is already
    /// there. The flag reports whether this call created it.
    pub fn init(root: &Path) -> Result<(Self, bool), WorkspaceError> {
        let bale_dir = root.join(BALE_DIR);
        if bale_dir.is_dir() {
            return Ok((
                Self {
                    root: root.to_path_buf(),
                },
                false,
            ));
        }
        std::fs::create_dir_all(&bale_dir).map_err(|source| WorkspaceError::Create {
            path: bale_dir.clone(),
            source,
        })?;
        debug!(root = %root.display(), "workspace initialized");
        Ok((
            Self {
                root: root.to_path_buf(),
            },
            true,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bale_dir(&self) -> PathBuf {
        self.root.join(BALE_DIR)
    }

    pub fn local_config_path(&self) -> PathBuf {
        self.bale_dir().join(LOCAL_CONFIG_FILE)
    }

    pub fn db_path(&self) -> PathBuf {
        self.bale_dir().join(STAGING_DB_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_the_metadata_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (ws, created) = Workspace::init(dir.path()).unwrap();
        assert!(created);
        assert!(ws.bale_dir().is_dir());
        assert_eq!(ws.root(), dir.path());
    }

    #[test]
    fn second_init_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        Workspace::init(dir.path()).unwrap();
        let (_, created) = Workspace::init(dir.path()).unwrap();
        assert!(!created);
    }

    #[test]
    fn discovery_walks_up_from_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        Workspace::init(dir.path()).unwrap();
        let nested = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let ws = Workspace::discover_from(&nested).unwrap();
        assert_eq!(ws.root(), dir.path());
    }

    #[test]
    fn discovery_outside_any_workspace_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Workspace::discover_from(dir.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound));
    }

    #[test]
    fn a_stray_file_named_bale_is_not_a_workspace() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(BALE_DIR), b"not a directory").unwrap();
        let err = Workspace::discover_from(dir.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound));
    }

    #[test]
    fn paths_live_under_the_metadata_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (ws, _) = Workspace::init(dir.path()).unwrap();
        assert_eq!(
            ws.local_config_path(),
            dir.path().join(BALE_DIR).join("config.yml")
        );
        assert_eq!(ws.db_path(), dir.path().join(BALE_DIR).join("staging.db"));
    }
}
