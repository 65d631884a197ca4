//! Single-record staging: one file or one URL per invocation.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use bale_types::{ArtifactId, ArtifactRecord, Checksum, ContentType, StagedArtifact};

use crate::error::{StageError, StageResult};

/// Stage one file from disk.
///
/// The record takes the file name as its name and label, the stem as
/// its alias, and the content digest as its checksum. The returned
/// artifact is unattached: no envelope, not on the ledger, envelope
/// path `/`.
pub fn stage_file(path: impl AsRef<Path>, openchain: bool) -> StageResult<StagedArtifact> {
    let path = path.as_ref();
    let meta =
        std::fs::metadata(path).map_err(|_| StageError::MissingFile(path.to_path_buf()))?;
    if meta.is_dir() {
        return Err(StageError::IsDirectory(path.to_path_buf()));
    }
    if !meta.is_file() {
        return Err(StageError::NotRegular(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|source| StageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let checksum = Checksum::of_reader(BufReader::new(file)).map_err(|source| StageError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let name = file_name(path);
    let content_path = std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string();

    let record = ArtifactRecord {
        uuid: ArtifactId::generate(),
        name: name.clone(),
        alias: file_stem(path),
        label: name,
        checksum,
        content_type: ContentType::classify(&file_name(path)),
        openchain,
        timestamp: None,
        artifact_list: Vec::new(),
        uri_list: Vec::new(),
    };
    debug!(name = %record.name, checksum = %record.checksum, "file staged");
    Ok(StagedArtifact::new(record, content_path, "/".to_string()))
}

/// Stage one URL.
///
/// There is no content to fetch at staging time, so the checksum
/// digests the URL string itself. The display name keeps the scheme
/// and the last path segment with the middle elided.
pub fn stage_url(url: &str, openchain: bool) -> StageResult<StagedArtifact> {
    let lower = url.to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return Err(StageError::NotUrl(url.to_string()));
    }

    let segment = last_segment(url);
    let name = if lower.starts_with("https://") {
        format!("https://.../{segment}")
    } else {
        format!("http://.../{segment}")
    };

    let record = ArtifactRecord {
        uuid: ArtifactId::generate(),
        name,
        alias: segment.clone(),
        label: segment,
        checksum: Checksum::of_str(url),
        content_type: ContentType::Url,
        openchain,
        timestamp: None,
        artifact_list: Vec::new(),
        uri_list: Vec::new(),
    };
    debug!(name = %record.name, "url staged");
    Ok(StagedArtifact::new(record, url.to_string(), "/".to_string()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn last_segment(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}
