//! Envelope builders: a named empty container, or a directory tree
//! staged as one envelope record plus one member record per file.

use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use bale_types::{ArtifactId, ArtifactRecord, ArtifactRef, Checksum, ContentType, StagedArtifact};

use crate::error::{StageError, StageResult};

/// Member count above which an envelope is considered unusually large.
pub const FILE_WARNING_THRESHOLD: usize = 49;

/// The product of a directory build: the container record and its
/// member records, in walk order. Nothing is persisted here; the
/// caller decides what to keep.
#[derive(Clone, Debug)]
pub struct EnvelopeBundle {
    pub envelope: StagedArtifact,
    pub members: Vec<StagedArtifact>,
}

impl EnvelopeBundle {
    pub fn file_count(&self) -> usize {
        self.members.len()
    }

    /// True when the member count crosses [`FILE_WARNING_THRESHOLD`].
    pub fn oversized(&self) -> bool {
        self.members.len() > FILE_WARNING_THRESHOLD
    }
}

/// Create a named envelope with no members yet.
///
/// With no content to digest, the checksum covers the name itself.
/// Members accumulate later as plain staged artifacts and are attached
/// at push time.
pub fn named_envelope(name: &str, openchain: bool) -> StagedArtifact {
    let record = ArtifactRecord {
        uuid: ArtifactId::generate(),
        name: name.to_string(),
        alias: name.to_string(),
        label: name.to_string(),
        checksum: Checksum::of_str(name),
        content_type: ContentType::Envelope,
        openchain,
        timestamp: None,
        artifact_list: Vec::new(),
        uri_list: Vec::new(),
    };
    StagedArtifact::new(record, String::new(), "/".to_string())
}

/// Build an envelope from a directory tree.
///
/// The walk visits each directory's entries in file-name order and
/// descends depth first, so the member order is stable across runs.
/// Hidden entries (a leading dot on any component below the root) are
/// pruned, directories themselves produce no records, and every member
/// carries a `/`-prefixed path relative to the root. The envelope
/// checksum aggregates the member checksums in walk order, and the
/// child list snapshots `(uuid, path)` pairs in the same order.
pub fn build_envelope(directory: impl AsRef<Path>, openchain: bool) -> StageResult<EnvelopeBundle> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        return Err(StageError::NotDirectory(directory.to_path_buf()));
    }

    let mut members = Vec::new();
    let walker = WalkDir::new(directory).sort_by_file_name().into_iter();
    for entry in walker.filter_entry(|e| e.depth() == 0 || !hidden(e.file_name())) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(directory)
            .expect("walk entries stay under the walk root");

        let file = File::open(entry.path()).map_err(|source| StageError::Read {
            path: entry.path().to_path_buf(),
            source,
        })?;
        let checksum =
            Checksum::of_reader(BufReader::new(file)).map_err(|source| StageError::Read {
                path: entry.path().to_path_buf(),
                source,
            })?;

        let file_name = entry.file_name().to_string_lossy().into_owned();
        let record = ArtifactRecord {
            uuid: ArtifactId::generate(),
            name: file_name.clone(),
            alias: file_name.clone(),
            label: file_name.clone(),
            checksum,
            content_type: ContentType::classify(&file_name),
            openchain,
            timestamp: None,
            artifact_list: Vec::new(),
            uri_list: Vec::new(),
        };
        members.push(StagedArtifact::new(
            record,
            entry.path().display().to_string(),
            slash_path(relative),
        ));
    }

    let checksum = Checksum::aggregate(members.iter().map(|m| &m.record.checksum));
    let artifact_list: Vec<ArtifactRef> = members
        .iter()
        .map(|m| ArtifactRef {
            uuid: m.record.uuid,
            path: m.envelope_path.clone(),
        })
        .collect();

    let name = envelope_name(directory);
    let record = ArtifactRecord {
        uuid: ArtifactId::generate(),
        name: name.clone(),
        alias: name.clone(),
        label: name,
        checksum,
        content_type: ContentType::Envelope,
        openchain,
        timestamp: None,
        artifact_list,
        uri_list: Vec::new(),
    };
    let envelope = StagedArtifact::new(
        record,
        directory.display().to_string(),
        "/".to_string(),
    );

    if members.len() > FILE_WARNING_THRESHOLD {
        warn!(files = members.len(), envelope = %envelope.record.name, "unusually large envelope");
    }
    debug!(envelope = %envelope.record.name, files = members.len(), "envelope built");
    Ok(EnvelopeBundle { envelope, members })
}

fn hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Join path components with `/` regardless of platform separator.
fn slash_path(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("/{}", parts.join("/"))
}

/// The envelope takes the directory's base name, suffixed `.env`
/// unless it already carries that extension.
fn envelope_name(directory: &Path) -> String {
    let base = directory
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .or_else(|| {
            std::path::absolute(directory)
                .ok()
                .and_then(|p| p.file_name().map(|s| s.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "envelope".to_string());
    if base.ends_with(".env") {
        base
    } else {
        format!("{base}.env")
    }
}
