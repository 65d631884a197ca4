use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;
use crate::content_type::ContentType;
use crate::id::ArtifactId;

/// Reference from an envelope to one direct member: the member's id and
/// its `/`-prefixed path relative to the envelope root. Computed once
/// when the envelope is built; a read-only snapshot, not kept live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub uuid: ArtifactId,
    pub path: String,
}

/// An external location where an artifact's bytes are hosted. All
/// fields are opaque to this client and forwarded to the ledger as-is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriRecord {
    pub version: String,
    pub checksum: String,
    pub content_type: String,
    pub size: String,
    pub uri_type: String,
    pub location: String,
}

/// The central entity: a leaf artifact (file or URL) or an envelope
/// (container of artifacts).
///
/// Identity (`uuid`) and content identity (`checksum`) are write-once.
/// Display metadata (`name`, `alias`, `label`) never feeds into either.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub uuid: ArtifactId,
    pub name: String,
    pub alias: String,
    pub label: String,
    pub checksum: Checksum,
    pub content_type: ContentType,
    #[serde(with = "crate::boolstr")]
    pub openchain: bool,
    /// Server-assigned registration time; absent until the record has
    /// been fetched back from the ledger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifact_list: Vec<ArtifactRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uri_list: Vec<UriRecord>,
}

impl ArtifactRecord {
    /// True for envelope (container) records.
    pub fn is_envelope(&self) -> bool {
        self.content_type.is_envelope()
    }
}

/// A record plus its local staging context: where the content came
/// from, where it sits inside its envelope, and the two lifecycle
/// flags. Produced by the staging builders, persisted by the store,
/// and mutated (flags only) by the sync engine.
#[derive(Clone, Debug, PartialEq)]
pub struct StagedArtifact {
    pub record: ArtifactRecord,
    /// Filesystem path or URL the content was staged from.
    pub content_path: String,
    /// `/`-prefixed path within the envelope; `/` for loose artifacts.
    pub envelope_path: String,
    /// Parent envelope, recorded once a push attaches the artifact.
    pub envelope: Option<ArtifactId>,
    /// Set only after the ledger acknowledged this record's push.
    pub on_ledger: bool,
}

impl StagedArtifact {
    /// Wrap a freshly built record in its initial staging state.
    pub fn new(record: ArtifactRecord, content_path: String, envelope_path: String) -> Self {
        Self {
            record,
            content_path,
            envelope_path,
            envelope: None,
            on_ledger: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_flags(self.on_ledger, self.envelope)
    }
}

/// Where a record sits between creation and ledger confirmation.
///
/// Derived from the two lifecycle flags, never stored directly:
/// `Staged` (no parent envelope, not on the ledger), `Assigned` (parent
/// envelope recorded, push not yet acknowledged), `Confirmed` (push
/// acknowledged by the ledger). Envelopes skip `Assigned` — their
/// parent is a part, tracked on the ledger side only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Staged,
    Assigned,
    Confirmed,
}

impl LifecycleState {
    /// Derive the state from the stored flag pair.
    pub fn from_flags(on_ledger: bool, envelope: Option<ArtifactId>) -> Self {
        match (on_ledger, envelope) {
            (true, _) => Self::Confirmed,
            (false, Some(_)) => Self::Assigned,
            (false, None) => Self::Staged,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staged => "staged",
            Self::Assigned => "assigned",
            Self::Confirmed => "confirmed",
        }
    }
}
