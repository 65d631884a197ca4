//! Wire records exchanged with the ledger gateway and the atlas
//! directory, beyond the artifact payloads defined in `bale-types`.

use serde::{Deserialize, Serialize};

use bale_types::ArtifactId;

/// Signing keys sent with every mutating request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub public_key: String,
    pub private_key: String,
}

impl Credentials {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }
}

/// Membership relation posted after an artifact lands on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeLink {
    pub artifact_uuid: ArtifactId,
    pub envelope_uuid: ArtifactId,
    pub path: String,
}

/// Relation binding an envelope to the part it documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartLink {
    pub part_uuid: String,
    pub artifact_uuid: ArtifactId,
}

/// Part record as the ledger returns it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartRecord {
    pub uuid: String,
    pub name: String,
    pub version: String,
    pub label: String,
    pub alias: String,
    pub licensing: String,
    pub description: String,
    pub checksum: String,
    pub src_uri: String,
    pub url: String,
    pub status: String,
}

/// One ledger node registered with the atlas directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerNodeRecord {
    pub uuid: String,
    pub name: String,
    pub network_name: String,
    pub alias: String,
    pub api_url: String,
    pub description: String,
    pub status: String,
}

/// One supply-chain network known to the atlas directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSpaceRecord {
    pub name: String,
    pub status: String,
    pub description: String,
}
