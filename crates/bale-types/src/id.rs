use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Client-assigned identity for an artifact or envelope record.
///
/// An `ArtifactId` is a random version-4 UUID generated once at staging
/// time and never reassigned. It is the only field used to correlate a
/// local record with its copy on the ledger. No uniqueness check is made
/// against the staging store; collision odds are accepted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from the hyphenated string form.
    ///
    /// The all-zeros UUID is accepted here; callers that treat it as an
    /// "unset" marker should go through [`ArtifactId::decode_opt`].
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| TypeError::InvalidUuid(s.to_string()))
    }

    /// First block of the hyphenated form (8 hex characters), for
    /// compact display next to names and aliases.
    pub fn short(&self) -> String {
        self.to_string()[..8].to_string()
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Encode an optional id for the database or the wire, where the
    /// all-zeros UUID stands for "unset".
    pub fn encode_opt(id: Option<ArtifactId>) -> String {
        match id {
            Some(id) => id.to_string(),
            None => Uuid::nil().to_string(),
        }
    }

    /// Decode a database/wire id where the all-zeros UUID stands for
    /// "unset".
    pub fn decode_opt(s: &str) -> Result<Option<ArtifactId>, TypeError> {
        let raw = Uuid::parse_str(s).map_err(|_| TypeError::InvalidUuid(s.to_string()))?;
        if raw.is_nil() {
            Ok(None)
        } else {
            Ok(Some(Self(raw)))
        }
    }
}

/// Check a string is a well-formed UUID without committing it to an
/// identity type. Part and organization ids stay as strings in config
/// but must still look like UUIDs before they go on the wire.
pub fn valid_uuid(s: &str) -> bool {
    Uuid::parse_str(s).is_ok()
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl fmt::Debug for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArtifactId({})", self.short())
    }
}

impl FromStr for ArtifactId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = ArtifactId::generate();
        let b = ArtifactId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_hyphenated_lowercase() {
        let id = ArtifactId::generate();
        let s = id.to_string();
        assert_eq!(s.len(), 36);
        assert_eq!(s, s.to_lowercase());
        assert_eq!(s.matches('-').count(), 4);
    }

    #[test]
    fn parse_roundtrip() {
        let id = ArtifactId::generate();
        let parsed = ArtifactId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(ArtifactId::parse("not-a-uuid").is_err());
        assert!(ArtifactId::parse("").is_err());
    }

    #[test]
    fn short_is_first_block() {
        let id = ArtifactId::parse("9f2b8a04-41cd-4f44-8a2a-61a54b2d8a11").unwrap();
        assert_eq!(id.short(), "9f2b8a04");
    }

    #[test]
    fn encode_opt_uses_nil_for_unset() {
        assert_eq!(
            ArtifactId::encode_opt(None),
            "00000000-0000-0000-0000-000000000000"
        );
        let id = ArtifactId::generate();
        assert_eq!(ArtifactId::encode_opt(Some(id)), id.to_string());
    }

    #[test]
    fn decode_opt_maps_nil_to_none() {
        let none = ArtifactId::decode_opt("00000000-0000-0000-0000-000000000000").unwrap();
        assert_eq!(none, None);
        let id = ArtifactId::generate();
        let some = ArtifactId::decode_opt(&id.to_string()).unwrap();
        assert_eq!(some, Some(id));
    }

    #[test]
    fn decode_opt_rejects_malformed() {
        assert!(ArtifactId::decode_opt("zzz").is_err());
    }

    #[test]
    fn serde_roundtrip_as_plain_string() {
        let id = ArtifactId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: ArtifactId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn valid_uuid_accepts_uuids_only() {
        assert!(valid_uuid("9f2b8a04-41cd-4f44-8a2a-61a54b2d8a11"));
        assert!(valid_uuid("00000000-0000-0000-0000-000000000000"));
        assert!(!valid_uuid("9f2b8a04"));
        assert!(!valid_uuid(""));
    }
}
