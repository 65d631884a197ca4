//! Boolean encoding shared by the ledger wire format and the staging
//! database: the literal strings `"true"` and `"false"`. In-memory
//! types carry real `bool`s; this module is the serialization boundary.

use serde::{Deserialize, Deserializer, Serializer};

use crate::error::TypeError;

/// Encode a flag for storage or the wire.
pub fn encode(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Decode a stored/wire flag, case-insensitively.
pub fn decode(s: &str) -> Result<bool, TypeError> {
    match s.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(TypeError::InvalidFlag(s.to_string())),
    }
}

/// Serde adapter: `#[serde(with = "bale_types::boolstr")]`.
pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(encode(*value))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let s = String::deserialize(deserializer)?;
    decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        assert_eq!(decode(encode(true)).unwrap(), true);
        assert_eq!(decode(encode(false)).unwrap(), false);
    }

    #[test]
    fn decode_is_case_insensitive() {
        assert_eq!(decode("TRUE").unwrap(), true);
        assert_eq!(decode("False").unwrap(), false);
    }

    #[test]
    fn decode_rejects_other_strings() {
        assert!(decode("yes").is_err());
        assert!(decode("1").is_err());
        assert!(decode("").is_err());
    }
}
