use std::fmt;
use std::io::{self, Read};

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::TypeError;

/// Hex-encoded SHA-1 content digest.
///
/// SHA-1 is what the ledger's wire format expects, so it is kept: the
/// digest identifies content, it does not defend it against a prepared
/// attacker.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    /// Digest of a byte slice.
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        Self(hex::encode(hasher.finalize()))
    }

    /// Digest of a string's UTF-8 bytes. Used for URL artifacts (no
    /// fetchable content) and for named envelopes created empty.
    pub fn of_str(text: &str) -> Self {
        Self::of_bytes(text.as_bytes())
    }

    /// Streaming digest of a reader, for file content.
    pub fn of_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut hasher = Sha1::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(Self(hex::encode(hasher.finalize())))
    }

    /// Aggregate digest for an envelope: SHA-1 over the straight
    /// concatenation of the member checksums' hex strings, in traversal
    /// order. Two member lists with the same entries in different
    /// orders produce different digests; the ordering sensitivity is
    /// deliberate and matches what the ledger has on record.
    pub fn aggregate<'a, I>(members: I) -> Self
    where
        I: IntoIterator<Item = &'a Checksum>,
    {
        let mut concat = String::new();
        for member in members {
            concat.push_str(&member.0);
        }
        Self::of_bytes(concat.as_bytes())
    }

    /// Parse a 40-character hex digest, normalizing to lowercase.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.len() != 40 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidChecksum(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// The lowercase hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({})", &self.0[..8.min(self.0.len())])
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn of_bytes_matches_known_vector() {
        // sha1("abc")
        assert_eq!(
            Checksum::of_bytes(b"abc").as_str(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn of_str_hashes_utf8_bytes() {
        assert_eq!(Checksum::of_str("abc"), Checksum::of_bytes(b"abc"));
    }

    #[test]
    fn of_reader_matches_of_bytes() {
        let data = vec![7u8; 100_000]; // spans several read buffers
        let from_reader = Checksum::of_reader(&data[..]).unwrap();
        assert_eq!(from_reader, Checksum::of_bytes(&data));
    }

    #[test]
    fn aggregate_is_concatenation_digest() {
        let a = Checksum::of_bytes(b"one");
        let b = Checksum::of_bytes(b"two");
        let concat = format!("{}{}", a.as_str(), b.as_str());
        let list = vec![a, b];
        assert_eq!(
            Checksum::aggregate(list.iter()),
            Checksum::of_bytes(concat.as_bytes())
        );
    }

    #[test]
    fn aggregate_is_order_sensitive() {
        let a = Checksum::of_bytes(b"one");
        let b = Checksum::of_bytes(b"two");
        let ab = Checksum::aggregate(vec![a.clone(), b.clone()].iter());
        let ba = Checksum::aggregate(vec![b, a].iter());
        assert_ne!(ab, ba);
    }

    #[test]
    fn aggregate_of_empty_list_is_empty_digest() {
        assert_eq!(
            Checksum::aggregate(std::iter::empty()),
            Checksum::of_bytes(b"")
        );
    }

    #[test]
    fn parse_normalizes_case() {
        let c = Checksum::parse("A9993E364706816ABA3E25717850C26C9CD0D89D").unwrap();
        assert_eq!(c.as_str(), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn parse_rejects_wrong_length_and_non_hex() {
        assert!(Checksum::parse("abc123").is_err());
        assert!(Checksum::parse(&"g".repeat(40)).is_err());
    }

    proptest! {
        #[test]
        fn aggregate_is_deterministic(chunks in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..64),
            0..8,
        )) {
            let sums: Vec<Checksum> =
                chunks.iter().map(|c| Checksum::of_bytes(c)).collect();
            let first = Checksum::aggregate(sums.iter());
            let second = Checksum::aggregate(sums.iter());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn digest_is_always_40_hex_chars(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let c = Checksum::of_bytes(&data);
            prop_assert_eq!(c.as_str().len(), 40);
            prop_assert!(c.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
        }
    }
}
