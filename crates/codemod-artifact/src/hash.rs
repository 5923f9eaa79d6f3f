//! Content hashing primitives
//!
//! Provides [`ContentHash`], a SHA-256 digest of file content, and
//! [`Fingerprint`], the short truncated form recorded in change records to
//! detect content change without storing full content twice.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};

/// Default number of hex characters kept in a [`Fingerprint`].
pub const FINGERPRINT_LEN: usize = 10;

/// Hex characters in an untruncated SHA-256 digest
pub const FULL_FINGERPRINT_LEN: usize = 64;

/// A 32-byte SHA-256 content hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Compute SHA-256 of text content
    #[must_use]
    pub fn of_text(text: &str) -> Self {
        Self(Sha256::digest(text.as_bytes()).into())
    }

    /// Truncate to a short hex fingerprint of `len` characters (max 64)
    #[must_use]
    pub fn fingerprint(&self, len: usize) -> Fingerprint {
        let mut hex = hex::encode(self.0);
        hex.truncate(len.clamp(1, FULL_FINGERPRINT_LEN));
        Fingerprint(hex)
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Short, deterministic one-way fingerprint of text content
///
/// Serialized as a bare lowercase hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint text with the default length
    #[must_use]
    pub fn of(text: &str) -> Self {
        Self::with_len(text, FINGERPRINT_LEN)
    }

    /// Fingerprint text keeping `len` hex characters
    #[must_use]
    pub fn with_len(text: &str, len: usize) -> Self {
        ContentHash::of_text(text).fingerprint(len)
    }

    /// Hex string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_matches_known_sha256() {
        let hash = ContentHash::of_text("hello world");
        assert_eq!(
            hash.to_string(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn fingerprint_is_stable_across_calls() {
        let a = ContentHash::of_text("test");
        assert_eq!(a, ContentHash::of_text("test"));
        assert_eq!(a.fingerprint(16).as_str(), &a.to_string()[..16]);
    }

    #[test]
    fn fingerprint_is_prefix_of_full_hash() {
        let fp = Fingerprint::of("hello world");
        assert_eq!(fp.as_str(), "b94d27b993");
        assert_eq!(fp.as_str().len(), FINGERPRINT_LEN);
    }

    #[test]
    fn fingerprint_of_empty_text() {
        // sha256("") = e3b0c442...
        assert_eq!(Fingerprint::of("").as_str(), "e3b0c44298");
    }

    #[test]
    fn fingerprint_length_is_clamped() {
        assert_eq!(Fingerprint::with_len("x", 0).as_str().len(), 1);
        assert_eq!(Fingerprint::with_len("x", 500).as_str().len(), 64);
    }

    #[test]
    fn fingerprint_serializes_as_string() {
        let fp = Fingerprint::of("abc");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{}\"", fp.as_str()));
    }
}
