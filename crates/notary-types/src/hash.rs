use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Keyed fingerprint of a record.
///
/// A `RecordHash` is the HMAC-SHA256 of a record's canonical bytes. It is the
/// value committed to the ledger and presented back by callers at
/// verification time, always exchanged as lowercase hex without a prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordHash([u8; 32]);

impl RecordHash {
    /// Create a `RecordHash` from a pre-computed digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex representation, no `0x` prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string, accepting an optional `0x` prefix and any case.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let normalized = normalize_hex(s);
        let bytes = hex::decode(&normalized).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for RecordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordHash({})", self.short_hex())
    }
}

impl fmt::Display for RecordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for RecordHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Normalize a hex hash string for comparison.
///
/// Trims surrounding whitespace, strips one `0x`/`0X` prefix and lowercases.
/// Strings that are not valid hex pass through otherwise unchanged, so a
/// forged or garbled hash still compares unequal instead of failing.
pub fn normalize_hex(s: &str) -> String {
    let trimmed = s.trim();
    let stripped = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    stripped.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let hash = RecordHash::from_digest([0xab; 32]);
        let parsed = RecordHash::from_hex(&hash.to_hex()).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn from_hex_accepts_prefix_and_uppercase() {
        let hash = RecordHash::from_digest([0xcd; 32]);
        let prefixed = format!("0x{}", hash.to_hex().to_uppercase());
        assert_eq!(RecordHash::from_hex(&prefixed).unwrap(), hash);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = RecordHash::from_hex("abcd").unwrap_err();
        assert_eq!(err, TypeError::InvalidLength { expected: 32, actual: 2 });
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(matches!(
            RecordHash::from_hex("not-hex"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn normalize_strips_prefix_once() {
        assert_eq!(normalize_hex("0xABcd"), "abcd");
        assert_eq!(normalize_hex("  0Xff "), "ff");
        assert_eq!(normalize_hex("abcd"), "abcd");
        assert_eq!(normalize_hex("0x0xab"), "0xab");
    }

    #[test]
    fn display_is_full_hex() {
        let hash = RecordHash::from_digest([1; 32]);
        let display = format!("{hash}");
        assert_eq!(display.len(), 64);
        assert_eq!(display, hash.to_hex());
    }

    #[test]
    fn debug_is_short() {
        let hash = RecordHash::from_digest([0x12; 32]);
        assert_eq!(format!("{hash:?}"), "RecordHash(12121212)");
    }
}
