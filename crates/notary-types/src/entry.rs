use serde::{Deserialize, Serialize};

use crate::domain::DomainKey;
use crate::hash::normalize_hex;

/// The ledger's view of a commitment, as returned by a read query.
///
/// Several entries may exist for one domain key; the ledger keeps them all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Domain key exactly as stored on the ledger.
    pub domain_key: String,
    /// Stored hash as hex, possibly `0x`-prefixed.
    pub stored_hash: String,
    /// Ledger-reported submission time in seconds since the Unix epoch.
    pub submission_time: u64,
}

impl LedgerEntry {
    pub fn new(domain_key: impl Into<String>, stored_hash: impl Into<String>, submission_time: u64) -> Self {
        Self {
            domain_key: domain_key.into(),
            stored_hash: stored_hash.into(),
            submission_time,
        }
    }

    /// Returns `true` if this entry belongs to the given key.
    pub fn belongs_to(&self, key: &DomainKey) -> bool {
        key.matches(&self.domain_key)
    }

    /// Stored hash without prefix, lowercased.
    pub fn normalized_hash(&self) -> String {
        normalize_hex(&self.stored_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_hash_strips_prefix() {
        let entry = LedgerEntry::new("A1", "0xABCD", 1);
        assert_eq!(entry.normalized_hash(), "abcd");
    }

    #[test]
    fn belongs_to_compares_normalized_keys() {
        let entry = LedgerEntry::new("42", "ab", 1);
        let key = DomainKey::from_value(&serde_json::json!(42)).unwrap();
        assert!(entry.belongs_to(&key));
        assert!(!entry.belongs_to(&DomainKey::new("43").unwrap()));
    }
}
