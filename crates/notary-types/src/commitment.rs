use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainKey;
use crate::hash::RecordHash;

/// Ledger-native identifier of a single submission attempt.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Wrap an identifier minted by a ledger.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh time-ordered identifier (UUID v7).
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.0)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A ledger-confirmed `(domain key, hash)` pair.
///
/// Created once per successful commit and never modified. The ledger owns the
/// commitment; this value is the caller's receipt for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub domain_key: DomainKey,
    pub canonical_hash: RecordHash,
    pub transaction_id: TransactionId,
    /// Hex hash of the confirmed ledger transaction.
    pub transaction_hash: String,
    pub submitted_at: DateTime<Utc>,
}

impl Commitment {
    /// Hex form of the committed hash, as handed back to callers.
    pub fn hash_hex(&self) -> String {
        self.canonical_hash.to_hex()
    }
}
