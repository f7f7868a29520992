use std::fmt;

use notary_types::{DomainKey, LedgerAddress, LedgerEntry, RecordHash, TransactionId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One submission attempt of a hash to the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitRequest {
    pub address: LedgerAddress,
    pub domain_key: DomainKey,
    pub hash: RecordHash,
    pub gas_budget: u64,
    /// Fresh per attempt; reusing one after a failure risks an idempotency
    /// conflict on the ledger.
    pub transaction_id: TransactionId,
}

impl SubmitRequest {
    /// Deterministic transaction hash for ledgers that do not mint their own.
    pub fn transaction_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.transaction_id.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(self.address.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(self.domain_key.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(self.hash.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// The entry a ledger stores for this submission. Hashes are stored
    /// `0x`-prefixed, the way contract storage renders bytes.
    pub fn to_entry(&self, submission_time: u64) -> LedgerEntry {
        LedgerEntry::new(
            self.domain_key.as_str(),
            format!("0x{}", self.hash.to_hex()),
            submission_time,
        )
    }
}

/// Handle to a dispatched transaction whose receipt has not been read yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTx {
    pub transaction_id: TransactionId,
    /// Hex hash of the submitted transaction.
    pub transaction_hash: String,
}

/// Final status reported by the ledger for a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Success,
    /// Any non-success status, carrying the ledger's status code.
    Other(String),
}

impl ReceiptStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Other(status) => write!(f, "{status}"),
        }
    }
}

/// Ledger receipt for a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_id: TransactionId,
    pub status: ReceiptStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(tx: &str) -> SubmitRequest {
        SubmitRequest {
            address: LedgerAddress::new("asset"),
            domain_key: DomainKey::new("A1").unwrap(),
            hash: RecordHash::from_digest([0xaa; 32]),
            gas_budget: 500_000,
            transaction_id: TransactionId::new(tx),
        }
    }

    #[test]
    fn transaction_hash_depends_on_transaction_id() {
        let a = request("tx-1").transaction_hash();
        let b = request("tx-2").transaction_hash();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(a, request("tx-1").transaction_hash());
    }

    #[test]
    fn entry_stores_prefixed_hash() {
        let entry = request("tx").to_entry(1_700_000_000);
        assert_eq!(entry.domain_key, "A1");
        assert_eq!(entry.stored_hash, format!("0x{}", "aa".repeat(32)));
        assert_eq!(entry.normalized_hash(), "aa".repeat(32));
    }

    #[test]
    fn status_display() {
        assert_eq!(ReceiptStatus::Success.to_string(), "SUCCESS");
        assert_eq!(
            ReceiptStatus::Other("INSUFFICIENT_TX_FEE".into()).to_string(),
            "INSUFFICIENT_TX_FEE"
        );
    }

    #[test]
    fn only_success_is_success() {
        assert!(ReceiptStatus::Success.is_success());
        assert!(!ReceiptStatus::Other("INVALID_TRANSACTION_START".into()).is_success());
    }
}
