use hmac::{Hmac, Mac};
use notary_types::{Record, RecordHash};
use sha2::Sha256;

use crate::canonical::canonicalize;
use crate::error::HasherError;
use crate::secret::SecretKey;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 hasher bound to one secret key.
///
/// The MAC is keyed once at construction and cloned per hash, so a single
/// hasher can fingerprint any number of records.
#[derive(Clone)]
pub struct KeyedHasher {
    mac: HmacSha256,
}

impl KeyedHasher {
    /// Key a new hasher.
    pub fn new(key: &SecretKey) -> Result<Self, HasherError> {
        let mac = HmacSha256::new_from_slice(key.expose())
            .map_err(|e| HasherError::InvalidKey(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Keyed hash of raw bytes.
    pub fn hash(&self, data: &[u8]) -> RecordHash {
        let digest: [u8; 32] = self.mac.clone().chain_update(data).finalize().into_bytes().into();
        RecordHash::from_digest(digest)
    }

    /// Keyed hash of a record's canonical projection over `field_order`.
    pub fn hash_record<S: AsRef<str>>(&self, record: &Record, field_order: &[S]) -> RecordHash {
        self.hash(&canonicalize(record, field_order))
    }

    /// Constant-time check that `data` produces `expected`.
    pub fn verify(&self, data: &[u8], expected: &RecordHash) -> bool {
        self.mac
            .clone()
            .chain_update(data)
            .verify_slice(expected.as_bytes())
            .is_ok()
    }
}
