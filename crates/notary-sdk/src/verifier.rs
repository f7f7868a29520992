//! Three-way tamper detection.
//!
//! Verification compares three hashes: the one the caller presents, the
//! latest one the ledger holds for the record's key, and the one recomputed
//! from the record as it stands now. The verdict separates a forged proof
//! (`HashTampered`) from an altered record (`DataTampered`).

use std::sync::Arc;

use notary_crypto::{KeyedHasher, SecretKey};
use notary_ledger::LedgerReader;
use notary_types::{
    normalize_hex, DomainDescriptor, DomainKey, LedgerEntry, Record, Verdict, VerificationHashes,
    VerificationReport,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{NotaryError, NotaryResult};

/// How the authoritative entry is chosen among a key's ledger entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatestEntryRule {
    /// The last matching entry in the order the ledger returns them.
    #[default]
    LedgerOrder,
    /// The matching entry with the greatest submission time; ties keep
    /// ledger order, so the later-returned entry wins.
    SubmissionTime,
}

/// Classify a claimed hash against the ledger and recomputed hashes.
///
/// The claim is compared exactly as presented. The ledger hash is reduced
/// to bare lowercase hex, the form the recomputed hash already has.
pub fn classify(provided: &str, ledger: &str, recomputed: &str) -> Verdict {
    let ledger = normalize_hex(ledger);

    if provided != ledger && provided != recomputed {
        Verdict::HashTampered
    } else if recomputed != provided || recomputed != ledger {
        Verdict::DataTampered
    } else {
        Verdict::Verified
    }
}

/// Pick the authoritative entry for `key`, filtering before choosing.
pub fn select_latest<'a>(
    entries: &'a [LedgerEntry],
    key: &DomainKey,
    rule: LatestEntryRule,
) -> Option<&'a LedgerEntry> {
    let matching = entries.iter().filter(|e| e.belongs_to(key));
    match rule {
        LatestEntryRule::LedgerOrder => matching.last(),
        // `max_by_key` returns the last of equal maxima.
        LatestEntryRule::SubmissionTime => matching.max_by_key(|e| e.submission_time),
    }
}

/// Verifies records against their latest ledger commitment.
pub struct TamperDetector {
    reader: Arc<dyn LedgerReader>,
    rule: LatestEntryRule,
}

impl TamperDetector {
    pub fn new(reader: Arc<dyn LedgerReader>, rule: LatestEntryRule) -> Self {
        Self { reader, rule }
    }

    pub fn rule(&self) -> LatestEntryRule {
        self.rule
    }

    /// Verify `record` under `domain_key` against `claimed_hash`.
    ///
    /// Tampering is reported through the verdict, not as an error. Errors
    /// are reserved for bad input, an unknown key and ledger read failures.
    pub async fn verify(
        &self,
        domain: &DomainDescriptor,
        record: &Record,
        domain_key: &DomainKey,
        claimed_hash: &str,
        secret: &SecretKey,
    ) -> NotaryResult<VerificationReport> {
        if claimed_hash.trim().is_empty() {
            return Err(NotaryError::Validation("claimed hash is empty".into()));
        }

        let entries = self.reader.fetch_all(&domain.ledger_address).await?;
        if self.rule == LatestEntryRule::LedgerOrder {
            check_monotonic(&entries, domain_key);
        }
        let latest = select_latest(&entries, domain_key, self.rule).ok_or_else(|| {
            NotaryError::NotFound {
                domain: domain.name.clone(),
                domain_key: domain_key.clone(),
            }
        })?;

        let recomputed = KeyedHasher::new(secret)?.hash_record(record, &domain.fields);
        let hashes = VerificationHashes {
            provided: claimed_hash.to_string(),
            ledger: latest.normalized_hash(),
            recomputed: recomputed.to_hex(),
        };
        let verdict = classify(&hashes.provided, &hashes.ledger, &hashes.recomputed);

        if verdict.is_verified() {
            info!(domain = %domain.name, domain_key = %domain_key, "record verified");
        } else {
            warn!(
                domain = %domain.name,
                domain_key = %domain_key,
                verdict = %verdict,
                "tampering detected"
            );
        }
        debug!(
            provided = %hashes.provided,
            ledger = %hashes.ledger,
            recomputed = %hashes.recomputed,
            "verification hashes"
        );

        Ok(VerificationReport {
            domain: domain.name.clone(),
            domain_key: domain_key.clone(),
            verdict,
            hashes,
        })
    }
}

/// Warn when a key's entries come back with decreasing submission times,
/// meaning positional "latest" may not be the newest commitment.
fn check_monotonic(entries: &[LedgerEntry], key: &DomainKey) {
    let times: Vec<u64> = entries
        .iter()
        .filter(|e| e.belongs_to(key))
        .map(|e| e.submission_time)
        .collect();
    if times.windows(2).any(|w| w[1] < w[0]) {
        warn!(
            domain_key = %key,
            entries = times.len(),
            "ledger returned entries out of submission order; using positional latest"
        );
    }
}
