use chrono::{DateTime, Utc};
use notary_ledger::LedgerReader;
use notary_types::{DomainDescriptor, DomainKey, LedgerEntry};
use serde::{Deserialize, Serialize};

use crate::error::{NotaryError, NotaryResult};

/// One commitment in a record's history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailEntry {
    /// 1-based position among the key's entries, in ledger order.
    pub index: usize,
    /// Normalized hex hash.
    pub hash: String,
    /// Absent when the ledger's seconds value is out of range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_time: Option<DateTime<Utc>>,
}

/// Every commitment recorded for one domain key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainTrail {
    pub domain: String,
    pub domain_key: DomainKey,
    pub entries: Vec<TrailEntry>,
}

impl DomainTrail {
    /// The entry verification treats as authoritative under ledger order.
    pub fn latest(&self) -> Option<&TrailEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds audit trails from ledger reads.
pub struct TrailBuilder;

impl TrailBuilder {
    /// Project already-fetched entries onto the trail of `key`.
    pub fn build(domain: &DomainDescriptor, key: &DomainKey, entries: &[LedgerEntry]) -> DomainTrail {
        let entries = entries
            .iter()
            .filter(|e| e.belongs_to(key))
            .enumerate()
            .map(|(i, e)| TrailEntry {
                index: i + 1,
                hash: e.normalized_hash(),
                submission_time: i64::try_from(e.submission_time)
                    .ok()
                    .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            })
            .collect();

        DomainTrail {
            domain: domain.name.clone(),
            domain_key: key.clone(),
            entries,
        }
    }

    /// Read the domain's ledger scope and build the trail of `key`.
    pub async fn fetch(
        reader: &dyn LedgerReader,
        domain: &DomainDescriptor,
        key: &DomainKey,
    ) -> NotaryResult<DomainTrail> {
        let entries = reader.fetch_all(&domain.ledger_address).await?;
        let trail = Self::build(domain, key, &entries);
        if trail.is_empty() {
            return Err(NotaryError::NotFound {
                domain: domain.name.clone(),
                domain_key: key.clone(),
            });
        }
        Ok(trail)
    }
}
