use std::sync::Arc;

use notary_crypto::{canonical_string, KeyedHasher, SecretKey};
use notary_ledger::{LedgerReader, LedgerWriter};
use notary_types::{
    Commitment, DomainDescriptor, DomainKey, Record, RecordHash, VerificationReport,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::committer::HashCommitter;
use crate::config::NotaryConfig;
use crate::error::{NotaryError, NotaryResult};
use crate::trail::{DomainTrail, TrailBuilder};
use crate::verifier::TamperDetector;

/// Result of a successful commit, tagged with its domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub domain: String,
    /// Hex form of the committed hash.
    pub hash: String,
    #[serde(flatten)]
    pub commitment: Commitment,
}

/// Canonical form and keyed hash of a record, computed without the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fingerprint {
    pub canonical: String,
    pub hash: RecordHash,
}

/// High-level notary API over one ledger.
///
/// Holds no per-request state: the secret is passed to every call and
/// dropped with it.
pub struct Notary {
    config: NotaryConfig,
    committer: HashCommitter,
    detector: TamperDetector,
    reader: Arc<dyn LedgerReader>,
}

impl Notary {
    /// Build a notary from a validated config and separate ledger halves.
    pub fn new(
        config: NotaryConfig,
        writer: Arc<dyn LedgerWriter>,
        reader: Arc<dyn LedgerReader>,
    ) -> NotaryResult<Self> {
        config.validate()?;
        Ok(Self {
            committer: HashCommitter::new(writer, config.retry.clone()),
            detector: TamperDetector::new(reader.clone(), config.latest_entry),
            reader,
            config,
        })
    }

    /// Build a notary over a ledger implementing both halves.
    pub fn with_ledger<L>(config: NotaryConfig, ledger: Arc<L>) -> NotaryResult<Self>
    where
        L: LedgerWriter + LedgerReader + 'static,
    {
        Self::new(config, ledger.clone(), ledger)
    }

    pub fn config(&self) -> &NotaryConfig {
        &self.config
    }

    pub fn domains(&self) -> &[DomainDescriptor] {
        &self.config.domains
    }

    pub fn domain(&self, name: &str) -> NotaryResult<&DomainDescriptor> {
        self.config
            .domain(name)
            .ok_or_else(|| NotaryError::UnknownDomain(name.to_string()))
    }

    // ---- Hashing ----

    /// Canonicalize and hash a record without touching the ledger.
    pub fn fingerprint(
        &self,
        domain: &str,
        record: &Record,
        secret: &SecretKey,
    ) -> NotaryResult<Fingerprint> {
        let descriptor = self.domain(domain)?;
        let canonical = canonical_string(record, &descriptor.fields);
        let hash = KeyedHasher::new(secret)?.hash(canonical.as_bytes());
        Ok(Fingerprint { canonical, hash })
    }

    /// Fingerprint a whole request body. Fields outside the domain's field
    /// list are ignored.
    pub fn fingerprint_json(
        &self,
        domain: &str,
        body: &Value,
        secret: &SecretKey,
    ) -> NotaryResult<Fingerprint> {
        let record = project(self.domain(domain)?, body)?;
        self.fingerprint(domain, &record, secret)
    }

    // ---- Commit ----

    /// Commit `record` under an explicit key.
    pub async fn commit(
        &self,
        domain: &str,
        record: &Record,
        domain_key: &DomainKey,
        secret: &SecretKey,
    ) -> NotaryResult<CommitOutcome> {
        let descriptor = self.domain(domain)?;
        let commitment = self
            .committer
            .commit(descriptor, record, domain_key, secret)
            .await?;
        Ok(CommitOutcome {
            domain: descriptor.name.clone(),
            hash: commitment.hash_hex(),
            commitment,
        })
    }

    /// Commit `record`, taking its key from the domain's key field.
    pub async fn commit_record(
        &self,
        domain: &str,
        record: &Record,
        secret: &SecretKey,
    ) -> NotaryResult<CommitOutcome> {
        let key = key_of(self.domain(domain)?, record)?;
        self.commit(domain, record, &key, secret).await
    }

    /// Commit a whole request body. Fields outside the domain's field list
    /// are ignored.
    pub async fn commit_json(
        &self,
        domain: &str,
        body: &Value,
        secret: &SecretKey,
    ) -> NotaryResult<CommitOutcome> {
        let record = project(self.domain(domain)?, body)?;
        self.commit_record(domain, &record, secret).await
    }

    // ---- Verify ----

    /// Verify `record` under an explicit key against `claimed_hash`.
    pub async fn verify(
        &self,
        domain: &str,
        record: &Record,
        domain_key: &DomainKey,
        claimed_hash: &str,
        secret: &SecretKey,
    ) -> NotaryResult<VerificationReport> {
        let descriptor = self.domain(domain)?;
        self.detector
            .verify(descriptor, record, domain_key, claimed_hash, secret)
            .await
    }

    /// Verify `record`, taking its key from the domain's key field.
    pub async fn verify_record(
        &self,
        domain: &str,
        record: &Record,
        claimed_hash: &str,
        secret: &SecretKey,
    ) -> NotaryResult<VerificationReport> {
        let key = key_of(self.domain(domain)?, record)?;
        self.verify(domain, record, &key, claimed_hash, secret).await
    }

    /// Verify a whole request body; the claimed hash is read from the
    /// domain's hash field.
    pub async fn verify_json(
        &self,
        domain: &str,
        body: &Value,
        secret: &SecretKey,
    ) -> NotaryResult<VerificationReport> {
        let descriptor = self.domain(domain)?;
        let claimed = match body.get(&descriptor.hash_field) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::String(_)) | None | Some(Value::Null) => {
                return Err(missing_field(&descriptor.hash_field));
            }
            Some(_) => {
                return Err(NotaryError::Validation(format!(
                    "field {} must be a hex string",
                    descriptor.hash_field
                )));
            }
        };
        let record = project(descriptor, body)?;
        self.verify_record(domain, &record, &claimed, secret).await
    }

    // ---- Audit ----

    /// Every commitment recorded for a key, in ledger order.
    pub async fn trail(&self, domain: &str, key: &Value) -> NotaryResult<DomainTrail> {
        let descriptor = self.domain(domain)?;
        let key = DomainKey::from_value(key).map_err(|e| NotaryError::Validation(e.to_string()))?;
        TrailBuilder::fetch(self.reader.as_ref(), descriptor, &key).await
    }
}

fn missing_field(field: &str) -> NotaryError {
    NotaryError::Validation(format!("missing required field: {field}"))
}

/// Read and normalize the record's key field.
fn key_of(descriptor: &DomainDescriptor, record: &Record) -> NotaryResult<DomainKey> {
    match record.get(&descriptor.key_field) {
        None | Some(Value::Null) => Err(missing_field(&descriptor.key_field)),
        Some(value) => DomainKey::from_value(value).map_err(|e| {
            NotaryError::Validation(format!("{}: {e}", descriptor.key_field))
        }),
    }
}

/// Keep only the domain's hashed fields from a request body.
fn project(descriptor: &DomainDescriptor, body: &Value) -> NotaryResult<Record> {
    let Value::Object(map) = body else {
        return Err(NotaryError::Validation("request body must be a JSON object".into()));
    };
    let mut record = Record::new();
    for field in &descriptor.fields {
        if let Some(value) = map.get(field) {
            record
                .insert(field.clone(), value.clone())
                .map_err(|e| NotaryError::Validation(e.to_string()))?;
        }
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notary_ledger::InMemoryLedger;
    use notary_types::{LedgerAddress, Verdict};
    use serde_json::json;

    fn notary() -> (Notary, Arc<InMemoryLedger>) {
        let ledger = Arc::new(InMemoryLedger::new());
        let notary = Notary::with_ledger(NotaryConfig::default(), ledger.clone()).unwrap();
        (notary, ledger)
    }

    fn secret() -> SecretKey {
        SecretKey::from_text("k").unwrap()
    }

    #[test]
    fn unknown_domain() {
        let (notary, _) = notary();
        assert!(matches!(notary.domain("invoice"), Err(NotaryError::UnknownDomain(_))));
        assert_eq!(notary.domains().len(), 4);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = NotaryConfig::default();
        config.domains.clear();
        let ledger = Arc::new(InMemoryLedger::new());
        assert!(matches!(
            Notary::with_ledger(config, ledger),
            Err(NotaryError::Config(_))
        ));
    }

    #[test]
    fn fingerprint_nulls_missing_fields() {
        let (notary, _) = notary();
        let record = Record::from_json(json!({"prj_id": 7, "prj_name": "Mangrove"})).unwrap();
        let fp = notary.fingerprint("project", &record, &secret()).unwrap();
        assert_eq!(
            fp.canonical,
            r#"{"prj_id":7,"prj_name":"Mangrove","prj_company":null,"prj_description":null,"prj_nft_id":null,"prj_start_date":null,"prj_end_date":null}"#
        );
        let again = KeyedHasher::new(&secret()).unwrap().hash(fp.canonical.as_bytes());
        assert_eq!(fp.hash, again);
    }

    #[tokio::test]
    async fn fingerprint_json_matches_committed_hash() {
        let (notary, _) = notary();
        let body = json!({
            "asset_id": "A1",
            "quantity": 5,
            "unit_price": 10,
            "meta": {"source": "import", "tags": ["x"]}
        });
        let fp = notary.fingerprint_json("asset", &body, &secret()).unwrap();
        assert!(!fp.canonical.contains("meta"));
        let outcome = notary.commit_json("asset", &body, &secret()).await.unwrap();
        assert_eq!(fp.hash.to_hex(), outcome.hash);

        assert!(matches!(
            notary.fingerprint_json("asset", &json!([1]), &secret()),
            Err(NotaryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_before_ledger() {
        let (notary, ledger) = notary();
        let record = Record::from_json(json!({"quantity": 5})).unwrap();
        let err = notary.commit_record("asset", &record, &secret()).await.unwrap_err();
        assert!(matches!(err, NotaryError::Validation(msg) if msg == "missing required field: asset_id"));
        assert_eq!(ledger.submission_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn json_helpers_ignore_extra_fields() {
        let (notary, _) = notary();
        let body = json!({"asset_id": "A1", "quantity": 5, "unit_price": 10, "requested_by": "ops"});
        let outcome = notary.commit_json("asset", &body, &secret()).await.unwrap();
        assert_eq!(outcome.domain, "asset");
        assert_eq!(outcome.hash, outcome.commitment.hash_hex());

        let mut verify_body = body.clone();
        verify_body["asset_hash"] = json!(outcome.hash);
        verify_body["requested_by"] = json!("someone else");
        let report = notary.verify_json("asset", &verify_body, &secret()).await.unwrap();
        assert_eq!(report.verdict, Verdict::Verified);
    }

    #[tokio::test]
    async fn verify_json_requires_hash_field() {
        let (notary, _) = notary();
        let err = notary
            .verify_json("asset", &json!({"asset_id": "A1"}), &secret())
            .await
            .unwrap_err();
        assert!(matches!(err, NotaryError::Validation(msg) if msg.contains("asset_hash")));

        let err = notary
            .verify_json("asset", &json!({"asset_id": "A1", "asset_hash": 12}), &secret())
            .await
            .unwrap_err();
        assert!(matches!(err, NotaryError::Validation(_)));
    }

    #[tokio::test]
    async fn nested_body_field_is_rejected() {
        let (notary, _) = notary();
        let body = json!({"asset_id": "A1", "quantity": [1, 2]});
        let err = notary.commit_json("asset", &body, &secret()).await.unwrap_err();
        assert!(matches!(err, NotaryError::Validation(_)));
    }

    #[tokio::test]
    async fn trail_rejects_bad_key_type() {
        let (notary, ledger) = notary();
        ledger
            .append_entry(&LedgerAddress::new("asset"), notary_types::LedgerEntry::new("A1", "0x01", 1))
            .unwrap();
        assert!(matches!(
            notary.trail("asset", &json!(["A1"])).await,
            Err(NotaryError::Validation(_))
        ));
        assert_eq!(notary.trail("asset", &json!("A1")).await.unwrap().len(), 1);
    }
}
