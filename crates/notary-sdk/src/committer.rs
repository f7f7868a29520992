use std::sync::Arc;

use chrono::Utc;
use notary_crypto::{KeyedHasher, SecretKey};
use notary_ledger::{LedgerError, LedgerWriter, SubmitRequest};
use notary_types::{Commitment, DomainDescriptor, DomainKey, Record, RecordHash};
use tracing::{debug, info, warn};

use crate::error::{NotaryError, NotaryResult};
use crate::retry::{sample_jitter, RetryMachine, RetryPolicy, RetryState};

/// Fingerprints records and commits the hash to the ledger.
///
/// A commit is attempted up to `max_retries` times in total. Each attempt
/// submits under a fresh transaction id, so an attempt that failed on the
/// wire but landed on the ledger can leave an extra entry behind. Readers
/// tolerate that: the latest matching entry wins.
pub struct HashCommitter {
    writer: Arc<dyn LedgerWriter>,
    policy: RetryPolicy,
}

impl HashCommitter {
    pub fn new(writer: Arc<dyn LedgerWriter>, policy: RetryPolicy) -> Self {
        Self { writer, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Hash `record` over the domain's field order and commit the hash.
    ///
    /// The hash is computed once; retries resubmit the same value.
    pub async fn commit(
        &self,
        domain: &DomainDescriptor,
        record: &Record,
        domain_key: &DomainKey,
        secret: &SecretKey,
    ) -> NotaryResult<Commitment> {
        let hash = KeyedHasher::new(secret)?.hash_record(record, &domain.fields);
        debug!(
            domain = %domain.name,
            domain_key = %domain_key,
            hash = %hash.short_hex(),
            "record hashed"
        );

        let mut machine = RetryMachine::new(self.policy.clone());
        let max_retries = machine.max_attempts();
        let mut last_error: Option<NotaryError> = None;

        loop {
            match machine.state() {
                RetryState::Attempting(attempt) => {
                    match self.submit_once(domain, domain_key, hash).await {
                        Ok(commitment) => {
                            machine.on_success();
                            info!(
                                domain = %domain.name,
                                domain_key = %domain_key,
                                attempt = attempt + 1,
                                transaction_id = %commitment.transaction_id,
                                "hash committed"
                            );
                            return Ok(commitment);
                        }
                        Err(e) => {
                            warn!(
                                domain = %domain.name,
                                domain_key = %domain_key,
                                attempt = attempt + 1,
                                max_retries,
                                error = %e,
                                "commit attempt failed"
                            );
                            last_error = Some(e);
                            machine.on_failure(sample_jitter());
                        }
                    }
                }
                RetryState::Backoff { next_attempt, delay } => {
                    debug!(
                        domain_key = %domain_key,
                        next_attempt = next_attempt + 1,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "backing off"
                    );
                    tokio::time::sleep(delay).await;
                    machine.resume();
                }
                RetryState::Exhausted { attempts } => {
                    let last = last_error.unwrap_or_else(|| {
                        NotaryError::Ledger(LedgerError::Submission("no attempt was made".into()))
                    });
                    warn!(
                        domain = %domain.name,
                        domain_key = %domain_key,
                        attempts,
                        "commit gave up; ledger state unknown"
                    );
                    return Err(NotaryError::RetriesExhausted {
                        domain_key: domain_key.clone(),
                        attempts,
                        last: Box::new(last),
                    });
                }
                // Unreachable: success returns from the attempt arm.
                RetryState::Succeeded => {
                    return Err(NotaryError::Ledger(LedgerError::Submission(
                        "retry loop resumed after success".into(),
                    )));
                }
            }
        }
    }

    async fn submit_once(
        &self,
        domain: &DomainDescriptor,
        domain_key: &DomainKey,
        hash: RecordHash,
    ) -> NotaryResult<Commitment> {
        let request = SubmitRequest {
            address: domain.ledger_address.clone(),
            domain_key: domain_key.clone(),
            hash,
            gas_budget: domain.gas_budget,
            transaction_id: self.writer.generate_transaction_id(),
        };

        let pending = self.writer.execute(&request).await?;
        let receipt = self.writer.await_receipt(&pending).await?;
        if !receipt.status.is_success() {
            return Err(NotaryError::LedgerRejected {
                transaction_id: receipt.transaction_id,
                status: receipt.status.to_string(),
            });
        }

        Ok(Commitment {
            domain_key: domain_key.clone(),
            canonical_hash: hash,
            transaction_id: pending.transaction_id,
            transaction_hash: pending.transaction_hash,
            submitted_at: Utc::now(),
        })
    }
}
