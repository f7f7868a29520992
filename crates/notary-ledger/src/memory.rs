use std::collections::{HashMap, VecDeque};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use notary_types::{LedgerAddress, LedgerEntry, TransactionId};
use tracing::debug;

use crate::error::LedgerError;
use crate::records::{PendingTx, Receipt, ReceiptStatus, SubmitRequest};
use crate::traits::{LedgerReader, LedgerWriter};

/// In-memory ledger for tests, local demos, and embedding.
///
/// Entries are appended at dispatch time and read back in append order.
/// A queue of scripted receipt statuses lets tests make the next
/// submissions come back rejected.
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    streams: HashMap<LedgerAddress, Vec<LedgerEntry>>,
    receipts: HashMap<TransactionId, ReceiptStatus>,
    scripted_failures: VecDeque<String>,
    submissions: u64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
        }
    }

    /// Append an entry directly, bypassing submission.
    pub fn append_entry(&self, address: &LedgerAddress, entry: LedgerEntry) -> Result<(), LedgerError> {
        let mut state = self.write()?;
        state.streams.entry(address.clone()).or_default().push(entry);
        Ok(())
    }

    /// Make the next `count` submissions produce a receipt with `status`
    /// instead of succeeding. Rejected submissions store no entry.
    pub fn fail_next(&self, count: usize, status: &str) -> Result<(), LedgerError> {
        let mut state = self.write()?;
        state
            .scripted_failures
            .extend(std::iter::repeat(status.to_string()).take(count));
        Ok(())
    }

    /// Number of `execute` calls seen so far, including rejected ones.
    pub fn submission_count(&self) -> Result<u64, LedgerError> {
        Ok(self.read()?.submissions)
    }

    /// Number of entries stored under an address.
    pub fn entry_count(&self, address: &LedgerAddress) -> Result<usize, LedgerError> {
        Ok(self.read()?.streams.get(address).map_or(0, Vec::len))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn now_secs() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

#[async_trait]
impl LedgerWriter for InMemoryLedger {
    async fn execute(&self, request: &SubmitRequest) -> Result<PendingTx, LedgerError> {
        let mut state = self.write()?;
        state.submissions += 1;

        if state.receipts.contains_key(&request.transaction_id) {
            return Err(LedgerError::Submission(format!(
                "duplicate transaction id {}",
                request.transaction_id
            )));
        }

        let status = match state.scripted_failures.pop_front() {
            Some(code) => ReceiptStatus::Other(code),
            None => ReceiptStatus::Success,
        };

        if status.is_success() {
            let entry = request.to_entry(now_secs());
            state
                .streams
                .entry(request.address.clone())
                .or_default()
                .push(entry);
        }
        state.receipts.insert(request.transaction_id.clone(), status);

        debug!(
            address = %request.address,
            domain_key = %request.domain_key,
            transaction_id = %request.transaction_id,
            "in-memory submission"
        );

        Ok(PendingTx {
            transaction_id: request.transaction_id.clone(),
            transaction_hash: request.transaction_hash(),
        })
    }

    async fn await_receipt(&self, pending: &PendingTx) -> Result<Receipt, LedgerError> {
        let state = self.read()?;
        let status = state
            .receipts
            .get(&pending.transaction_id)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownTransaction(pending.transaction_id.clone()))?;
        Ok(Receipt {
            transaction_id: pending.transaction_id.clone(),
            status,
        })
    }
}

#[async_trait]
impl LedgerReader for InMemoryLedger {
    async fn fetch_all(&self, address: &LedgerAddress) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.read()?.streams.get(address).cloned().unwrap_or_default())
    }
}
