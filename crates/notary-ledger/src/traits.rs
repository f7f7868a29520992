use async_trait::async_trait;
use notary_types::{LedgerAddress, LedgerEntry, TransactionId};

use crate::error::LedgerError;
use crate::records::{PendingTx, Receipt, SubmitRequest};

/// Write boundary: dispatch a hash commitment and read back its receipt.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Mint a transaction identifier for the next attempt.
    ///
    /// Ledgers with their own identifier scheme (account plus valid-start
    /// time, nonce, ...) override this.
    fn generate_transaction_id(&self) -> TransactionId {
        TransactionId::generate()
    }

    /// Dispatch a submission. Fails with [`LedgerError::Submission`] when the
    /// ledger rejects it before inclusion.
    async fn execute(&self, request: &SubmitRequest) -> Result<PendingTx, LedgerError>;

    /// Wait until the ledger reports a final status for a dispatched
    /// transaction.
    async fn await_receipt(&self, pending: &PendingTx) -> Result<Receipt, LedgerError>;
}

/// Read boundary: list what has been committed under an address.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Every entry stored under `address`, in the ledger's own return order.
    async fn fetch_all(&self, address: &LedgerAddress) -> Result<Vec<LedgerEntry>, LedgerError>;
}
