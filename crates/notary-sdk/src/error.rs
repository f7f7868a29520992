use notary_ledger::LedgerError;
use notary_types::{DomainKey, TransactionId, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotaryError {
    /// Malformed or missing caller input. Never retried.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("unknown domain: {0}")]
    UnknownDomain(String),

    /// The ledger included the transaction but reported a non-success status.
    #[error("ledger rejected transaction {transaction_id}: {status}")]
    LedgerRejected {
        transaction_id: TransactionId,
        status: String,
    },

    /// Every attempt failed. The commitment may still have landed on the
    /// ledger; its state is unknown until re-verified through the read path.
    #[error("commit for {domain_key} unconfirmed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        domain_key: DomainKey,
        attempts: u32,
        #[source]
        last: Box<NotaryError>,
    },

    #[error("no ledger entries for {domain} key {domain_key}")]
    NotFound { domain: String, domain_key: DomainKey },

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    Type(#[from] TypeError),

    #[error("hasher error: {0}")]
    Hasher(#[from] notary_crypto::HasherError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl NotaryError {
    /// Returns `true` for failures caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::UnknownDomain(_) | Self::Type(_) | Self::Hasher(_)
        )
    }

    /// Returns `true` when a commit neither confirmed nor ruled out.
    pub fn commit_state_unknown(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }
}

pub type NotaryResult<T> = Result<T, NotaryError>;
