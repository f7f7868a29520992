use notary_types::TransactionId;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The ledger (or the path to it) refused the submission before inclusion.
    #[error("submission failed: {0}")]
    Submission(String),

    /// A read query failed.
    #[error("query failed: {0}")]
    Query(String),

    #[error("no pending transaction {0}")]
    UnknownTransaction(TransactionId),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}

impl From<std::io::Error> for LedgerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
