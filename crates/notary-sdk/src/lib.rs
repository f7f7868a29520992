//! Hash-commit-and-verify workflow for the record notary.
//!
//! This is the main entry point for applications embedding the notary. A
//! [`Notary`] is built from an explicit [`NotaryConfig`] and a ledger, then:
//! - [`Notary::commit_record`] fingerprints a record and commits the hash,
//!   retrying with jittered exponential backoff
//! - [`Notary::verify_record`] re-derives the hash and classifies it against
//!   the caller's claim and the ledger's latest entry
//! - [`Notary::trail`] lists every commitment made for a record

pub mod committer;
pub mod config;
pub mod error;
pub mod notary;
pub mod retry;
pub mod trail;
pub mod verifier;

pub use committer::HashCommitter;
pub use config::NotaryConfig;
pub use error::{NotaryError, NotaryResult};
pub use notary::{CommitOutcome, Fingerprint, Notary};
pub use retry::{sample_jitter, RetryMachine, RetryPolicy, RetryState};
pub use trail::{DomainTrail, TrailBuilder, TrailEntry};
pub use verifier::{classify, select_latest, LatestEntryRule, TamperDetector};

// Re-export key types
pub use notary_crypto::SecretKey;
pub use notary_ledger::{FileLedger, InMemoryLedger, LedgerReader, LedgerWriter};
pub use notary_types::{
    Commitment, DomainDescriptor, DomainKey, LedgerAddress, LedgerEntry, Record, RecordHash,
    Verdict, VerificationHashes, VerificationReport,
};
