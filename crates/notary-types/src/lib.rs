//! Foundation types for the record notary.
//!
//! This crate provides the data model shared by every other notary crate:
//! the records that get fingerprinted, the per-domain descriptors that fix
//! which fields are hashed, and the commitments, ledger entries and verdicts
//! produced by the commit and verify workflows.
//!
//! # Key Types
//!
//! - [`Record`]: Field-name to scalar-value mapping supplied by a caller
//! - [`DomainDescriptor`]: Fixed field order, key field and ledger scope of a domain
//! - [`DomainKey`]: String-normalized identifier of a record within its domain
//! - [`RecordHash`]: 32-byte keyed hash of a record's canonical bytes
//! - [`Commitment`]: Receipt of a ledger-confirmed hash submission
//! - [`LedgerEntry`]: The ledger's view of a previously committed hash
//! - [`Verdict`]: Three-way outcome of a tamper check

pub mod commitment;
pub mod domain;
pub mod entry;
pub mod error;
pub mod hash;
pub mod record;
pub mod verdict;

pub use commitment::{Commitment, TransactionId};
pub use domain::{DomainDescriptor, DomainKey, LedgerAddress, DEFAULT_GAS_BUDGET};
pub use entry::LedgerEntry;
pub use error::TypeError;
pub use hash::{normalize_hex, RecordHash};
pub use record::{number_text, Record};
pub use verdict::{Verdict, VerificationHashes, VerificationReport};
