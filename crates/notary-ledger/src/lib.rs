//! Ledger boundary for the record notary.
//!
//! The notary never speaks a ledger's wire protocol itself. It sees the
//! ledger through two traits:
//! - [`LedgerWriter`]: submit a `(domain key, hash)` commitment and await its receipt
//! - [`LedgerReader`]: fetch every entry previously committed under a ledger address
//!
//! Two implementations ship with the crate:
//! - [`InMemoryLedger`] for tests and embedding
//! - [`FileLedger`], an append-only local file with CRC-framed entries

pub mod error;
pub mod file;
pub mod memory;
pub mod records;
pub mod traits;

pub use error::LedgerError;
pub use file::FileLedger;
pub use memory::InMemoryLedger;
pub use records::{PendingTx, Receipt, ReceiptStatus, SubmitRequest};
pub use traits::{LedgerReader, LedgerWriter};
