//! Canonicalization and keyed hashing for the record notary.
//!
//! A record is fingerprinted in two steps: its domain's fields are projected
//! in a fixed order into compact JSON text ([`canonicalize`]), then the bytes
//! are hashed with HMAC-SHA256 under a caller-held secret ([`KeyedHasher`]).
//! Both steps are pure, so the fingerprint recomputed at verification time
//! equals the one committed for an unaltered record.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod canonical;
pub mod error;
pub mod keyed;
pub mod secret;

pub use canonical::{canonical_string, canonicalize};
pub use error::HasherError;
pub use keyed::KeyedHasher;
pub use secret::SecretKey;
