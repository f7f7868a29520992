use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("record must be a JSON object")]
    NotAnObject,

    #[error("field {field} must be a string, number, boolean or null")]
    NonScalarField { field: String },

    #[error("invalid domain key: {0}")]
    InvalidDomainKey(String),

    #[error("invalid domain descriptor {domain}: {reason}")]
    InvalidDescriptor { domain: String, reason: String },
}
