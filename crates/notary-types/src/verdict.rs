use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainKey;

/// Outcome of comparing a claimed, a ledger-stored and a recomputed hash.
///
/// Tampering is reported as a verdict, not as an error: detecting it is the
/// verifier working correctly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// All three hashes agree.
    Verified,
    /// The claimed hash matches neither the ledger nor the record: the proof
    /// itself was forged or altered.
    HashTampered,
    /// The claimed hash is known, but the record no longer reproduces it: the
    /// payload changed after commitment.
    DataTampered,
}

impl Verdict {
    /// Returns `true` for [`Verdict::Verified`].
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }

    /// Human-readable explanation.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Verified => "hash successfully validated",
            Self::HashTampered => "hash is tampered",
            Self::DataTampered => "data is tampered",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified => write!(f, "Verified"),
            Self::HashTampered => write!(f, "HashTampered"),
            Self::DataTampered => write!(f, "DataTampered"),
        }
    }
}

/// The three hashes compared during verification, kept for audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationHashes {
    /// Hash presented by the caller.
    pub provided: String,
    /// Latest hash stored on the ledger for the key, prefix stripped.
    pub ledger: String,
    /// Hash recomputed from the presented record.
    pub recomputed: String,
}

/// Result of a verify call: the verdict plus everything it was derived from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub domain: String,
    pub domain_key: DomainKey,
    pub verdict: Verdict,
    pub hashes: VerificationHashes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_display() {
        assert_eq!(format!("{}", Verdict::Verified), "Verified");
        assert_eq!(format!("{}", Verdict::HashTampered), "HashTampered");
        assert_eq!(format!("{}", Verdict::DataTampered), "DataTampered");
    }

    #[test]
    fn verdict_serializes_snake_case() {
        let json = serde_json::to_string(&Verdict::DataTampered).unwrap();
        assert_eq!(json, "\"data_tampered\"");
    }

    #[test]
    fn only_verified_is_verified() {
        assert!(Verdict::Verified.is_verified());
        assert!(!Verdict::HashTampered.is_verified());
        assert!(!Verdict::DataTampered.is_verified());
    }
}
