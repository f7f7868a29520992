use std::collections::HashSet;
use std::path::Path;

use notary_types::DomainDescriptor;
use serde::{Deserialize, Serialize};

use crate::error::{NotaryError, NotaryResult};
use crate::retry::RetryPolicy;
use crate::verifier::LatestEntryRule;

/// Explicit notary configuration, passed in at construction.
///
/// Every section is optional in TOML; omitted sections fall back to the
/// defaults (three attempts from a one-second base, ledger-order latest
/// entry, the four built-in domains).
///
/// ```toml
/// latest_entry = "ledger_order"
///
/// [retry]
/// max_retries = 3
/// base_delay_ms = 1000
///
/// [[domains]]
/// name = "asset"
/// key_field = "asset_id"
/// hash_field = "asset_hash"
/// fields = ["asset_id", "quantity"]
/// ledger_address = "0.0.4801"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotaryConfig {
    pub retry: RetryPolicy,
    pub latest_entry: LatestEntryRule,
    pub domains: Vec<DomainDescriptor>,
}

impl Default for NotaryConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            latest_entry: LatestEntryRule::default(),
            domains: DomainDescriptor::builtin(),
        }
    }
}

impl NotaryConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> NotaryResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| NotaryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> NotaryResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| NotaryError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> NotaryResult<()> {
        self.retry.validate()?;
        if self.domains.is_empty() {
            return Err(NotaryError::Config("no domains configured".into()));
        }
        let mut names = HashSet::new();
        for domain in &self.domains {
            domain
                .validate()
                .map_err(|e| NotaryError::Config(e.to_string()))?;
            if !names.insert(domain.name.as_str()) {
                return Err(NotaryError::Config(format!(
                    "duplicate domain: {}",
                    domain.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a domain descriptor by name.
    pub fn domain(&self, name: &str) -> Option<&DomainDescriptor> {
        self.domains.iter().find(|d| d.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn default_config() {
        let c = NotaryConfig::default();
        assert_eq!(c.retry.max_retries, 3);
        assert_eq!(c.retry.base_delay(), Duration::from_secs(1));
        assert_eq!(c.latest_entry, LatestEntryRule::LedgerOrder);
        assert_eq!(c.domains.len(), 4);
        assert!(c.domain("valuation").is_some());
        assert!(c.domain("invoice").is_none());
        c.validate().unwrap();
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(NotaryConfig::from_toml_str("").unwrap(), NotaryConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let c = NotaryConfig::from_toml_str(
            r#"
            latest_entry = "submission_time"

            [retry]
            max_retries = 5

            [[domains]]
            name = "asset"
            key_field = "asset_id"
            hash_field = "asset_hash"
            fields = ["asset_id", "quantity", "unit_price"]
            ledger_address = "0.0.4801"
            gas_budget = 750000
            "#,
        )
        .unwrap();
        assert_eq!(c.retry.max_retries, 5);
        assert_eq!(c.retry.base_delay_ms, 1000);
        assert_eq!(c.latest_entry, LatestEntryRule::SubmissionTime);
        assert_eq!(c.domains.len(), 1);
        let asset = c.domain("asset").unwrap();
        assert_eq!(asset.fields, vec!["asset_id", "quantity", "unit_price"]);
        assert_eq!(asset.ledger_address.as_str(), "0.0.4801");
        assert_eq!(asset.gas_budget, 750_000);
    }

    #[test]
    fn zero_retries_rejected() {
        let err = NotaryConfig::from_toml_str("[retry]\nmax_retries = 0\n").unwrap_err();
        assert!(matches!(err, NotaryError::Config(msg) if msg.contains("max_retries")));
    }

    #[test]
    fn oversized_backoff_rejected() {
        let err = NotaryConfig::from_toml_str(
            "[retry]\nmax_retries = 32\nbase_delay_ms = 1000000000000000\n",
        )
        .unwrap_err();
        assert!(matches!(err, NotaryError::Config(msg) if msg.contains("base_delay_ms")));
    }

    #[test]
    fn duplicate_domains_rejected() {
        let mut c = NotaryConfig::default();
        c.domains.push(c.domains[0].clone());
        assert!(matches!(c.validate(), Err(NotaryError::Config(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn invalid_descriptor_rejected() {
        let mut c = NotaryConfig::default();
        c.domains[0].fields.clear();
        assert!(c.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_config_error() {
        assert!(matches!(
            NotaryConfig::from_toml_str("retry = ["),
            Err(NotaryError::Config(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notary.toml");
        std::fs::write(&path, "[retry]\nbase_delay_ms = 250\n").unwrap();
        let c = NotaryConfig::load(&path).unwrap();
        assert_eq!(c.retry.base_delay(), Duration::from_millis(250));

        let missing = NotaryConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, NotaryError::Config(_)));
    }
}
