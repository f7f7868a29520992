use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeError;
use crate::record::number_text;

/// Gas budget attached to every hash submission unless a domain overrides it.
pub const DEFAULT_GAS_BUDGET: u64 = 500_000;

/// Opaque ledger-side scope (contract address) holding a domain's entries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerAddress(String);

impl LedgerAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a record within its domain.
///
/// Keys arrive as either JSON strings or numbers; both are reduced to the
/// same text so that `"42"` and `42` select the same ledger entries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainKey(String);

impl DomainKey {
    /// Create a key from its text form. Empty keys are rejected.
    pub fn new(key: impl Into<String>) -> Result<Self, TypeError> {
        let key = key.into();
        if key.is_empty() {
            return Err(TypeError::InvalidDomainKey("key is empty".into()));
        }
        Ok(Self(key))
    }

    /// Normalize a JSON key value. Only non-empty strings and numbers qualify.
    pub fn from_value(value: &Value) -> Result<Self, TypeError> {
        match value {
            Value::String(s) => Self::new(s.clone()),
            Value::Number(n) => Self::new(number_text(n)),
            other => Err(TypeError::InvalidDomainKey(format!(
                "expected a string or number, got {}",
                json_kind(other)
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if a ledger-stored key refers to this record.
    pub fn matches(&self, stored: &str) -> bool {
        self.0 == stored
    }
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn default_gas_budget() -> u64 {
    DEFAULT_GAS_BUDGET
}

/// Per-domain hashing and ledger configuration.
///
/// `fields` is the ordered projection hashed at commit time and again at
/// verify time. Changing it after records have been committed makes every
/// earlier commitment unverifiable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDescriptor {
    /// Domain name used for lookup (`asset`, `project`, ...).
    pub name: String,
    /// Field carrying the record's [`DomainKey`].
    pub key_field: String,
    /// Field carrying a claimed hash in request bodies.
    pub hash_field: String,
    /// Ordered list of fields included in the hash.
    pub fields: Vec<String>,
    /// Ledger scope the domain's commitments are written to.
    pub ledger_address: LedgerAddress,
    /// Gas budget per submission.
    #[serde(default = "default_gas_budget")]
    pub gas_budget: u64,
}

impl DomainDescriptor {
    pub fn new(
        name: impl Into<String>,
        key_field: impl Into<String>,
        hash_field: impl Into<String>,
        fields: &[&str],
        ledger_address: LedgerAddress,
    ) -> Self {
        Self {
            name: name.into(),
            key_field: key_field.into(),
            hash_field: hash_field.into(),
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
            ledger_address,
            gas_budget: DEFAULT_GAS_BUDGET,
        }
    }

    pub fn with_gas_budget(mut self, gas_budget: u64) -> Self {
        self.gas_budget = gas_budget;
        self
    }

    /// Registered fixed assets.
    pub fn asset(ledger_address: LedgerAddress) -> Self {
        Self::new(
            "asset",
            "asset_id",
            "asset_hash",
            &[
                "asset_id",
                "asset_category",
                "asset_name",
                "description",
                "asset_group",
                "quantity",
                "unit_price",
                "uom",
                "install_date",
                "total_price",
            ],
            ledger_address,
        )
    }

    /// Project registrations.
    pub fn project(ledger_address: LedgerAddress) -> Self {
        Self::new(
            "project",
            "prj_id",
            "project_hash",
            &[
                "prj_id",
                "prj_name",
                "prj_company",
                "prj_description",
                "prj_nft_id",
                "prj_start_date",
                "prj_end_date",
            ],
            ledger_address,
        )
    }

    /// Soulbound site attestations of a project.
    pub fn soulbound(ledger_address: LedgerAddress) -> Self {
        Self::new(
            "soulbound",
            "prj_id",
            "soulbound_hash",
            &[
                "prj_id",
                "prj_sba_address",
                "prj_sba_landmark",
                "prj_sba_lat",
                "prj_sba_long",
                "prj_sba_description",
            ],
            ledger_address,
        )
    }

    /// Project valuations.
    pub fn valuation(ledger_address: LedgerAddress) -> Self {
        Self::new(
            "valuation",
            "prj_id",
            "valuation_hash",
            &[
                "prj_id",
                "valuation_company",
                "valuation_time_period",
                "total_asset_value",
                "expected_revenue",
                "expected_carbon_credits_value",
                "total_valuation",
                "valuation_date",
            ],
            ledger_address,
        )
    }

    /// The four built-in domains, each scoped to a ledger address named
    /// after the domain.
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::asset(LedgerAddress::new("asset")),
            Self::project(LedgerAddress::new("project")),
            Self::soulbound(LedgerAddress::new("soulbound")),
            Self::valuation(LedgerAddress::new("valuation")),
        ]
    }

    /// Check the descriptor is usable for hashing.
    pub fn validate(&self) -> Result<(), TypeError> {
        let invalid = |reason: &str| TypeError::InvalidDescriptor {
            domain: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.fields.is_empty() {
            return Err(invalid("field list is empty"));
        }
        if !self.fields.contains(&self.key_field) {
            return Err(invalid("key field is not part of the hashed fields"));
        }
        if self.fields.contains(&self.hash_field) {
            return Err(invalid("hash field cannot be a hashed field"));
        }
        let mut seen = HashSet::new();
        if !self.fields.iter().all(|f| seen.insert(f.as_str())) {
            return Err(invalid("duplicate field in field list"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_and_number_keys_normalize_equal() {
        let from_str = DomainKey::from_value(&json!("42")).unwrap();
        let from_num = DomainKey::from_value(&json!(42)).unwrap();
        let from_float = DomainKey::from_value(&json!(42.0)).unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(from_num, from_float);
        assert!(from_num.matches("42"));
    }

    #[test]
    fn invalid_keys_rejected() {
        assert!(DomainKey::from_value(&json!("")).is_err());
        assert!(DomainKey::from_value(&json!(null)).is_err());
        assert!(DomainKey::from_value(&json!(true)).is_err());
        assert!(DomainKey::from_value(&json!({"id": 1})).is_err());
    }

    #[test]
    fn builtin_descriptors_are_valid() {
        let domains = DomainDescriptor::builtin();
        assert_eq!(domains.len(), 4);
        for domain in &domains {
            domain.validate().unwrap();
            assert_eq!(domain.gas_budget, DEFAULT_GAS_BUDGET);
        }
    }

    #[test]
    fn asset_field_order_is_fixed() {
        let asset = DomainDescriptor::asset(LedgerAddress::new("0.0.1"));
        assert_eq!(asset.fields.first().map(String::as_str), Some("asset_id"));
        assert_eq!(asset.fields.last().map(String::as_str), Some("total_price"));
        assert_eq!(asset.fields.len(), 10);
    }

    #[test]
    fn validate_rejects_missing_key_field() {
        let mut d = DomainDescriptor::project(LedgerAddress::new("p"));
        d.key_field = "nope".into();
        assert!(matches!(d.validate(), Err(TypeError::InvalidDescriptor { .. })));
    }

    #[test]
    fn validate_rejects_duplicates() {
        let d = DomainDescriptor::new("x", "id", "x_hash", &["id", "a", "a"], LedgerAddress::new("x"));
        assert!(d.validate().is_err());
    }

    #[test]
    fn gas_budget_defaults_when_deserializing() {
        let d: DomainDescriptor = serde_json::from_value(json!({
            "name": "asset",
            "key_field": "asset_id",
            "hash_field": "asset_hash",
            "fields": ["asset_id"],
            "ledger_address": "0.0.123",
        }))
        .unwrap();
        assert_eq!(d.gas_budget, DEFAULT_GAS_BUDGET);
        assert_eq!(d.ledger_address.as_str(), "0.0.123");
    }

    proptest::proptest! {
        #[test]
        fn integer_keys_match_their_text(n in proptest::num::i64::ANY) {
            let from_num = DomainKey::from_value(&json!(n)).unwrap();
            let from_str = DomainKey::from_value(&json!(n.to_string())).unwrap();
            proptest::prop_assert_eq!(from_num, from_str);
        }
    }
}
