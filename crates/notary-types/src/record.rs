use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::TypeError;

/// Largest integer an IEEE double represents exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A caller-supplied business record.
///
/// Maps field names to scalar values (string, number, boolean or null).
/// Records are built fresh per request and never persisted; which of their
/// fields are fingerprinted is decided by the domain's descriptor, not by
/// the record itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a JSON object, rejecting nested values.
    pub fn from_json(value: Value) -> Result<Self, TypeError> {
        let Value::Object(map) = value else {
            return Err(TypeError::NotAnObject);
        };
        let mut record = Self::new();
        for (field, value) in map {
            record.insert(field, value)?;
        }
        Ok(record)
    }

    /// Set a field. Arrays and objects are rejected.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Result<(), TypeError> {
        let field = field.into();
        if value.is_array() || value.is_object() {
            return Err(TypeError::NonScalarField { field });
        }
        self.fields.insert(field, value);
        Ok(())
    }

    /// Builder form of [`Record::insert`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Result<Self, TypeError> {
        self.insert(field, value.into())?;
        Ok(self)
    }

    /// Value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the field is present (a JSON `null` counts as present).
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl TryFrom<Value> for Record {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.fields.into_iter().collect())
    }
}

/// Text form of a JSON number as the record producers print it.
///
/// Floating-point values with an integral value inside the exact integer
/// range print without a fractional part, so `10.0` and `10` are the same
/// number on both the commit and the verify side.
pub fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}
