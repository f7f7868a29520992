use notary_types::{number_text, Record};
use serde_json::Value;

/// Deterministic byte form of a record's hashed fields.
///
/// Emits a compact JSON object with exactly the fields of `field_order`, in
/// that order. Fields absent from the record are written as `null` rather
/// than left out; fields not named in `field_order` are ignored. The output
/// depends on nothing but the field values and the order.
pub fn canonicalize<S: AsRef<str>>(record: &Record, field_order: &[S]) -> Vec<u8> {
    canonical_string(record, field_order).into_bytes()
}

/// [`canonicalize`] as text, for display and debugging.
pub fn canonical_string<S: AsRef<str>>(record: &Record, field_order: &[S]) -> String {
    let mut out = String::from("{");
    for (index, field) in field_order.iter().enumerate() {
        let field = field.as_ref();
        if index > 0 {
            out.push(',');
        }
        out.push_str(&json_string(field));
        out.push(':');
        out.push_str(&scalar_text(record.get(field).unwrap_or(&Value::Null)));
    }
    out.push('}');
    out
}

fn json_string(s: &str) -> String {
    Value::String(s.to_owned()).to_string()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Number(n) => number_text(n),
        other => other.to_string(),
    }
}
