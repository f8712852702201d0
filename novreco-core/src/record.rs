//! Records are the rows of every list screen: check-ins, employees, users.
//!
//! The schema belongs to the backend, so a record is kept as the raw JSON
//! object it arrived as. The helpers here turn field values into the text
//! that search and field filters compare against.

use serde_json::Value;

/// One row of a list, keyed by field name.
pub type Record = serde_json::Map<String, Value>;

/// Text form of a field value as used for matching.
///
/// Returns `None` for `null`, so that absent values never match a query.
/// Nested arrays and objects are matched against their compact JSON text.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Lowercased text of a single field, if present and not null.
pub fn field_text(record: &Record, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(value_text)
        .map(|text| text.to_lowercase())
}

/// Builds a record from `(field, value)` pairs.
pub fn record_from<I, K, V>(fields: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    fields
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}
