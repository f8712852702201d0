use crate::error::RecoError;
use crate::record::Record;
use log::warn;
use serde_json::Value;

/// Envelope keys list endpoints wrap their rows in.
const ENVELOPE_KEYS: [&str; 2] = ["results", "data"];

/// Extracts the rows from a list response.
///
/// Accepts a bare array or an object carrying the array under `results`
/// (paginated API views) or `data`. Array elements that are not objects are
/// skipped.
pub fn parse_records(body: Value) -> Result<Vec<Record>, RecoError> {
    let rows = match body {
        Value::Array(rows) => rows,
        Value::Object(mut envelope) => {
            let key = ENVELOPE_KEYS
                .iter()
                .find(|key| envelope.get(**key).is_some_and(Value::is_array))
                .ok_or_else(|| {
                    RecoError::InvalidPayload(
                        "expected an array or an object with a results array".to_string(),
                    )
                })?;
            match envelope.remove(*key) {
                Some(Value::Array(rows)) => rows,
                _ => Vec::new(),
            }
        }
        other => {
            return Err(RecoError::InvalidPayload(format!(
                "expected an array or an object, got {}",
                json_kind(&other)
            )));
        }
    };

    let total = rows.len();
    let records: Vec<Record> = rows
        .into_iter()
        .filter_map(|row| match row {
            Value::Object(record) => Some(record),
            other => {
                warn!("Skipping non-object row of kind {}", json_kind(&other));
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!("Kept {}/{} rows of list response", records.len(), total);
    }
    Ok(records)
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array() {
        let records = parse_records(json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["id"], json!(2));
    }

    #[test]
    fn test_results_envelope() {
        let body = json!({"count": 2, "next": null, "results": [{"id": 1}, {"id": 2}]});
        let records = parse_records(body).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_data_envelope() {
        let records = parse_records(json!({"data": [{"name": "Guest"}]})).unwrap();
        assert_eq!(records[0]["name"], json!("Guest"));
    }

    #[test]
    fn test_skips_non_objects() {
        let records = parse_records(json!([{"id": 1}, 5, null, "x", {"id": 2}])).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(matches!(
            parse_records(json!({"detail": "Not found"})),
            Err(RecoError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_records(json!({"results": "nope"})),
            Err(RecoError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_records(json!("text")),
            Err(RecoError::InvalidPayload(_))
        ));
    }
}
