//! Search predicates and exact-match field filters.
//!
//! The controller lowercases the query once and hands it to the predicate,
//! so implementations only need to lowercase the record side.

use crate::record::{Record, field_text, value_text};
use std::collections::BTreeMap;

/// Decides whether a record matches a non-empty, lowercased query.
pub trait SearchPredicate {
    fn matches(&self, record: &Record, query: &str) -> bool;
}

impl<F> SearchPredicate for F
where
    F: Fn(&Record, &str) -> bool,
{
    fn matches(&self, record: &Record, query: &str) -> bool {
        self(record, query)
    }
}

/// Matches when any field value contains the query, ignoring case.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyFieldContains;

impl SearchPredicate for AnyFieldContains {
    fn matches(&self, record: &Record, query: &str) -> bool {
        record
            .values()
            .filter_map(value_text)
            .any(|text| text.to_lowercase().contains(query))
    }
}

/// Matches when one of the named fields contains the query, ignoring case.
///
/// The employee and user screens search only name, code and email; this keeps
/// a query like "2024" from matching every record through a date column.
#[derive(Debug, Clone, Default)]
pub struct FieldsContain {
    fields: Vec<String>,
}

impl FieldsContain {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl SearchPredicate for FieldsContain {
    fn matches(&self, record: &Record, query: &str) -> bool {
        self.fields
            .iter()
            .filter_map(|field| field_text(record, field))
            .any(|text| text.contains(query))
    }
}

/// Exact-match filters on individual fields, combined with AND.
///
/// These back the status and department dropdowns of the check-in lists. The
/// comparison is on the field's text form, case-insensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldFilters {
    filters: BTreeMap<String, String>,
}

impl FieldFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a filter; an empty value removes it, like an "all" dropdown option.
    /// Returns true when the filter set changed.
    pub fn set(&mut self, field: &str, value: &str) -> bool {
        if value.is_empty() {
            return self.filters.remove(field).is_some();
        }
        let value = value.to_lowercase();
        if self.filters.get(field) == Some(&value) {
            return false;
        }
        self.filters.insert(field.to_string(), value);
        true
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.filters.is_empty();
        self.filters.clear();
        changed
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.filters.get(field).map(String::as_str)
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| field_text(record, field).as_deref() == Some(expected.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::record_from;
    use serde_json::{Value, json};

    fn employee(name: &str, email: &str, joined: &str) -> Record {
        record_from([
            ("name", json!(name)),
            ("email", json!(email)),
            ("joined", json!(joined)),
            ("manager", Value::Null),
        ])
    }

    #[test]
    fn test_any_field_contains() {
        let record = employee("Admin User", "admin@example.com", "2024-01-02");
        assert!(AnyFieldContains.matches(&record, "admin"));
        assert!(AnyFieldContains.matches(&record, "2024"));
        assert!(!AnyFieldContains.matches(&record, "guest"));
    }

    #[test]
    fn test_any_field_ignores_null() {
        let record = employee("Guest", "guest@example.com", "2023-05-06");
        assert!(!AnyFieldContains.matches(&record, "null"));
    }

    #[test]
    fn test_any_field_matches_numbers() {
        let record = record_from([("employee_id", json!(10452))]);
        assert!(AnyFieldContains.matches(&record, "045"));
    }

    #[test]
    fn test_fields_contain_restricts_fields() {
        let record = employee("Tran Thi B", "b@example.com", "2024-03-04");
        let predicate = FieldsContain::new(["name", "email"]);
        assert!(predicate.matches(&record, "tran"));
        assert!(predicate.matches(&record, "b@example"));
        assert!(!predicate.matches(&record, "2024"));
    }

    #[test]
    fn test_closure_predicate() {
        let predicate = |record: &Record, query: &str| {
            record
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|name| name.to_lowercase().starts_with(query))
        };
        let record = employee("Le Van C", "c@example.com", "2022-01-01");
        assert!(predicate.matches(&record, "le"));
        assert!(!predicate.matches(&record, "van"));
    }

    #[test]
    fn test_field_filters() {
        let mut filters = FieldFilters::new();
        let approved = record_from([("status", json!("Approved")), ("dept", json!("IT"))]);
        let pending = record_from([("status", json!("pending")), ("dept", json!("IT"))]);

        assert!(filters.matches(&approved));
        assert!(filters.set("status", "approved"));
        assert!(!filters.set("status", "APPROVED"));
        assert!(filters.matches(&approved));
        assert!(!filters.matches(&pending));

        assert!(filters.set("dept", "it"));
        assert_eq!(filters.len(), 2);
        assert!(filters.matches(&approved));

        assert!(filters.set("status", ""));
        assert!(filters.matches(&pending));
        assert!(filters.clear());
        assert!(!filters.clear());
        assert!(filters.is_empty());
    }
}
