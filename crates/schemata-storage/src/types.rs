//! Data types used by the content manager contract.

use schemata_core::record::{ID_KEY, Record};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Selection criteria for a manager fetch.
///
/// Matching follows document-store conventions: when the stored value of a field is an
/// array, a criterion matches if any element satisfies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Criteria {
    /// Every record.
    All,
    /// Field equals the value.
    Eq { field: String, value: Value },
    /// Field equals any of the values.
    In { field: String, values: Vec<Value> },
    /// Every sub-criterion matches.
    And(Vec<Criteria>),
    /// At least one sub-criterion matches.
    Or(Vec<Criteria>),
}

impl Criteria {
    /// Records whose `_id` is one of `ids`.
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::field_in(ID_KEY, ids)
    }

    /// Records whose `field` (or any element of it) is one of `values`.
    pub fn field_in<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(|v| Value::String(v.into())).collect(),
        }
    }

    /// Records whose `field` equals `value`.
    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Conjunction of `self` and `other`.
    #[must_use]
    pub fn and(self, other: Criteria) -> Self {
        match self {
            Self::All => other,
            Self::And(mut clauses) => {
                clauses.push(other);
                Self::And(clauses)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Returns true if the record satisfies these criteria.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::All => true,
            Self::Eq { field, value } => match record.get(field) {
                Some(Value::Array(items)) if !value.is_array() => items.contains(value),
                Some(stored) => stored == value,
                None => value.is_null(),
            },
            Self::In { field, values } => match record.get(field) {
                Some(Value::Array(items)) => items.iter().any(|item| values.contains(item)),
                Some(stored) => values.contains(stored),
                None => false,
            },
            Self::And(clauses) => clauses.iter().all(|c| c.matches(record)),
            Self::Or(clauses) => clauses.iter().any(|c| c.matches(record)),
        }
    }
}

/// How far a manager may follow joins on the records it returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WithJoins {
    /// Every configured join, plus one level of each join's own static allow-list.
    #[default]
    Default,
    /// No joins at all.
    Disabled,
    /// Only the listed dot-paths (and their continuations).
    Only(Vec<String>),
}

impl WithJoins {
    /// Allow-list taken from a join's static configuration: its list when present,
    /// otherwise nothing.
    pub fn from_static(with_joins: Option<&Vec<String>>) -> Self {
        match with_joins {
            Some(paths) => Self::Only(paths.clone()),
            None => Self::Disabled,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    /// Interpret a loosely typed option value (`false` or an array of dot-paths).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(false) => Some(Self::Disabled),
            Value::Array(items) => Some(Self::Only(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            )),
            _ => None,
        }
    }
}

/// Options for a manager fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOptions {
    /// Nested join allow-list for the fetched records.
    #[serde(default)]
    pub with_joins: WithJoins,
    /// Compute permalinks for the fetched records.
    #[serde(default)]
    pub permalink: bool,
    /// Restrict to records the caller may edit.
    #[serde(default)]
    pub editable: bool,
    /// Projection: only these keys are returned when set.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    /// Backend-specific options passed through untouched.
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

impl GetOptions {
    /// Options with the given nested join allow-list.
    pub fn with_joins(with_joins: WithJoins) -> Self {
        Self {
            with_joins,
            ..Self::default()
        }
    }

    /// Overlay loosely typed options on top of these.
    ///
    /// Known keys (`withJoins`, `permalink`, `editable`, `fields`) are interpreted; everything
    /// else lands in `extra`.
    pub fn merge(&mut self, overrides: &Map<String, Value>) {
        for (key, value) in overrides {
            match key.as_str() {
                "withJoins" => {
                    if let Some(with_joins) = WithJoins::from_value(value) {
                        self.with_joins = with_joins;
                    }
                }
                "permalink" => self.permalink = value.as_bool().unwrap_or(self.permalink),
                "editable" => self.editable = value.as_bool().unwrap_or(self.editable),
                "fields" => {
                    self.fields = value.as_array().map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                }
                _ => {
                    self.extra.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Apply the `fields` projection to a record.
    pub fn project(&self, record: &Record) -> Record {
        match &self.fields {
            Some(fields) => record
                .iter()
                .filter(|(key, _)| key.as_str() == ID_KEY || fields.iter().any(|f| f == *key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            None => record.clone(),
        }
    }
}

/// Result of a manager fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetResult {
    /// The matching records, in the manager's order.
    pub items: Vec<Record>,
    /// Total number of matching records.
    pub total: usize,
}

impl GetResult {
    /// Creates a new empty `GetResult`.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a result whose total is the number of items.
    #[must_use]
    pub fn with_items(items: Vec<Record>) -> Self {
        let total = items.len();
        Self { items, total }
    }

    /// Returns the number of items in this result.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_ids_criteria() {
        let criteria = Criteria::ids(["a", "b"]);
        assert!(criteria.matches(&record(json!({"_id": "a"}))));
        assert!(!criteria.matches(&record(json!({"_id": "c"}))));
        assert!(!criteria.matches(&record(json!({"title": "x"}))));
    }

    #[test]
    fn test_in_matches_array_fields() {
        let criteria = Criteria::field_in("personIds", ["p1"]);
        assert!(criteria.matches(&record(json!({"personIds": ["p0", "p1"]}))));
        assert!(!criteria.matches(&record(json!({"personIds": ["p2"]}))));
    }

    #[test]
    fn test_eq_and_or() {
        let criteria = Criteria::Or(vec![
            Criteria::field_eq("sortTitle", "jane doe"),
            Criteria::field_eq("_id", "jane doe"),
        ]);
        assert!(criteria.matches(&record(json!({"_id": "1", "sortTitle": "jane doe"}))));
        assert!(!criteria.matches(&record(json!({"_id": "2", "sortTitle": "john"}))));

        let typed = Criteria::field_eq("type", "person").and(Criteria::ids(["1"]));
        assert!(typed.matches(&record(json!({"_id": "1", "type": "person"}))));
        assert!(!typed.matches(&record(json!({"_id": "1", "type": "event"}))));
    }

    #[test]
    fn test_and_flattens() {
        let criteria = Criteria::All.and(Criteria::ids(["1"]));
        assert_eq!(criteria, Criteria::ids(["1"]));

        let criteria = Criteria::And(vec![Criteria::All]).and(Criteria::ids(["1"]));
        assert!(matches!(criteria, Criteria::And(ref c) if c.len() == 2));
    }

    #[test]
    fn test_with_joins_from_static() {
        assert_eq!(WithJoins::from_static(None), WithJoins::Disabled);
        let list = vec!["_location".to_string()];
        assert_eq!(
            WithJoins::from_static(Some(&list)),
            WithJoins::Only(vec!["_location".to_string()])
        );
    }

    #[test]
    fn test_get_options_merge() {
        let mut options = GetOptions::with_joins(WithJoins::Disabled);
        let overrides = json!({
            "editable": true,
            "fields": ["title"],
            "withJoins": ["_tags"],
            "sort": {"title": 1}
        });
        options.merge(overrides.as_object().unwrap());

        assert!(options.editable);
        assert_eq!(options.fields, Some(vec!["title".to_string()]));
        assert_eq!(options.with_joins, WithJoins::Only(vec!["_tags".to_string()]));
        assert_eq!(options.extra.get("sort"), Some(&json!({"title": 1})));
    }

    #[test]
    fn test_projection_keeps_id() {
        let options = GetOptions {
            fields: Some(vec!["title".to_string()]),
            ..GetOptions::default()
        };
        let projected = options.project(&record(json!({"_id": "1", "title": "T", "body": "B"})));
        assert_eq!(projected, record(json!({"_id": "1", "title": "T"})));
    }
}
