//! The flat keyed record every schema operation reads and writes.

use serde_json::{Map, Value};

/// A content record: a flat object keyed by field name or storage key.
pub type Record = Map<String, Value>;

/// Storage key of a record's id.
pub const ID_KEY: &str = "_id";

/// Storage key of a record's content type.
pub const TYPE_KEY: &str = "type";

/// Storage key of a record's title.
pub const TITLE_KEY: &str = "title";

/// Storage key of the normalized title used for tolerant title matching.
pub const SORT_TITLE_KEY: &str = "sortTitle";

/// Returns the record's id, if it has a string one.
pub fn record_id(record: &Record) -> Option<&str> {
    record.get(ID_KEY).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id() {
        let record = json!({"_id": "abc", "title": "Hi"});
        assert_eq!(record_id(record.as_object().unwrap()), Some("abc"));

        let record = json!({"_id": 5});
        assert_eq!(record_id(record.as_object().unwrap()), None);
    }
}
