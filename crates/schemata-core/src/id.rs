//! Record id generation and sanitization.

use std::sync::LazyLock;

use serde_json::Value;

use crate::error::{CoreError, Result};

/// Ids are restricted to word characters and dashes (generated ids are UUIDs).
static ID_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[A-Za-z0-9_\-]{1,64}$").expect("Invalid id regex"));

/// Generate a fresh record id.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Validate an id, returning an error naming the offending value.
pub fn validate_id(id: &str) -> Result<()> {
    if ID_REGEX.is_match(id) {
        Ok(())
    } else {
        Err(CoreError::invalid_id(id))
    }
}

/// Sanitize a single untrusted id. Numbers are accepted in their decimal form.
pub fn sanitize_id(value: Option<&Value>) -> Option<String> {
    let candidate = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    validate_id(&candidate).ok().map(|_| candidate)
}

/// Sanitize a list of untrusted ids, dropping invalid entries and duplicates.
///
/// Anything other than an array yields an empty list.
pub fn sanitize_ids(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    let mut ids: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if let Some(id) = sanitize_id(Some(item))
            && !ids.contains(&id)
        {
            ids.push(id);
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_id_is_valid() {
        let id = generate_id();
        assert!(validate_id(&id).is_ok());
        assert_ne!(id, generate_id());
    }

    #[test]
    fn test_sanitize_id() {
        assert_eq!(sanitize_id(Some(&json!(" abc-1 "))), Some("abc-1".to_string()));
        assert_eq!(sanitize_id(Some(&json!(42))), Some("42".to_string()));
        assert_eq!(sanitize_id(Some(&json!("has space"))), None);
        assert_eq!(sanitize_id(Some(&json!({"$ne": 1}))), None);
        assert_eq!(sanitize_id(None), None);
    }

    #[test]
    fn test_sanitize_ids() {
        let ids = sanitize_ids(Some(&json!(["a", "b", "a", "<script>", 7])));
        assert_eq!(ids, vec!["a", "b", "7"]);
        assert!(sanitize_ids(Some(&json!("a"))).is_empty());
        assert!(sanitize_ids(None).is_empty());
    }
}
