//! Sanitizers for untrusted field input.
//!
//! Every sanitizer is total: bad input degrades to the supplied default (or an empty value)
//! instead of failing, so converters can always assign something safe.

use std::sync::LazyLock;

use serde_json::Value;

static SLUG_SEPARATOR: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[^a-z0-9]+").expect("Invalid slug regex"));

static SORT_SEPARATOR: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[^\p{L}\p{N}]+").expect("Invalid sortify regex"));

static LEADING_INTEGER: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[+-]?\d+").expect("Invalid integer regex"));

static LEADING_FLOAT: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("Invalid float regex")
});

const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "mailto"];

/// Trimmed string form of a scalar, or the default (empty when absent).
pub fn sanitize_string(value: Option<&Value>, def: Option<&str>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => def.unwrap_or_default().to_string(),
    }
}

/// Truthiness of form-style input: `true`, `"true"`, `"yes"`, `"1"`, `"on"`.
///
/// An absent value yields the default, an empty string is `false`.
pub fn sanitize_boolean(value: Option<&Value>, def: Option<bool>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        None | Some(Value::Null) => def.unwrap_or(false),
        Some(other) => {
            let s = sanitize_string(Some(other), None).to_ascii_lowercase();
            matches!(s.chars().next(), Some('t' | 'y' | '1')) || s == "on"
        }
    }
}

/// Leading integer of the input, clamped to `min`/`max`; the default (or 0) when unparsable.
pub fn sanitize_integer(
    value: Option<&Value>,
    def: Option<i64>,
    min: Option<i64>,
    max: Option<i64>,
) -> i64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => LEADING_INTEGER
            .find(s.trim())
            .and_then(|m| m.as_str().parse::<i64>().ok()),
        _ => None,
    };
    let mut result = parsed.or(def).unwrap_or(0);
    if let Some(min) = min {
        result = result.max(min);
    }
    if let Some(max) = max {
        result = result.min(max);
    }
    result
}

/// Leading float of the input, clamped to `min`/`max`; the default (or 0.0) when unparsable.
pub fn sanitize_float(
    value: Option<&Value>,
    def: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => LEADING_FLOAT
            .find(s.trim())
            .and_then(|m| m.as_str().parse::<f64>().ok()),
        _ => None,
    };
    let mut result = parsed.filter(|f| f.is_finite()).or(def).unwrap_or(0.0);
    if let Some(min) = min {
        result = result.max(min);
    }
    if let Some(max) = max {
        result = result.min(max);
    }
    result
}

/// The input if it is one of `choices`, otherwise the default.
pub fn sanitize_select<'a>(
    value: Option<&Value>,
    mut choices: impl Iterator<Item = &'a str>,
    def: Option<&str>,
) -> Option<String> {
    let s = sanitize_string(value, None);
    if choices.any(|choice| choice == s) {
        Some(s)
    } else {
        def.map(str::to_string)
    }
}

/// A list of trimmed, non-empty, distinct tags. Non-arrays yield an empty list.
pub fn sanitize_tags(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    dedupe(items.iter().map(|item| sanitize_string(Some(item), None)))
}

/// Split a comma-separated tag list.
pub fn tags_to_array(text: &str) -> Vec<String> {
    dedupe(text.split(',').map(|t| t.trim().to_string()))
}

fn dedupe(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// A safe absolute or site-relative URL, prefixing `http://` when the scheme is missing.
pub fn sanitize_url(value: Option<&Value>, def: Option<&str>) -> Option<String> {
    let s = sanitize_string(value, None);
    if s.is_empty() {
        return def.map(str::to_string);
    }
    if s.starts_with('/') && !s.starts_with("//") {
        return Some(s);
    }
    let candidate = if s.contains("://") || s.starts_with("mailto:") {
        s
    } else {
        format!("http://{s}")
    };
    match url::Url::parse(&candidate) {
        Ok(parsed) if URL_SCHEMES.contains(&parsed.scheme()) => Some(candidate),
        _ => def.map(str::to_string),
    }
}

/// URL-safe slug: lowercase alphanumerics joined by dashes, `"none"` when nothing survives.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let slug = SLUG_SEPARATOR.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "none".to_string()
    } else {
        slug.to_string()
    }
}

/// Normalized form of a title for tolerant matching.
pub fn sortify(text: &str) -> String {
    let lowered = text.to_lowercase();
    SORT_SEPARATOR.replace_all(&lowered, " ").trim().to_string()
}

/// Escape text for inclusion in HTML markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_string() {
        assert_eq!(sanitize_string(Some(&json!("  hi ")), None), "hi");
        assert_eq!(sanitize_string(Some(&json!(12)), None), "12");
        assert_eq!(sanitize_string(Some(&json!({"a": 1})), Some("def")), "def");
        assert_eq!(sanitize_string(None, None), "");
    }

    #[test]
    fn test_sanitize_boolean() {
        assert!(sanitize_boolean(Some(&json!(true)), None));
        assert!(sanitize_boolean(Some(&json!("Yes")), None));
        assert!(sanitize_boolean(Some(&json!("1")), None));
        assert!(sanitize_boolean(Some(&json!("on")), None));
        assert!(!sanitize_boolean(Some(&json!("false")), Some(true)));
        assert!(!sanitize_boolean(Some(&json!("")), Some(true)));
        assert!(sanitize_boolean(None, Some(true)));
        assert!(!sanitize_boolean(None, None));
    }

    #[test]
    fn test_sanitize_integer() {
        assert_eq!(sanitize_integer(Some(&json!("42abc")), None, None, None), 42);
        assert_eq!(sanitize_integer(Some(&json!(7.9)), None, None, None), 7);
        assert_eq!(sanitize_integer(Some(&json!("x")), Some(3), None, None), 3);
        assert_eq!(sanitize_integer(Some(&json!("500")), None, Some(0), Some(100)), 100);
        assert_eq!(sanitize_integer(Some(&json!(-5)), None, Some(0), None), 0);
    }

    #[test]
    fn test_sanitize_float() {
        assert_eq!(sanitize_float(Some(&json!("3.5kg")), None, None, None), 3.5);
        assert_eq!(sanitize_float(Some(&json!("nope")), Some(1.5), None, None), 1.5);
        assert_eq!(sanitize_float(Some(&json!(9.0)), None, None, Some(2.0)), 2.0);
    }

    #[test]
    fn test_sanitize_select() {
        let choices = ["red", "blue"];
        assert_eq!(
            sanitize_select(Some(&json!("blue")), choices.iter().copied(), None),
            Some("blue".to_string())
        );
        assert_eq!(
            sanitize_select(Some(&json!("green")), choices.iter().copied(), Some("red")),
            Some("red".to_string())
        );
        assert_eq!(
            sanitize_select(Some(&json!("green")), choices.iter().copied(), None),
            None
        );
    }

    #[test]
    fn test_tags() {
        assert_eq!(tags_to_array(" a, b ,,a"), vec!["a", "b"]);
        assert_eq!(
            sanitize_tags(Some(&json!([" x ", "", "y", "x"]))),
            vec!["x", "y"]
        );
        assert!(sanitize_tags(Some(&json!("x"))).is_empty());
    }

    #[test]
    fn test_sanitize_url() {
        assert_eq!(
            sanitize_url(Some(&json!("example.com/a")), None),
            Some("http://example.com/a".to_string())
        );
        assert_eq!(
            sanitize_url(Some(&json!("https://example.com")), None),
            Some("https://example.com".to_string())
        );
        assert_eq!(sanitize_url(Some(&json!("/local")), None), Some("/local".to_string()));
        assert_eq!(sanitize_url(Some(&json!("javascript:alert(1)")), None), None);
        assert_eq!(sanitize_url(Some(&json!("")), Some("/")), Some("/".to_string()));
    }

    #[test]
    fn test_slugify_and_sortify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("***"), "none");
        assert_eq!(sortify("  The Quick--Brown Fox "), "the quick brown fox");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
    }
}
