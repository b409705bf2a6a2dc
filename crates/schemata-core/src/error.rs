use thiserror::Error;

/// Errors raised while parsing untrusted values.
///
/// Sanitizers swallow these and fall back to a default; the strict parsers return them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),
}

impl CoreError {
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId(id.into())
    }

    pub fn invalid_date(text: impl Into<String>) -> Self {
        Self::InvalidDate(text.into())
    }

    pub fn invalid_time(text: impl Into<String>) -> Self {
        Self::InvalidTime(text.into())
    }

    /// The rejected input.
    pub fn value(&self) -> &str {
        match self {
            Self::InvalidId(v) | Self::InvalidDate(v) | Self::InvalidTime(v) => v,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_value() {
        let err = CoreError::invalid_id("a b");
        assert_eq!(err.to_string(), "Invalid id: a b");
        assert_eq!(err.value(), "a b");

        let err = CoreError::invalid_time("25:00");
        assert_eq!(err.to_string(), "Invalid time: 25:00");
    }

    #[test]
    fn test_strict_parsers_report_input() {
        let err = crate::time::parse_date("2024-02-30").unwrap_err();
        assert_eq!(err, CoreError::invalid_date("2024-02-30"));

        let err = crate::id::validate_id("has space").unwrap_err();
        assert!(matches!(err, CoreError::InvalidId(ref v) if v == "has space"));
    }
}
