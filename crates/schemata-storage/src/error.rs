//! Errors reported across the content manager contract.

/// Errors a content manager or manager registry can report.
///
/// An empty match is not an error; managers return an empty [`GetResult`](crate::GetResult).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No manager is registered for a content type.
    #[error("Unknown content type: {content_type}")]
    UnknownType { content_type: String },

    /// A record handed to the store cannot be stored.
    #[error("Invalid record: {message}")]
    InvalidRecord { message: String },

    /// The backing store failed.
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// Anything else, including failures of a manager's own nested joins.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl StorageError {
    #[must_use]
    pub fn unknown_type(content_type: impl Into<String>) -> Self {
        Self::UnknownType {
            content_type: content_type.into(),
        }
    }

    #[must_use]
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if no manager was registered for the type.
    #[must_use]
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, Self::UnknownType { .. })
    }
}
