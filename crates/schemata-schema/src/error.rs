//! Error types for schema composition, conversion, export, joins and rendering.

use std::fmt;

use schemata_storage::StorageError;

/// Schema definition errors, raised at composition time.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(
        "The group {group} has the same name as a field. Group names must be distinct from field names."
    )]
    GroupNameCollision { group: String },

    #[error("The group {group} names the field {field}, which is not in the schema")]
    UnknownGroupMember { group: String, field: String },

    #[error("The field {field} appears more than once in the schema")]
    DuplicateField { field: String },
}

/// Errors from converting raw input into field values.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("No {format} converter exists for schema field type {field_type} (field {field})")]
    MissingConverter {
        format: String,
        field_type: String,
        field: String,
    },

    #[error("Join with type {with_type} unrecognized (field {field})")]
    UnknownType { with_type: String, field: String },

    #[error("Required fields missing: {}", fields.join(", "))]
    Required { fields: Vec<String> },

    #[error("Field {field} is misconfigured: {message}")]
    Misconfigured { field: String, message: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ConvertError {
    pub fn missing_converter(
        format: impl fmt::Display,
        field_type: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::MissingConverter {
            format: format.to_string(),
            field_type: field_type.into(),
            field: field.into(),
        }
    }

    pub fn unknown_type(with_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownType {
            with_type: with_type.into(),
            field: field.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::Required {
            fields: vec![field.into()],
        }
    }

    pub fn misconfigured(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Misconfigured {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for per-field required failures, which a report can continue past.
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required { .. })
    }

    /// Names of the failing fields, for highlighting.
    pub fn failed_fields(&self) -> &[String] {
        match self {
            Self::Required { fields } => fields,
            _ => &[],
        }
    }

    /// Prefixes the names of nested failing fields with their array position.
    pub(crate) fn within_array(self, array: &str, index: usize) -> Self {
        match self {
            Self::Required { fields } => Self::Required {
                fields: fields
                    .into_iter()
                    .map(|f| format!("{array}.{index}.{f}"))
                    .collect(),
            },
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingConverter { .. } | Self::UnknownType { .. } | Self::Misconfigured { .. } => {
                ErrorCategory::Configuration
            }
            Self::Required { .. } => ErrorCategory::Validation,
            Self::Storage(_) => ErrorCategory::Storage,
        }
    }
}

/// Errors from exporting field values.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to export field {field}: {message}")]
    Failed { field: String, message: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ExportError {
    pub fn failed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors from join resolution. Any of them aborts the remaining joins.
#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    #[error(
        "Joins should always be given names beginning with an underscore (_). Join name is: {dot_path}"
    )]
    InvalidJoinName { dot_path: String },

    #[error(
        "I cannot find the instance type {with_type} (join {dot_path}), is it registered under another name?"
    )]
    UnknownType { with_type: String, dot_path: String },

    #[error("Join {dot_path} is missing its {attribute} setting")]
    Misconfigured { dot_path: String, attribute: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl JoinError {
    pub fn invalid_join_name(dot_path: impl Into<String>) -> Self {
        Self::InvalidJoinName {
            dot_path: dot_path.into(),
        }
    }

    pub fn unknown_type(with_type: impl Into<String>, dot_path: impl Into<String>) -> Self {
        Self::UnknownType {
            with_type: with_type.into(),
            dot_path: dot_path.into(),
        }
    }

    pub fn misconfigured(dot_path: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::Misconfigured {
            dot_path: dot_path.into(),
            attribute: attribute.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Storage(_) => ErrorCategory::Storage,
            _ => ErrorCategory::Configuration,
        }
    }
}

/// Errors from rendering a field.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("No renderer for field type {field_type}")]
    NoRenderer { field_type: String },

    #[error("Template {template} failed: {message}")]
    Template { template: String, message: String },
}

impl RenderError {
    pub fn template(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Template {
            template: template.into(),
            message: message.into(),
        }
    }
}

/// Categories of schema errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Schema or registry misconfiguration.
    Configuration,
    /// Invalid or missing user input.
    Validation,
    /// The content store failed.
    Storage,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Validation => write!(f, "validation"),
            Self::Storage => write!(f, "storage"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_display_and_fields() {
        let err = ConvertError::Required {
            fields: vec!["title".into(), "slug".into()],
        };
        assert_eq!(err.to_string(), "Required fields missing: title, slug");
        assert!(err.is_required());
        assert_eq!(err.failed_fields(), ["title", "slug"]);
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_within_array_prefixes_names() {
        let err = ConvertError::required("when").within_array("events", 1);
        assert_eq!(err.failed_fields(), ["events.1.when"]);

        let err = ConvertError::missing_converter("csv", "color", "shade").within_array("events", 0);
        assert!(err.failed_fields().is_empty());
    }

    #[test]
    fn test_join_error_display() {
        let err = JoinError::unknown_type("map", "_location");
        assert!(err.to_string().contains("cannot find the instance type map"));
        assert_eq!(err.category(), ErrorCategory::Configuration);

        let err = JoinError::from(StorageError::backend("down"));
        assert_eq!(err.category(), ErrorCategory::Storage);
    }
}
