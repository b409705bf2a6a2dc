//! Input and output formats for field conversion and export.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named conversion format.
///
/// `csv` is the bulk import/export format; `form` is the interactive editor format. Plugins may
/// register converters and exporters for further formats by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Format {
    Csv,
    Form,
    Custom(String),
}

impl Format {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Form => "form",
            Self::Custom(name) => name,
        }
    }

    /// User-facing formats skip `contextual` fields, bulk formats do not.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Form)
    }
}

impl From<&str> for Format {
    fn from(name: &str) -> Self {
        match name {
            "csv" => Self::Csv,
            "form" => Self::Form,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for Format {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<Format> for String {
    fn from(format: Format) -> Self {
        format.as_str().to_string()
    }
}

impl FromStr for Format {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(Format::from("csv"), Format::Csv);
        assert_eq!(Format::from("form"), Format::Form);
        assert_eq!(Format::from("xml"), Format::Custom("xml".into()));
        assert_eq!(Format::Custom("xml".into()).to_string(), "xml");
        assert!(Format::Form.is_interactive());
        assert!(!Format::Csv.is_interactive());
    }
}
