//! Search text extraction.

use schemata_core::Record;
use serde::{Deserialize, Serialize};

use crate::field::Field;
use crate::registry::FieldTypeRegistry;

/// One weighted fragment of search text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchText {
    pub weight: u32,
    pub text: String,
    /// Silent text is searchable but kept out of result summaries.
    pub silent: bool,
}

/// Sink indexers push text into, applying each field's weight and silence.
#[derive(Debug)]
pub struct SearchTexts {
    default_weight: u32,
    texts: Vec<SearchText>,
}

impl SearchTexts {
    pub fn new(default_weight: u32) -> Self {
        Self {
            default_weight,
            texts: Vec::new(),
        }
    }

    /// Adds text for a field. Fields are silent unless they say otherwise.
    pub fn push(&mut self, field: &Field, text: impl Into<String>) {
        self.texts.push(SearchText {
            weight: field.weight.unwrap_or(self.default_weight),
            text: text.into(),
            silent: field.silent.unwrap_or(true),
        });
    }

    pub fn into_vec(self) -> Vec<SearchText> {
        self.texts
    }
}

/// Collects search text for every indexable field of the schema.
///
/// Fields with `search: false` and types without an indexer are skipped.
pub fn index_fields(
    registry: &FieldTypeRegistry,
    default_weight: u32,
    schema: &[Field],
    object: &Record,
) -> Vec<SearchText> {
    let mut texts = SearchTexts::new(default_weight);
    for field in schema {
        if field.search == Some(false) {
            continue;
        }
        if let Some(indexer) = registry.indexer(&field.field_type) {
            indexer.index(object.get(&field.name), field, &mut texts);
        }
    }
    texts.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::kinds;
    use serde_json::json;

    #[test]
    fn test_index_fields() {
        let registry = FieldTypeRegistry::with_builtins();
        let mut headline = Field::new("headline", kinds::STRING);
        headline.weight = Some(40);
        headline.silent = Some(false);
        let mut internal = Field::new("internal", kinds::STRING);
        internal.search = Some(false);
        let schema = vec![
            headline,
            internal,
            Field::new("color", kinds::SELECT).choices(["red", "blue"]),
            Field::new("sizes", kinds::CHECKBOXES).choices(["s", "m", "l"]),
            Field::new("body", kinds::AREA),
        ];
        let object = json!({
            "headline": "Big news",
            "internal": "do not index",
            "color": "red",
            "sizes": ["s", "l"],
            "body": {"type": "area", "items": []}
        });

        let texts = index_fields(&registry, 15, &schema, object.as_object().unwrap());
        assert_eq!(
            texts,
            vec![
                SearchText { weight: 40, text: "Big news".into(), silent: false },
                SearchText { weight: 15, text: "red".into(), silent: true },
                SearchText { weight: 15, text: "s l".into(), silent: true },
            ]
        );
    }

    #[test]
    fn test_missing_checkboxes_index_empty_text() {
        let registry = FieldTypeRegistry::with_builtins();
        let schema = vec![Field::new("sizes", kinds::CHECKBOXES)];
        let texts = index_fields(&registry, 10, &schema, &Record::new());
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].text, "");
        assert_eq!(texts[0].weight, 10);
    }
}
