//! `tags`: a deduplicated list of short strings.

use async_trait::async_trait;
use schemata_core::Record;
use schemata_core::sanitize::{sanitize_string, sanitize_tags, tags_to_array};
use serde_json::Value;

use super::{Converter, FieldTypePlugin, Text, comma_text, empty_list};
use crate::convert::ConvertContext;
use crate::error::ConvertError;
use crate::field::{Field, kinds};
use crate::format::Format;

pub(super) fn plugin() -> FieldTypePlugin {
    FieldTypePlugin::new(kinds::TAGS)
        .converter(Format::Csv, TagsFromText)
        .converter(Format::Form, TagsFromForm)
        .exporter(Format::Csv, Text(comma_text))
        .emptiness(empty_list)
}

struct TagsFromText;

#[async_trait]
impl Converter for TagsFromText {
    async fn convert(
        &self,
        _cx: &ConvertContext<'_>,
        input: &Record,
        name: &str,
        target: &mut Record,
        _field: &Field,
    ) -> Result<(), ConvertError> {
        let tags = tags_to_array(&sanitize_string(input.get(name), None));
        target.insert(name.to_string(), to_value(tags));
        Ok(())
    }
}

/// Form tags honor the locked vocabulary and the field's `limit`.
struct TagsFromForm;

#[async_trait]
impl Converter for TagsFromForm {
    async fn convert(
        &self,
        cx: &ConvertContext<'_>,
        input: &Record,
        name: &str,
        target: &mut Record,
        field: &Field,
    ) -> Result<(), ConvertError> {
        let mut tags = sanitize_tags(input.get(name));
        if cx.schemas.settings().lock_tags {
            let Some(vocabulary) = cx.schemas.tag_vocabulary() else {
                return Err(ConvertError::misconfigured(
                    name,
                    "tags are locked but no tag vocabulary is configured",
                ));
            };
            tags = vocabulary.existing_tags(cx.request, &tags).await?;
        }
        if let Some(limit) = field.limit {
            tags.truncate(limit);
        }
        target.insert(name.to_string(), to_value(tags));
        Ok(())
    }
}

fn to_value(tags: Vec<String>) -> Value {
    Value::Array(tags.into_iter().map(Value::String).collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use schemata_core::RequestContext;
    use schemata_storage::StorageError;
    use serde_json::json;

    use crate::service::{Schemas, TagVocabulary};
    use crate::settings::SchemaSettings;
    use crate::test_support::RecordingManagers;

    use super::*;

    struct Known;

    #[async_trait]
    impl TagVocabulary for Known {
        async fn existing_tags(
            &self,
            _cx: &RequestContext,
            tags: &[String],
        ) -> Result<Vec<String>, StorageError> {
            Ok(tags.iter().filter(|t| t.starts_with('k')).cloned().collect())
        }
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_csv_tags() {
        let schemas = Schemas::builder(Arc::new(RecordingManagers::default())).build();
        let cx = RequestContext::anonymous();
        let mut target = Record::new();
        schemas
            .convert_fields(
                &cx,
                &[Field::new("tags", kinds::TAGS)],
                &Format::Csv,
                &record(json!({"tags": "red, blue,,red"})),
                &mut target,
            )
            .await
            .unwrap();
        assert_eq!(target.get("tags"), Some(&json!(["red", "blue"])));
    }

    #[tokio::test]
    async fn test_locked_form_tags_with_limit() {
        let schemas = Schemas::builder(Arc::new(RecordingManagers::default()))
            .settings(SchemaSettings {
                lock_tags: true,
                ..SchemaSettings::default()
            })
            .tag_vocabulary(Arc::new(Known))
            .build();
        let cx = RequestContext::anonymous();
        let mut field = Field::new("tags", kinds::TAGS);
        field.limit = Some(2);
        let mut target = Record::new();

        schemas
            .convert_fields(
                &cx,
                &[field],
                &Format::Form,
                &record(json!({"tags": ["kiwi", "new", "kale", "kelp"]})),
                &mut target,
            )
            .await
            .unwrap();
        assert_eq!(target.get("tags"), Some(&json!(["kiwi", "kale"])));
    }

    #[tokio::test]
    async fn test_unlocked_form_tags_pass_through() {
        let schemas = Schemas::builder(Arc::new(RecordingManagers::default()))
            .tag_vocabulary(Arc::new(Known))
            .build();
        let cx = RequestContext::anonymous();
        let mut target = Record::new();
        schemas
            .convert_fields(
                &cx,
                &[Field::new("tags", kinds::TAGS)],
                &Format::Form,
                &record(json!({"tags": ["new", " kiwi "]})),
                &mut target,
            )
            .await
            .unwrap();
        assert_eq!(target.get("tags"), Some(&json!(["new", "kiwi"])));
    }

    #[tokio::test]
    async fn test_locked_tags_without_vocabulary_rejected() {
        let schemas = Schemas::builder(Arc::new(RecordingManagers::default()))
            .settings(SchemaSettings {
                lock_tags: true,
                ..SchemaSettings::default()
            })
            .build();
        let cx = RequestContext::anonymous();
        let mut target = Record::new();

        let err = schemas
            .convert_fields(
                &cx,
                &[Field::new("tags", kinds::TAGS)],
                &Format::Form,
                &record(json!({"tags": ["brand-new", "unvetted"]})),
                &mut target,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ConvertError::Misconfigured { ref field, .. } if field == "tags"));
        assert!(!target.contains_key("tags"));
    }
}
