//! `array`: a list of sub-records, each converted through the field's nested schema.

use async_trait::async_trait;
use schemata_core::{Record, generate_id, sanitize_id};
use serde_json::Value;

use super::{Converter, FieldTypePlugin, Ignore, empty_list};
use crate::convert::{self, ConvertContext};
use crate::error::ConvertError;
use crate::field::{Field, kinds};
use crate::format::Format;

/// Key holding each element's stable id.
const ELEMENT_ID_KEY: &str = "id";

pub(super) fn plugin() -> FieldTypePlugin {
    FieldTypePlugin::new(kinds::ARRAY)
        .converter(Format::Csv, Ignore)
        .converter(Format::Form, ConvertElements)
        .emptiness(empty_list)
}

struct ConvertElements;

#[async_trait]
impl Converter for ConvertElements {
    async fn convert(
        &self,
        cx: &ConvertContext<'_>,
        input: &Record,
        name: &str,
        target: &mut Record,
        field: &Field,
    ) -> Result<(), ConvertError> {
        let Some(schema) = field.schema.as_deref() else {
            return Err(ConvertError::misconfigured(name, "array fields need a schema"));
        };
        let mut elements = Vec::new();
        let mut failed = Vec::new();
        if let Some(Value::Array(items)) = input.get(name) {
            for (index, item) in items.iter().enumerate() {
                let Some(item) = item.as_object() else {
                    continue;
                };
                let mut element = Record::new();
                let id = sanitize_id(item.get(ELEMENT_ID_KEY)).unwrap_or_else(generate_id);
                element.insert(ELEMENT_ID_KEY.to_string(), Value::String(id));
                if cx.collects_failures() {
                    let report = convert::convert_fields_report(cx, schema, item, &mut element)
                        .await
                        .map_err(|e| e.within_array(name, index))?;
                    failed.extend(
                        report
                            .failed_fields()
                            .into_iter()
                            .map(|f| format!("{name}.{index}.{f}")),
                    );
                } else {
                    convert::convert_fields(cx, schema, item, &mut element)
                        .await
                        .map_err(|e| e.within_array(name, index))?;
                }
                elements.push(Value::Object(element));
            }
        }
        target.insert(name.to_string(), Value::Array(elements));
        if failed.is_empty() {
            Ok(())
        } else {
            Err(ConvertError::Required { fields: failed })
        }
    }
}
