//! `string` and `slug`.

use schemata_core::sanitize::{sanitize_string, slugify};
use serde_json::Value;

use super::{FieldTypePlugin, Sanitizer, Text, empty_text, index_text, plain_text};
use crate::field::{Field, kinds};
use crate::format::Format;

pub(super) fn plugins() -> Vec<FieldTypePlugin> {
    vec![
        FieldTypePlugin::new(kinds::STRING)
            .converters(Sanitizer(string))
            .exporter(Format::Csv, Text(plain_text))
            .indexer(index_text)
            .emptiness(empty_text),
        FieldTypePlugin::new(kinds::SLUG)
            .converters(Sanitizer(slug))
            .exporter(Format::Csv, Text(plain_text))
            .emptiness(empty_text),
    ]
}

fn string(value: Option<&Value>, field: &Field) -> Value {
    Value::String(sanitize_string(value, field.def_str()))
}

fn slug(value: Option<&Value>, field: &Field) -> Value {
    Value::String(slugify(&sanitize_string(value, field.def_str())))
}
