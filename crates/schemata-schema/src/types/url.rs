//! `url`.

use schemata_core::sanitize::sanitize_url;
use serde_json::Value;

use super::{FieldTypePlugin, Sanitizer, Text, plain_text};
use crate::field::{Field, kinds};
use crate::format::Format;

pub(super) fn plugin() -> FieldTypePlugin {
    FieldTypePlugin::new(kinds::URL)
        .converters(Sanitizer(url))
        .exporter(Format::Csv, Text(plain_text))
}

fn url(value: Option<&Value>, field: &Field) -> Value {
    sanitize_url(value, field.def_str()).map_or(Value::Null, Value::String)
}
