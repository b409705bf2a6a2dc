//! `boolean`.

use schemata_core::sanitize::sanitize_boolean;
use serde_json::Value;

use super::{FieldTypePlugin, Sanitizer, Text};
use crate::field::{Field, kinds};
use crate::format::Format;

pub(super) fn plugin() -> FieldTypePlugin {
    FieldTypePlugin::new(kinds::BOOLEAN)
        .converters(Sanitizer(boolean))
        .exporter(Format::Csv, Text(boolean_text))
        .emptiness(unchecked)
}

fn unchecked(_field: &Field, value: &Value) -> bool {
    value.as_bool() == Some(false)
}

fn boolean(value: Option<&Value>, field: &Field) -> Value {
    let def = field.def.as_ref().and_then(Value::as_bool);
    Value::Bool(sanitize_boolean(value, def))
}

fn boolean_text(value: Option<&Value>) -> String {
    sanitize_boolean(value, None).to_string()
}
