//! `integer` and `float`, clamped to the field's `min`/`max`.

use schemata_core::sanitize::{sanitize_float, sanitize_integer};
use serde_json::{Number, Value};

use super::{FieldTypePlugin, Sanitizer, Text, plain_text};
use crate::field::{Field, kinds};
use crate::format::Format;

pub(super) fn plugins() -> Vec<FieldTypePlugin> {
    vec![
        FieldTypePlugin::new(kinds::INTEGER)
            .converters(Sanitizer(integer))
            .exporter(Format::Csv, Text(plain_text)),
        FieldTypePlugin::new(kinds::FLOAT)
            .converters(Sanitizer(float))
            .exporter(Format::Csv, Text(plain_text)),
    ]
}

fn integer(value: Option<&Value>, field: &Field) -> Value {
    let def = field.def.as_ref().and_then(Value::as_i64);
    let min = field.min.map(|m| m.ceil() as i64);
    let max = field.max.map(|m| m.floor() as i64);
    Value::from(sanitize_integer(value, def, min, max))
}

fn float(value: Option<&Value>, field: &Field) -> Value {
    let def = field.def.as_ref().and_then(Value::as_f64);
    let parsed = sanitize_float(value, def, field.min, field.max);
    Number::from_f64(parsed).map_or(Value::Null, Value::Number)
}
