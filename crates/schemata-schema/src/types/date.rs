//! `date` and `time`, normalized to `YYYY-MM-DD` and `HH:MM:SS`.

use schemata_core::{sanitize_date, sanitize_time};
use serde_json::Value;

use super::{FieldTypePlugin, Sanitizer, Text, plain_text};
use crate::field::{Field, kinds};
use crate::format::Format;

pub(super) fn plugins() -> Vec<FieldTypePlugin> {
    vec![
        FieldTypePlugin::new(kinds::DATE)
            .converters(Sanitizer(date))
            .exporter(Format::Csv, Text(plain_text)),
        FieldTypePlugin::new(kinds::TIME)
            .converters(Sanitizer(time))
            .exporter(Format::Csv, Text(plain_text)),
    ]
}

fn date(value: Option<&Value>, field: &Field) -> Value {
    sanitize_date(value, field.def_str()).map_or(Value::Null, Value::String)
}

fn time(value: Option<&Value>, field: &Field) -> Value {
    sanitize_time(value, field.def_str()).map_or(Value::Null, Value::String)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_date_falls_back_to_default() {
        let field = Field::new("when", kinds::DATE).with_def("2000-01-01");
        assert_eq!(date(Some(&json!("2024-03-01")), &field), json!("2024-03-01"));
        assert_eq!(date(Some(&json!("someday")), &field), json!("2000-01-01"));
        assert_eq!(date(None, &Field::new("when", kinds::DATE)), Value::Null);
    }
}
