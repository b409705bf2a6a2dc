//! `select` and `checkboxes`: values restricted to the field's choices.

use schemata_core::sanitize::{sanitize_select, sanitize_string};
use serde_json::Value;

use super::{FieldTypePlugin, Sanitizer, Text, comma_text, empty_list, index_text, plain_text};
use crate::field::{Field, kinds};
use crate::format::Format;
use crate::index::SearchTexts;

pub(super) fn plugins() -> Vec<FieldTypePlugin> {
    vec![
        FieldTypePlugin::new(kinds::SELECT)
            .converters(Sanitizer(select))
            .exporter(Format::Csv, Text(plain_text))
            .indexer(index_text),
        FieldTypePlugin::new(kinds::CHECKBOXES)
            .converter(Format::Csv, Sanitizer(checkboxes_from_text))
            .converter(Format::Form, Sanitizer(checkboxes_from_list))
            .exporter(Format::Csv, Text(comma_text))
            .indexer(index_checkboxes)
            .emptiness(empty_list),
    ]
}

fn select(value: Option<&Value>, field: &Field) -> Value {
    sanitize_select(value, field.choice_values(), field.def_str())
        .map(Value::String)
        .unwrap_or(Value::Null)
}

fn checkboxes_from_text(value: Option<&Value>, field: &Field) -> Value {
    let text = sanitize_string(value, None);
    keep_choices(field, text.split(',').map(str::trim))
}

fn checkboxes_from_list(value: Option<&Value>, field: &Field) -> Value {
    match value {
        Some(Value::Array(items)) => keep_choices(field, items.iter().filter_map(Value::as_str)),
        _ => Value::Array(Vec::new()),
    }
}

fn keep_choices<'a>(field: &Field, picked: impl Iterator<Item = &'a str>) -> Value {
    Value::Array(
        picked
            .filter(|choice| field.choice_values().any(|allowed| allowed == *choice))
            .map(|choice| Value::String(choice.to_string()))
            .collect(),
    )
}

fn index_checkboxes(value: Option<&Value>, field: &Field, texts: &mut SearchTexts) {
    let words: Vec<String> = value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|item| plain_text(Some(item)))
        .collect();
    texts.push(field, words.join(" "));
}
