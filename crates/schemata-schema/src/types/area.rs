//! `area` and `singleton`: rich content stored as `{type: "area", items: [...]}`.

use std::sync::LazyLock;

use regex::Regex;
use schemata_core::sanitize::{escape_html, sanitize_string};
use serde_json::{Value, json};

use super::{FieldTypePlugin, Sanitizer};
use crate::field::{Field, kinds};
use crate::format::Format;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

const AREA_TYPE: &str = "area";
const RICH_TEXT_TYPE: &str = "richText";

pub(super) fn plugins() -> Vec<FieldTypePlugin> {
    [kinds::AREA, kinds::SINGLETON]
        .into_iter()
        .map(|kind| {
            FieldTypePlugin::new(kind)
                .converter(Format::Csv, Sanitizer(area_from_text))
                .converter(Format::Form, Sanitizer(area_from_form))
                .emptiness(empty_area)
        })
        .collect()
}

/// Wraps plain text in an area holding one rich text item. Blank text gives an empty area.
pub fn text_to_area(text: &str) -> Value {
    let items = if text.is_empty() {
        Vec::new()
    } else {
        vec![json!({
            "type": RICH_TEXT_TYPE,
            "content": format!("<p>{}</p>", escape_html(text)),
        })]
    };
    json!({"type": AREA_TYPE, "items": items})
}

/// Whether an area holds nothing visible: no items, or only rich text without text.
pub fn area_is_empty(area: &Value) -> bool {
    let Some(items) = area_items(area) else {
        return true;
    };
    items.iter().all(|item| {
        item.get("type").and_then(Value::as_str) == Some(RICH_TEXT_TYPE)
            && item
                .get("content")
                .and_then(Value::as_str)
                .is_none_or(|content| TAG.replace_all(content, "").trim().is_empty())
    })
}

fn area_items(area: &Value) -> Option<&Vec<Value>> {
    match area {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("items").and_then(Value::as_array),
        _ => None,
    }
}

fn area_from_text(value: Option<&Value>, field: &Field) -> Value {
    text_to_area(&sanitize_string(value, field.def_str()))
}

fn area_from_form(value: Option<&Value>, _field: &Field) -> Value {
    let items: Vec<Value> = value
        .and_then(area_items)
        .into_iter()
        .flatten()
        .filter(|item| item.get("type").is_some_and(Value::is_string))
        .cloned()
        .collect();
    json!({"type": AREA_TYPE, "items": items})
}

fn empty_area(_field: &Field, value: &Value) -> bool {
    area_is_empty(value)
}
