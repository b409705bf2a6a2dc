pub mod compose;
pub mod export;
pub mod import;
pub mod index;

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use schemata_core::Record;
use schemata_schema::Schema;
use serde_json::Value;

/// Reads a JSON array of records, or a single record, from a file or stdin.
pub(crate) fn read_records(input: Option<&Path>) -> Result<Vec<Record>> {
    let content = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    let value: Value = serde_json::from_str(&content).context("Invalid JSON")?;
    records_from_value(value)
}

pub(crate) fn records_from_value(value: Value) -> Result<Vec<Record>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(record) => Ok(record),
                _ => bail!("Record {i} is not a JSON object"),
            })
            .collect(),
        Value::Object(record) => Ok(vec![record]),
        _ => bail!("Expected a JSON array of records"),
    }
}

pub(crate) fn schema_for<'t>(types: &'t IndexMap<String, Schema>, type_name: &str) -> Result<&'t Schema> {
    types.get(type_name).with_context(|| {
        let known: Vec<&str> = types.keys().map(String::as_str).collect();
        format!("Unknown type \"{type_name}\". Defined types: {}", known.join(", "))
    })
}
