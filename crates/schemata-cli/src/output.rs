use colored::Colorize;
use indexmap::IndexSet;
use schemata_core::{Record, record_id};
use schemata_schema::{Field, SearchText};
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_value(value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", pretty(value)),
        OutputFormat::Table => print_records_table(value),
    }
}

pub fn print_success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// One row per field.
pub fn print_schema_table(type_name: &str, schema: &[Field]) {
    println!("{} {}", "Type:".cyan(), type_name.cyan());
    let mut builder = Builder::default();
    builder.push_record(["Name", "Type", "Label", "Required", "Group"]);
    for field in schema {
        builder.push_record([
            field.name.as_str(),
            field.field_type.as_str(),
            field.label.as_deref().unwrap_or("-"),
            if field.required { "yes" } else { "" },
            field.group.as_deref().unwrap_or("-"),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));
}

pub fn print_search_texts(texts: &[(String, Vec<SearchText>)]) {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Weight", "Silent", "Text"]);
    for (id, entries) in texts {
        for entry in entries {
            builder.push_record([
                id.clone(),
                entry.weight.to_string(),
                entry.silent.to_string(),
                entry.text.clone(),
            ]);
        }
    }
    println!("{}", builder.build().with(Style::rounded()));
}

fn print_records_table(value: &Value) {
    let records: Vec<&Record> = match value {
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        Value::Object(record) => vec![record],
        other => {
            println!("{}", pretty(other));
            return;
        }
    };
    if records.is_empty() {
        println!("No records.");
        return;
    }

    let mut columns: IndexSet<&str> = IndexSet::new();
    for record in &records {
        columns.extend(record.keys().map(String::as_str));
    }
    let mut builder = Builder::default();
    builder.push_record(columns.iter().copied());
    for record in &records {
        builder.push_record(columns.iter().map(|column| cell(record.get(*column))));
    }
    println!("{}", builder.build().with(Style::rounded()));
    println!("Total: {}", records.len());
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(related)) => match record_id(related) {
            Some(id) => format!("→{id}"),
            None => Value::Object(related.clone()).to_string(),
        },
        Some(other) => other.to_string(),
    }
}
