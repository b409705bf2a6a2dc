use std::io;

use anyhow::{Context, Result};
use indexmap::IndexSet;
use schemata_core::{Record, RequestContext};
use schemata_schema::{Format, Schemas};
use serde_json::Value;

use crate::cli::ExportArgs;
use crate::commands::{read_records, schema_for};
use crate::definition::Definition;
use crate::output::print_warning;

/// Writes the records as CSV on stdout, one column per exported field in schema order.
pub async fn run(schemas: &Schemas, args: &ExportArgs) -> Result<()> {
    let types = Definition::load(&args.definition)?.compose_all(schemas)?;
    let schema = schema_for(&types, &args.type_name)?;
    let records = read_records(args.input.as_deref())?;

    let cx = RequestContext::anonymous();
    let mut rows = Vec::with_capacity(records.len());
    let mut skipped: IndexSet<String> = IndexSet::new();
    for (index, record) in records.iter().enumerate() {
        let mut row = Record::new();
        let summary = schemas
            .export_fields(&cx, schema, &Format::Csv, record, &mut row)
            .await
            .with_context(|| format!("Failed to export record {index}"))?;
        skipped.extend(summary.skipped);
        rows.push(row);
    }
    if !skipped.is_empty() {
        let names: Vec<&str> = skipped.iter().map(String::as_str).collect();
        print_warning(&format!("No CSV exporter for: {}", names.join(", ")));
    }

    let columns: Vec<&str> = schema
        .iter()
        .map(|field| field.name.as_str())
        .filter(|name| rows.iter().any(|row| row.contains_key(*name)))
        .collect();

    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(&columns)?;
    for row in &rows {
        writer.write_record(columns.iter().map(|column| {
            row.get(*column)
                .and_then(Value::as_str)
                .unwrap_or_default()
        }))?;
    }
    writer.flush()?;
    Ok(())
}
