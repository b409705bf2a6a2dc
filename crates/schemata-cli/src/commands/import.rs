use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use schemata_core::{Record, RequestContext};
use schemata_db_memory::{MemoryManager, MemoryManagers};
use schemata_schema::{Format, Schemas};
use serde_json::Value;
use tracing::debug;

use crate::cli::{ImportArgs, OutputFormat};
use crate::commands::{records_from_value, schema_for};
use crate::definition::Definition;
use crate::output::{print_success, print_value, print_warning};

/// Converts every CSV row through the type's schema with the `csv` format.
///
/// Every defined type gets an in-memory manager, seeded from `--data`, so join columns can
/// be resolved by title or id.
pub async fn run(
    schemas: &Schemas,
    managers: &MemoryManagers,
    args: &ImportArgs,
    format: OutputFormat,
) -> Result<()> {
    let types = Definition::load(&args.definition)?.compose_all(schemas)?;
    let schema = schema_for(&types, &args.type_name)?;

    let mut stores: HashMap<String, Arc<MemoryManager>> = HashMap::new();
    for (name, schema) in &types {
        let manager = MemoryManager::new(name.clone()).with_schema(schema.clone());
        stores.insert(name.clone(), managers.register_dedicated(name.clone(), manager));
    }
    if let Some(data) = &args.data {
        seed(managers, &mut stores, data).await?;
    }
    let target_store = stores
        .get(&args.type_name)
        .context("Imported type has no manager")?
        .clone();

    let cx = RequestContext::anonymous();
    let mut reader = csv::Reader::from_path(&args.csv)
        .with_context(|| format!("Failed to open CSV file: {}", args.csv.display()))?;
    let headers = reader.headers()?.clone();
    let mut imported = Vec::new();
    let mut rejected = 0usize;

    for (index, row) in reader.records().enumerate() {
        let line = index + 2;
        let row = row.with_context(|| format!("Invalid CSV row at line {line}"))?;
        let input: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
            .collect();

        let mut record = Record::new();
        let report = schemas
            .convert_fields_report(&cx, schema, &Format::Csv, &input, &mut record)
            .await
            .with_context(|| format!("Failed to convert line {line}"))?;
        if !report.is_ok() {
            print_warning(&format!(
                "Line {line} skipped, required fields missing: {}",
                report.failed_fields().join(", ")
            ));
            rejected += 1;
            continue;
        }
        debug!(line, "Converted row");
        imported.push(Value::Object(target_store.insert(Value::Object(record)).await?));
    }

    print_value(&Value::Array(imported.clone()), format);
    print_success(&format!(
        "Imported {} {} record(s), {rejected} rejected",
        imported.len(),
        args.type_name
    ));
    Ok(())
}

/// Loads `{ "type": [records...] }` into the managers. Types missing from the definition get
/// a plain manager.
async fn seed(
    managers: &MemoryManagers,
    stores: &mut HashMap<String, Arc<MemoryManager>>,
    path: &Path,
) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;
    let data: serde_json::Map<String, Value> =
        serde_json::from_str(&content).context("Data file must be a JSON object of type -> records")?;

    for (type_name, records) in data {
        let store = stores
            .entry(type_name.clone())
            .or_insert_with(|| {
                managers.register_dedicated(type_name.clone(), MemoryManager::new(type_name.clone()))
            })
            .clone();
        let records = records_from_value(records)
            .with_context(|| format!("Invalid records for type \"{type_name}\""))?;
        let count = records.len();
        store
            .insert_all(records.into_iter().map(Value::Object))
            .await?;
        debug!(type_name = %type_name, count, "Seeded records");
    }
    Ok(())
}
