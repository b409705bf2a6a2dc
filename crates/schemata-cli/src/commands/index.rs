use anyhow::Result;
use schemata_core::record_id;
use schemata_schema::Schemas;
use serde_json::{Value, json};

use crate::cli::{IndexArgs, OutputFormat};
use crate::commands::{read_records, schema_for};
use crate::definition::Definition;
use crate::output::{print_search_texts, print_value};

pub fn run(schemas: &Schemas, args: &IndexArgs, format: OutputFormat) -> Result<()> {
    let types = Definition::load(&args.definition)?.compose_all(schemas)?;
    let schema = schema_for(&types, &args.type_name)?;
    let records = read_records(args.input.as_deref())?;

    let texts: Vec<(String, Vec<_>)> = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let id = record_id(record).map_or_else(|| format!("#{index}"), str::to_string);
            (id, schemas.index_fields(schema, record))
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let out: Vec<Value> = texts
                .iter()
                .map(|(id, entries)| json!({"_id": id, "texts": entries}))
                .collect();
            print_value(&Value::Array(out), format);
        }
        OutputFormat::Table => print_search_texts(&texts),
    }
    Ok(())
}
