use std::path::Path;

use anyhow::Result;
use schemata_schema::Schemas;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::commands::schema_for;
use crate::definition::Definition;
use crate::output::{print_schema_table, print_value};

pub fn run(
    schemas: &Schemas,
    definition: &Path,
    type_name: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let types = Definition::load(definition)?.compose_all(schemas)?;
    let selected: Vec<(&str, &schemata_schema::Schema)> = match type_name {
        Some(name) => vec![(name, schema_for(&types, name)?)],
        None => types.iter().map(|(name, schema)| (name.as_str(), schema)).collect(),
    };

    match format {
        OutputFormat::Json => {
            let mut out = serde_json::Map::new();
            for (name, schema) in selected {
                out.insert(name.to_string(), serde_json::to_value(schema)?);
            }
            print_value(&Value::Object(out), format);
        }
        OutputFormat::Table => {
            for (name, schema) in selected {
                print_schema_table(name, schema);
            }
        }
    }
    Ok(())
}
