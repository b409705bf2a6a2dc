//! Field export: typed values back to an external format.
//!
//! Export is best effort. A field type without an exporter for the format is skipped with a
//! diagnostic; exporter failures still abort.

use schemata_core::{Record, RequestContext};
use tracing::warn;

use crate::error::ExportError;
use crate::field::Field;
use crate::format::Format;
use crate::registry::FieldTypeRegistry;

/// What an export left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Fields skipped for lack of an exporter, in schema order.
    pub skipped: Vec<String>,
}

/// Exports every field of `source` into `output`, in schema order.
pub async fn export_fields(
    registry: &FieldTypeRegistry,
    cx: &RequestContext,
    schema: &[Field],
    format: &Format,
    source: &Record,
    output: &mut Record,
) -> Result<ExportSummary, ExportError> {
    let mut summary = ExportSummary::default();
    for field in schema {
        let Some(exporter) = registry.exporter(format, &field.field_type) else {
            warn!(
                format = %format,
                field = %field.name,
                field_type = %field.field_type,
                "No exporter exists for schema field type, skipping"
            );
            summary.skipped.push(field.name.clone());
            continue;
        };
        exporter
            .export(cx, source, field, &field.name, output)
            .await?;
    }
    Ok(summary)
}
