//! Field conversion: raw input into sanitized, typed values.
//!
//! Fields are converted strictly in schema order, one at a time, because a converter may
//! depend on values assigned by an earlier one.

use schemata_core::{Record, RequestContext};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ConvertError;
use crate::field::{Field, JoinKind};
use crate::format::Format;
use crate::service::Schemas;

/// Everything a converter may consult besides the raw input.
#[derive(Clone, Copy)]
pub struct ConvertContext<'a> {
    pub request: &'a RequestContext,
    pub schemas: &'a Schemas,
    pub format: &'a Format,
    collect_failures: bool,
}

impl<'a> ConvertContext<'a> {
    pub fn new(request: &'a RequestContext, schemas: &'a Schemas, format: &'a Format) -> Self {
        Self {
            request,
            schemas,
            format,
            collect_failures: false,
        }
    }

    /// True while producing a [`ConversionReport`]. Converters with nested fields then keep
    /// going past required failures instead of stopping at the first one.
    pub fn collects_failures(&self) -> bool {
        self.collect_failures
    }

    fn collecting(self) -> Self {
        Self {
            collect_failures: true,
            ..self
        }
    }
}

/// What happened to one field during a reported conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldOutcome {
    Converted,
    /// Converted and assigned, but some nested fields failed; they are reported separately.
    Partial,
    /// Contextual field skipped by an interactive format.
    Skipped,
    /// Required but left empty.
    Required,
}

/// Per-field results of [`convert_fields_report`], in schema order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionReport {
    pub outcomes: Vec<(String, FieldOutcome)>,
}

impl ConversionReport {
    /// Names of the fields that failed, in schema order.
    pub fn failed_fields(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == FieldOutcome::Required)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn is_ok(&self) -> bool {
        self.failed_fields().is_empty()
    }

    /// The failures as a single error, if there were any.
    pub fn into_result(self) -> Result<(), ConvertError> {
        let fields: Vec<String> = self
            .failed_fields()
            .into_iter()
            .map(str::to_string)
            .collect();
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ConvertError::Required { fields })
        }
    }
}

/// Converts `input` into `target` field by field, stopping at the first failure.
pub async fn convert_fields(
    cx: &ConvertContext<'_>,
    schema: &[Field],
    input: &Record,
    target: &mut Record,
) -> Result<(), ConvertError> {
    for field in schema {
        convert_field(cx, field, input, target).await?;
    }
    Ok(())
}

/// Like [`convert_fields`], but continues past required-field failures and reports every
/// field's outcome. Configuration and storage errors still abort.
pub async fn convert_fields_report(
    cx: &ConvertContext<'_>,
    schema: &[Field],
    input: &Record,
    target: &mut Record,
) -> Result<ConversionReport, ConvertError> {
    let cx = &cx.collecting();
    let mut report = ConversionReport::default();
    for field in schema {
        match convert_field(cx, field, input, target).await {
            Ok(outcome) => report.outcomes.push((field.name.clone(), outcome)),
            Err(ConvertError::Required { fields }) => {
                if !fields.contains(&field.name) {
                    report
                        .outcomes
                        .push((field.name.clone(), FieldOutcome::Partial));
                }
                report.outcomes.extend(
                    fields
                        .into_iter()
                        .map(|name| (name, FieldOutcome::Required)),
                );
            }
            Err(err) => return Err(err),
        }
    }
    Ok(report)
}

async fn convert_field(
    cx: &ConvertContext<'_>,
    field: &Field,
    input: &Record,
    target: &mut Record,
) -> Result<FieldOutcome, ConvertError> {
    if field.contextual && cx.format.is_interactive() {
        debug!(field = %field.name, "Skipping contextual field");
        return Ok(FieldOutcome::Skipped);
    }

    let converter = cx
        .schemas
        .registry()
        .converter(cx.format, &field.field_type)
        .ok_or_else(|| ConvertError::missing_converter(cx.format, &field.field_type, &field.name))?;

    converter
        .convert(cx, input, &field.name, target, field)
        .await?;

    if cx.schemas.settings().enforce_required && field.required && is_unfilled(cx, field, target) {
        return Err(ConvertError::required(&field.name));
    }
    Ok(FieldOutcome::Converted)
}

fn is_unfilled(cx: &ConvertContext<'_>, field: &Field, target: &Record) -> bool {
    if field.is_group() || field.join_kind().is_some_and(JoinKind::is_reverse) {
        return false;
    }
    match target.get(field.storage_key()) {
        None | Some(Value::Null) => true,
        Some(value) => cx.schemas.registry().is_value_empty(field, value),
    }
}
