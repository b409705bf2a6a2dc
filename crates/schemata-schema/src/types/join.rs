//! Join field types. Imports resolve titles or ids through the related type's manager;
//! forms carry sanitized ids. Reverse joins are computed at read time and never stored.

use async_trait::async_trait;
use schemata_core::sanitize::{
    sanitize_boolean, sanitize_select, sanitize_string, sanitize_tags, sortify,
};
use schemata_core::{ID_KEY, Record, SORT_TITLE_KEY, record_id, sanitize_id, sanitize_ids};
use schemata_storage::{Criteria, GetOptions, Manager, WithJoins};
use serde_json::{Map, Value};
use tracing::warn;

use super::{Converter, FieldTypePlugin, Ignore};
use crate::convert::ConvertContext;
use crate::error::ConvertError;
use crate::field::{Field, kinds};
use crate::format::Format;

pub(super) fn plugins() -> Vec<FieldTypePlugin> {
    vec![
        FieldTypePlugin::new(kinds::JOIN_BY_ONE)
            .converter(Format::Csv, ImportOne)
            .converter(Format::Form, FormOne),
        FieldTypePlugin::new(kinds::JOIN_BY_ARRAY)
            .converter(Format::Csv, ImportArray)
            .converter(Format::Form, FormArray),
        FieldTypePlugin::new(kinds::JOIN_BY_ONE_REVERSE).converters(Ignore),
        FieldTypePlugin::new(kinds::JOIN_BY_ARRAY_REVERSE).converters(Ignore),
    ]
}

fn id_field(field: &Field) -> Result<&str, ConvertError> {
    field
        .id_field
        .as_deref()
        .ok_or_else(|| ConvertError::misconfigured(&field.name, "joinByOne needs an idField"))
}

fn ids_field(field: &Field) -> Result<&str, ConvertError> {
    field
        .ids_field
        .as_deref()
        .ok_or_else(|| ConvertError::misconfigured(&field.name, "joinByArray needs an idsField"))
}

/// The related type and its manager.
fn related<'a>(cx: &ConvertContext<'_>, field: &'a Field) -> Result<(&'a str, Manager), ConvertError> {
    let with_type = field
        .with_type
        .as_deref()
        .ok_or_else(|| ConvertError::misconfigured(&field.name, "join fields need withType"))?;
    let manager = cx
        .schemas
        .managers()
        .manager(with_type)
        .ok_or_else(|| ConvertError::unknown_type(with_type, &field.name))?;
    Ok((with_type, manager))
}

/// Finds the id of the related record whose title or id matches `title_or_id`.
async fn resolve(
    cx: &ConvertContext<'_>,
    manager: &Manager,
    with_type: &str,
    title_or_id: &str,
) -> Result<Option<String>, ConvertError> {
    let criteria = Criteria::Or(vec![
        Criteria::field_eq(SORT_TITLE_KEY, sortify(title_or_id)),
        Criteria::field_eq(ID_KEY, title_or_id),
    ]);
    let options = GetOptions {
        fields: Some(vec![ID_KEY.to_string()]),
        ..GetOptions::with_joins(WithJoins::Disabled)
    };
    let found = manager
        .fetch(cx.request, with_type, criteria, &options)
        .await?;
    Ok(found
        .items
        .first()
        .and_then(record_id)
        .map(str::to_string))
}

struct ImportOne;

#[async_trait]
impl Converter for ImportOne {
    async fn convert(
        &self,
        cx: &ConvertContext<'_>,
        input: &Record,
        name: &str,
        target: &mut Record,
        field: &Field,
    ) -> Result<(), ConvertError> {
        let id_field = id_field(field)?;
        let (with_type, manager) = related(cx, field)?;
        let text = sanitize_string(input.get(name), None);
        if text.is_empty() {
            return Ok(());
        }
        if let Some(id) = resolve(cx, &manager, with_type, &text).await? {
            target.insert(id_field.to_string(), Value::String(id));
        }
        Ok(())
    }
}

struct ImportArray;

#[async_trait]
impl Converter for ImportArray {
    async fn convert(
        &self,
        cx: &ConvertContext<'_>,
        input: &Record,
        name: &str,
        target: &mut Record,
        field: &Field,
    ) -> Result<(), ConvertError> {
        let ids_field = ids_field(field)?;
        let (with_type, manager) = related(cx, field)?;
        let text = sanitize_string(input.get(name), None);
        let mut ids: Vec<Value> = Vec::new();
        for title_or_id in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if let Some(id) = resolve(cx, &manager, with_type, title_or_id).await? {
                let id = Value::String(id);
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        target.insert(ids_field.to_string(), Value::Array(ids));
        Ok(())
    }
}

struct FormOne;

#[async_trait]
impl Converter for FormOne {
    async fn convert(
        &self,
        _cx: &ConvertContext<'_>,
        input: &Record,
        _name: &str,
        target: &mut Record,
        field: &Field,
    ) -> Result<(), ConvertError> {
        let id_field = id_field(field)?;
        let id = sanitize_id(input.get(id_field)).map_or(Value::Null, Value::String);
        target.insert(id_field.to_string(), id);
        Ok(())
    }
}

struct FormArray;

#[async_trait]
impl Converter for FormArray {
    async fn convert(
        &self,
        _cx: &ConvertContext<'_>,
        input: &Record,
        _name: &str,
        target: &mut Record,
        field: &Field,
    ) -> Result<(), ConvertError> {
        let ids_field = ids_field(field)?;
        let ids = sanitize_ids(input.get(ids_field));

        if let Some(relationships_field) = field.relationships_field.as_deref() {
            let raw = input.get(relationships_field).and_then(Value::as_object);
            let mut relationships = Map::new();
            for id in &ids {
                let attributes = raw.and_then(|r| r.get(id)).and_then(Value::as_object);
                relationships.insert(
                    id.clone(),
                    Value::Object(sanitize_relationship(&field.relationship, attributes)),
                );
            }
            target.insert(relationships_field.to_string(), Value::Object(relationships));
        }

        target.insert(
            ids_field.to_string(),
            Value::Array(ids.into_iter().map(Value::String).collect()),
        );
        Ok(())
    }
}

/// Sanitizes one id's relationship attributes. Only simple attribute types are supported.
fn sanitize_relationship(schema: &[Field], attributes: Option<&Record>) -> Record {
    let mut out = Record::new();
    for attribute in schema {
        let raw = attributes.and_then(|a| a.get(&attribute.name));
        let value = match attribute.field_type.as_str() {
            kinds::STRING => Value::String(sanitize_string(raw, attribute.def_str())),
            kinds::BOOLEAN => Value::Bool(sanitize_boolean(
                raw,
                attribute.def.as_ref().and_then(Value::as_bool),
            )),
            kinds::SELECT => sanitize_select(raw, attribute.choice_values(), attribute.def_str())
                .map_or(Value::Null, Value::String),
            kinds::TAGS => Value::Array(sanitize_tags(raw).into_iter().map(Value::String).collect()),
            other => {
                warn!(
                    attribute = %attribute.name,
                    field_type = %other,
                    "Relationship attribute type is not supported, skipping"
                );
                continue;
            }
        };
        out.insert(attribute.name.clone(), value);
    }
    out
}
