//! Schema composition.
//!
//! Composition options are applied in a fixed order: `addFields`, `removeFields`,
//! `orderFields`, `requireFields`, `alterFields`, `groupFields`. A final pass normalizes
//! template hooks and sanity-checks `select` choices.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use schemata_core::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ComposeError;
use crate::field::{Field, GroupSpec, RenderHook, Schema, kinds};
use crate::registry::FieldTypeRegistry;

/// Caller-supplied schema mutation, run after `requireFields`.
pub type AlterFields = Arc<dyn Fn(&mut Schema) + Send + Sync>;

/// Options for [`compose`].
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComposeSpec {
    pub add_fields: Vec<Field>,
    pub remove_fields: Vec<String>,
    pub order_fields: Vec<String>,
    pub require_fields: Vec<String>,
    #[serde(skip)]
    pub alter_fields: Option<AlterFields>,
    pub group_fields: Option<Vec<GroupSpec>>,
}

impl ComposeSpec {
    pub fn add_fields(fields: Schema) -> Self {
        Self {
            add_fields: fields,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn alter_fields(mut self, alter: impl Fn(&mut Schema) + Send + Sync + 'static) -> Self {
        self.alter_fields = Some(Arc::new(alter));
        self
    }
}

impl fmt::Debug for ComposeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeSpec")
            .field("add_fields", &self.add_fields)
            .field("remove_fields", &self.remove_fields)
            .field("order_fields", &self.order_fields)
            .field("require_fields", &self.require_fields)
            .field("alter_fields", &self.alter_fields.as_ref().map(|_| ".."))
            .field("group_fields", &self.group_fields)
            .finish()
    }
}

/// Builds a schema from composition options.
///
/// With `strict_groups`, a `groupFields` member that names no field is an error; otherwise it
/// is ignored, which lets a subtype remove fields without restating its groups.
pub fn compose(spec: &ComposeSpec, strict_groups: bool) -> Result<Schema, ComposeError> {
    let mut schema = Schema::new();

    add_fields(&mut schema, &spec.add_fields);

    if !spec.remove_fields.is_empty() {
        schema.retain(|field| !spec.remove_fields.contains(&field.name));
    }

    if !spec.order_fields.is_empty() {
        schema = order_fields(schema, &spec.order_fields);
    }

    for name in &spec.require_fields {
        if let Some(field) = schema.iter_mut().find(|f| &f.name == name) {
            field.required = true;
        }
    }

    if let Some(alter) = &spec.alter_fields {
        alter(&mut schema);
    }

    check_unique(&schema)?;

    if let Some(groups) = &spec.group_fields {
        schema = group_fields(schema, groups, strict_groups)?;
    }

    for field in &mut schema {
        field.clear_positioning();
        if let Some(template) = field.template.take() {
            field.render = Some(RenderHook::Template(template));
        }
    }

    check_show_fields(&schema);

    Ok(schema)
}

/// Reapplies composition on top of an existing schema, which becomes the base `addFields`
/// layer. The original schema is left untouched.
pub fn refine(
    schema: &[Field],
    spec: &ComposeSpec,
    strict_groups: bool,
) -> Result<Schema, ComposeError> {
    let mut refined = spec.clone();
    refined.add_fields = schema
        .iter()
        .cloned()
        .chain(spec.add_fields.iter().cloned())
        .collect();
    compose(&refined, strict_groups)
}

/// Only the named fields, plus the groups that still have members.
///
/// Fields whose group was dropped lose their group reference.
pub fn subset(schema: &[Field], names: &[&str]) -> Schema {
    let mut kept: Schema = schema
        .iter()
        .filter(|field| field.is_group() || names.contains(&field.name.as_str()))
        .cloned()
        .collect();

    let populated: HashSet<String> = kept
        .iter()
        .filter(|f| !f.is_group())
        .filter_map(|f| f.group.clone())
        .collect();
    kept.retain(|field| !field.is_group() || populated.contains(&field.name));

    let surviving: HashSet<String> = kept
        .iter()
        .filter(|f| f.is_group())
        .map(|f| f.name.clone())
        .collect();
    for field in &mut kept {
        if field.group.as_ref().is_some_and(|g| !surviving.contains(g)) {
            field.group = None;
        }
    }
    kept
}

/// A record holding each field's default; fields without one are omitted.
pub fn new_instance(schema: &[Field]) -> Record {
    schema
        .iter()
        .filter_map(|field| field.def.clone().map(|def| (field.name.clone(), def)))
        .collect()
}

/// Copies only what the schema describes, including join storage keys.
pub fn subset_instance(schema: &[Field], instance: &Record) -> Record {
    let mut subset = Record::new();
    for field in schema.iter().filter(|f| !f.is_group()) {
        let keys = [
            Some(field.name.as_str()),
            field.id_field.as_deref(),
            field.ids_field.as_deref(),
        ];
        for key in keys.into_iter().flatten() {
            if let Some(value) = instance.get(key) {
                subset.insert(key.to_string(), value.clone());
            }
        }
    }
    subset
}

/// True when no field of the schema holds a non-empty value.
///
/// `null`, a missing value and `false` are empty. Any other value is judged by the type's
/// emptiness predicate, and types without one count as non-empty.
pub fn empty(registry: &FieldTypeRegistry, schema: &[Field], object: &Record) -> bool {
    !schema.iter().any(|field| match object.get(&field.name) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(value) => !registry.is_value_empty(field, value),
    })
}

fn add_fields(schema: &mut Schema, fields: &[Field]) {
    let mut next_splice = 0;
    for field in fields {
        let positioned = field.before.is_some() || field.after.is_some();
        if let Some(existing) = position(schema, &field.name) {
            schema.remove(existing);
            if !positioned {
                schema.insert(existing, field.clone());
                continue;
            }
        }
        if field.start {
            next_splice = 0;
        }
        if field.end {
            next_splice = schema.len();
        }
        if let Some(i) = field.after.as_deref().and_then(|name| position(schema, name)) {
            next_splice = i + 1;
        }
        if let Some(i) = field.before.as_deref().and_then(|name| position(schema, name)) {
            next_splice = i;
        }
        let at = next_splice.min(schema.len());
        schema.insert(at, field.clone());
        next_splice = at + 1;
    }
}

fn position(schema: &[Field], name: &str) -> Option<usize> {
    schema.iter().position(|f| f.name == name)
}

fn order_fields(schema: Schema, order: &[String]) -> Schema {
    let (mut named, rest): (Schema, Schema) = schema
        .into_iter()
        .partition(|field| order.contains(&field.name));
    named.sort_by_key(|field| order.iter().position(|name| name == &field.name));
    named.extend(rest);
    named
}

fn check_unique(schema: &[Field]) -> Result<(), ComposeError> {
    let mut seen = HashSet::new();
    for field in schema {
        if !seen.insert(field.name.as_str()) {
            return Err(ComposeError::DuplicateField {
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}

fn group_fields(
    schema: Schema,
    groups: &[GroupSpec],
    strict: bool,
) -> Result<Schema, ComposeError> {
    let mut fields: Schema = schema.into_iter().filter(|f| !f.is_group()).collect();
    for field in &mut fields {
        field.group = None;
    }

    if let Some(group) = groups.iter().find(|g| position(&fields, &g.name).is_some()) {
        return Err(ComposeError::GroupNameCollision {
            group: group.name.clone(),
        });
    }

    for group in groups {
        for name in &group.fields {
            match fields.iter_mut().find(|f| &f.name == name) {
                Some(field) => field.group = Some(group.name.clone()),
                None if strict => {
                    return Err(ComposeError::UnknownGroupMember {
                        group: group.name.clone(),
                        field: name.clone(),
                    });
                }
                None => debug!(group = %group.name, field = %name, "Ignoring missing group member"),
            }
        }
    }

    let mut rebuilt: Schema = groups
        .iter()
        .map(|g| Field::group_marker(g.name.clone(), g.label.clone(), g.icon.clone()))
        .collect();
    let (ungrouped, grouped): (Schema, Schema) =
        fields.into_iter().partition(|f| f.group.is_none());
    rebuilt.extend(ungrouped);
    for group in groups {
        rebuilt.extend(
            grouped
                .iter()
                .filter(|f| f.group.as_deref() == Some(group.name.as_str()))
                .cloned(),
        );
    }
    Ok(rebuilt)
}

fn check_show_fields(schema: &[Field]) {
    let names: HashSet<&str> = schema.iter().map(|f| f.name.as_str()).collect();
    for field in schema.iter().filter(|f| f.field_type == kinds::SELECT) {
        for choice in &field.choices {
            for shown in choice.show_fields.iter().flatten() {
                if !names.contains(shown.as_str()) {
                    warn!(
                        select = %field.name,
                        field = %shown,
                        "showFields names a field that does not exist in the schema"
                    );
                }
            }
        }
    }
}
