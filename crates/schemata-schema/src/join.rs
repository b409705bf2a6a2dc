//! Join resolution.
//!
//! Joins are fields whose stored value is a foreign id (or id list) and which are hydrated at
//! read time with the referenced records. Joins may sit inside `array` fields; each one is
//! identified by a dot-path made of the enclosing array names and its own name, e.g.
//! `events._location`.
//!
//! Recursion is always bounded. Without a selector, every join runs and passes its own static
//! `withJoins` list (or nothing) to the related manager. With an explicit selector, a join runs
//! when its dot-path is listed exactly or is a strict prefix of a listed path, and the remainder
//! of the listed path becomes the nested selector. That is how `_events._locations` follows two
//! levels while `_events` alone follows one.

use std::collections::HashMap;

use schemata_core::record::{ID_KEY, record_id};
use schemata_core::{Record, RequestContext};
use schemata_storage::{Criteria, GetOptions, ManagerRegistry, WithJoins};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::JoinError;
use crate::field::{Field, JoinKind};

/// Key under which a join-by-array attaches relationship attributes to each related record.
pub const RELATIONSHIP_KEY: &str = "_relationship";

/// Caller options for [`join`].
#[derive(Debug, Clone, Default)]
pub struct JoinOptions {
    /// Which joins to run.
    pub with_joins: WithJoins,
    /// Extra getter options for every join, e.g. `editable`.
    pub get_options: Map<String, Value>,
}

impl JoinOptions {
    pub fn new(with_joins: WithJoins) -> Self {
        Self {
            with_joins,
            get_options: Map::new(),
        }
    }

    /// Only the listed dot-paths.
    pub fn only<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(WithJoins::Only(paths.into_iter().map(Into::into).collect()))
    }

    pub fn disabled() -> Self {
        Self::new(WithJoins::Disabled)
    }

    #[must_use]
    pub fn get_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.get_options.insert(key.into(), value.into());
        self
    }
}

/// A join field found somewhere in a schema.
#[derive(Debug, Clone)]
pub struct JoinSite<'a> {
    pub field: &'a Field,
    pub kind: JoinKind,
    /// Names of the enclosing array fields, outermost first.
    pub arrays: Vec<&'a str>,
    pub dot_path: String,
}

/// A join selected to run, with the selector for its related fetch.
#[derive(Debug, Clone)]
pub struct PlannedJoin<'a> {
    pub site: JoinSite<'a>,
    pub nested: WithJoins,
}

/// Every join of the schema, nested array schemas included, in encounter order: a level's
/// own joins first, then those of its array fields.
pub fn find_joins(schema: &[Field]) -> Vec<JoinSite<'_>> {
    let mut sites = Vec::new();
    collect_joins(schema, &mut Vec::new(), &mut sites);
    sites
}

fn collect_joins<'a>(schema: &'a [Field], arrays: &mut Vec<&'a str>, sites: &mut Vec<JoinSite<'a>>) {
    for field in schema {
        if let Some(kind) = field.join_kind() {
            let dot_path = if arrays.is_empty() {
                field.name.clone()
            } else {
                format!("{}.{}", arrays.join("."), field.name)
            };
            sites.push(JoinSite {
                field,
                kind,
                arrays: arrays.clone(),
                dot_path,
            });
        }
    }
    for field in schema {
        if field.is_array()
            && let Some(nested) = field.schema.as_deref()
        {
            arrays.push(&field.name);
            collect_joins(nested, arrays, sites);
            arrays.pop();
        }
    }
}

/// Selects the joins to run for `target_count` targets.
///
/// `ifOnlyOne` joins are skipped whenever more than one target is being joined.
pub fn plan_joins<'a>(
    sites: Vec<JoinSite<'a>>,
    selector: &WithJoins,
    target_count: usize,
) -> Vec<PlannedJoin<'a>> {
    let sites = sites
        .into_iter()
        .filter(|site| !(site.field.if_only_one && target_count > 1));
    match selector {
        WithJoins::Disabled => Vec::new(),
        WithJoins::Default => sites
            .map(|site| {
                let nested = WithJoins::from_static(site.field.with_joins.as_ref());
                PlannedJoin { site, nested }
            })
            .collect(),
        WithJoins::Only(paths) => sites
            .filter_map(|site| {
                let mut selected = false;
                let mut next = Vec::new();
                for path in paths {
                    if *path == site.dot_path {
                        selected = true;
                    } else if let Some(rest) = path
                        .strip_prefix(site.dot_path.as_str())
                        .and_then(|rest| rest.strip_prefix('.'))
                    {
                        selected = true;
                        next.push(rest.to_string());
                    }
                }
                selected.then(|| PlannedJoin {
                    site,
                    nested: if next.is_empty() {
                        WithJoins::Disabled
                    } else {
                        WithJoins::Only(next)
                    },
                })
            })
            .collect(),
    }
}

/// Hydrates the joins of `schema` on every target, in place.
///
/// Joins run one at a time in schema encounter order, and the first failure aborts the rest.
pub async fn join(
    managers: &dyn ManagerRegistry,
    cx: &RequestContext,
    schema: &[Field],
    targets: &mut [Record],
    options: &JoinOptions,
) -> Result<(), JoinError> {
    if targets.is_empty() || options.with_joins.is_disabled() {
        return Ok(());
    }

    let planned = plan_joins(find_joins(schema), &options.with_joins, targets.len());
    for PlannedJoin { site, nested } in planned {
        run_join(managers, cx, &site, nested, targets, &options.get_options).await?;
    }
    Ok(())
}

async fn run_join(
    managers: &dyn ManagerRegistry,
    cx: &RequestContext,
    site: &JoinSite<'_>,
    nested: WithJoins,
    targets: &mut [Record],
    caller_options: &Map<String, Value>,
) -> Result<(), JoinError> {
    let field = site.field;
    if !field.name.starts_with('_') {
        return Err(JoinError::invalid_join_name(&site.dot_path));
    }
    let with_type = field
        .with_type
        .as_deref()
        .ok_or_else(|| JoinError::misconfigured(&site.dot_path, "withType"))?;
    let manager = managers
        .manager(with_type)
        .ok_or_else(|| JoinError::unknown_type(with_type, &site.dot_path))?;

    let mut get_options = GetOptions::with_joins(nested);
    get_options.permalink = true;
    get_options.merge(&field.get_options);
    get_options.merge(caller_options);

    let mut scoped = scope(targets, &site.arrays);
    if scoped.is_empty() {
        return Ok(());
    }

    debug!(
        join = %site.dot_path,
        with_type,
        targets = scoped.len(),
        "Resolving join"
    );

    match site.kind {
        JoinKind::ByOne => {
            let id_field = storage_key(field.id_field.as_deref(), site, "idField")?;
            let ids = distinct(scoped.iter().filter_map(|t| t.get(id_field).and_then(Value::as_str)));
            if ids.is_empty() {
                return Ok(());
            }
            let found = manager
                .fetch(cx, with_type, Criteria::ids(ids), &get_options)
                .await?;
            let by_id = index_by_id(&found.items);
            for target in &mut scoped {
                let related = target
                    .get(id_field)
                    .and_then(Value::as_str)
                    .and_then(|id| by_id.get(id));
                if let Some(related) = related {
                    target.insert(field.name.clone(), Value::Object((*related).clone()));
                }
            }
        }
        JoinKind::ByArray => {
            let ids_field = storage_key(field.ids_field.as_deref(), site, "idsField")?;
            let ids = distinct(scoped.iter().flat_map(|t| id_list(t, ids_field)));
            if ids.is_empty() {
                return Ok(());
            }
            let found = manager
                .fetch(cx, with_type, Criteria::ids(ids), &get_options)
                .await?;
            let by_id = index_by_id(&found.items);
            for target in &mut scoped {
                let related: Vec<Value> = id_list(target, ids_field)
                    .filter_map(|id| {
                        let item = by_id.get(id)?;
                        let relationship = field
                            .relationships_field
                            .as_deref()
                            .and_then(|key| target.get(key))
                            .and_then(|map| map.get(id));
                        Some(Value::Object(enrich(item, relationship)))
                    })
                    .collect();
                target.insert(field.name.clone(), Value::Array(related));
            }
        }
        JoinKind::ByOneReverse => {
            let id_field = storage_key(field.id_field.as_deref(), site, "idField")?;
            let ids = distinct(scoped.iter().filter_map(|t| record_id(t)));
            if ids.is_empty() {
                return Ok(());
            }
            let found = manager
                .fetch(cx, with_type, Criteria::field_in(id_field, ids), &get_options)
                .await?;
            for target in &mut scoped {
                let Some(own_id) = record_id(target).map(str::to_string) else {
                    continue;
                };
                let related: Vec<Value> = found
                    .items
                    .iter()
                    .filter(|r| r.get(id_field).and_then(Value::as_str) == Some(own_id.as_str()))
                    .map(|r| Value::Object(r.clone()))
                    .collect();
                target.insert(field.name.clone(), Value::Array(related));
            }
        }
        JoinKind::ByArrayReverse => {
            let ids_field = storage_key(field.ids_field.as_deref(), site, "idsField")?;
            let ids = distinct(scoped.iter().filter_map(|t| record_id(t)));
            if ids.is_empty() {
                return Ok(());
            }
            let found = manager
                .fetch(cx, with_type, Criteria::field_in(ids_field, ids), &get_options)
                .await?;
            for target in &mut scoped {
                let Some(own_id) = record_id(target).map(str::to_string) else {
                    continue;
                };
                let related: Vec<Value> = found
                    .items
                    .iter()
                    .filter(|r| id_list(r, ids_field).any(|id| id == own_id))
                    .map(|r| {
                        let relationship = field
                            .relationships_field
                            .as_deref()
                            .and_then(|key| r.get(key))
                            .and_then(|map| map.get(&own_id));
                        Value::Object(enrich(r, relationship))
                    })
                    .collect();
                target.insert(field.name.clone(), Value::Array(related));
            }
        }
    }
    Ok(())
}

/// The records a join decorates: the targets themselves, or the elements of their (nested)
/// array fields.
fn scope<'r>(targets: &'r mut [Record], arrays: &[&str]) -> Vec<&'r mut Record> {
    let mut scoped: Vec<&'r mut Record> = targets.iter_mut().collect();
    for array in arrays {
        scoped = scoped
            .into_iter()
            .flat_map(|record| descend(record, array))
            .collect();
    }
    scoped
}

fn descend<'r>(record: &'r mut Record, key: &str) -> Vec<&'r mut Record> {
    match record.get_mut(key) {
        Some(Value::Array(items)) => items.iter_mut().filter_map(Value::as_object_mut).collect(),
        _ => Vec::new(),
    }
}

fn storage_key<'f>(
    key: Option<&'f str>,
    site: &JoinSite<'_>,
    attribute: &str,
) -> Result<&'f str, JoinError> {
    key.ok_or_else(|| JoinError::misconfigured(&site.dot_path, attribute))
}

fn id_list<'r>(record: &'r Record, key: &str) -> impl Iterator<Item = &'r str> {
    record
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

fn distinct<'s>(ids: impl Iterator<Item = &'s str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for id in ids {
        if !out.iter().any(|seen| seen == id) {
            out.push(id.to_string());
        }
    }
    out
}

fn index_by_id(items: &[Record]) -> HashMap<&str, &Record> {
    items
        .iter()
        .filter_map(|item| item.get(ID_KEY).and_then(Value::as_str).map(|id| (id, item)))
        .collect()
}

fn enrich(item: &Record, relationship: Option<&Value>) -> Record {
    let mut item = item.clone();
    if let Some(relationship) = relationship {
        item.insert(RELATIONSHIP_KEY.to_string(), relationship.clone());
    }
    item
}
