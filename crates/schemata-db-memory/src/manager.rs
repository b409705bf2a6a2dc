use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{OnceLock, Weak};

use async_trait::async_trait;
use indexmap::IndexMap;
use schemata_core::record::{ID_KEY, SORT_TITLE_KEY, TITLE_KEY, TYPE_KEY};
use schemata_core::sanitize::sortify;
use schemata_core::{Record, RequestContext, generate_id, sanitize_id};
use schemata_schema::{JoinOptions, Schema, TagVocabulary, join};
use schemata_storage::{
    ContentManager, Criteria, GetOptions, GetResult, ManagerRegistry, StorageError, StorageResult,
};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

/// Keys kept by [`ContentManager::get_indexes`] summaries.
pub const INDEX_FIELDS: &[&str] = &[ID_KEY, TITLE_KEY, SORT_TITLE_KEY, TYPE_KEY, "slug"];

/// Key scanned for the tag vocabulary.
const TAGS_KEY: &str = "tags";

/// Records of one content type, or of several for a generic manager.
pub struct MemoryManager {
    type_name: Option<String>,
    records: RwLock<IndexMap<String, Record>>,
    schema: Option<Schema>,
    registry: OnceLock<Weak<dyn ManagerRegistry>>,
    fetches: AtomicUsize,
}

impl MemoryManager {
    /// A dedicated manager for `type_name`.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self::build(Some(type_name.into()))
    }

    /// A manager shared by several types, told apart by each record's `type`.
    pub fn generic() -> Self {
        Self::build(None)
    }

    fn build(type_name: Option<String>) -> Self {
        Self {
            type_name,
            records: RwLock::new(IndexMap::new()),
            schema: None,
            registry: OnceLock::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Resolve this schema's joins on every record returned by `get`.
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Links the registry used for join resolution. The first link wins.
    pub(crate) fn attach(&self, registry: Weak<dyn ManagerRegistry>) {
        let _ = self.registry.set(registry);
    }

    /// Stores a record, assigning `_id` when absent or invalid and deriving `sortTitle`.
    pub async fn insert(&self, record: Value) -> StorageResult<Record> {
        let Value::Object(mut record) = record else {
            return Err(StorageError::invalid_record("records must be JSON objects"));
        };
        let id = sanitize_id(record.get(ID_KEY)).unwrap_or_else(generate_id);
        record.insert(ID_KEY.to_string(), Value::String(id.clone()));
        if let Some(title) = record.get(TITLE_KEY).and_then(Value::as_str) {
            let sort_title = sortify(title);
            record.insert(SORT_TITLE_KEY.to_string(), Value::String(sort_title));
        }
        if let Some(type_name) = &self.type_name {
            record
                .entry(TYPE_KEY)
                .or_insert_with(|| Value::String(type_name.clone()));
        }
        self.records.write().await.insert(id, record.clone());
        Ok(record)
    }

    pub async fn insert_all(&self, records: impl IntoIterator<Item = Value>) -> StorageResult<Vec<Record>> {
        let mut stored = Vec::new();
        for record in records {
            stored.push(self.insert(record).await?);
        }
        Ok(stored)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Number of `get`/`get_indexes` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    async fn matching(&self, criteria: &Criteria) -> Vec<Record> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.records
            .read()
            .await
            .values()
            .filter(|record| criteria.matches(record))
            .cloned()
            .collect()
    }

    async fn resolve_joins(
        &self,
        cx: &RequestContext,
        items: &mut [Record],
        options: &GetOptions,
    ) -> StorageResult<()> {
        let Some(schema) = &self.schema else {
            return Ok(());
        };
        if options.with_joins.is_disabled() || items.is_empty() {
            return Ok(());
        }
        let Some(registry) = self.registry.get().and_then(Weak::upgrade) else {
            debug!(type_name = ?self.type_name, "Manager is not registered, skipping joins");
            return Ok(());
        };
        join::join(registry.as_ref(), cx, schema, items, &nested_join_options(options))
            .await
            .map_err(|e| StorageError::internal(e.to_string()))
    }
}

/// Join options for a manager's own joins. `editable` carries over to related fetches;
/// the caller's projection does not.
fn nested_join_options(options: &GetOptions) -> JoinOptions {
    let mut join_options = JoinOptions {
        with_joins: options.with_joins.clone(),
        get_options: options.extra.clone(),
    };
    if options.editable {
        join_options = join_options.get_option("editable", true);
    }
    join_options
}

impl std::fmt::Debug for MemoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryManager")
            .field("type_name", &self.type_name)
            .field("schema", &self.schema.as_ref().map(Vec::len))
            .field("fetches", &self.fetch_count())
            .finish()
    }
}

#[async_trait]
impl ContentManager for MemoryManager {
    fn instance_type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    async fn get(
        &self,
        cx: &RequestContext,
        criteria: &Criteria,
        options: &GetOptions,
    ) -> StorageResult<GetResult> {
        let mut items = self.matching(criteria).await;
        self.resolve_joins(cx, &mut items, options).await?;
        Ok(GetResult::with_items(
            items.iter().map(|record| options.project(record)).collect(),
        ))
    }

    async fn get_indexes(
        &self,
        _cx: &RequestContext,
        criteria: &Criteria,
        options: &GetOptions,
    ) -> StorageResult<GetResult> {
        let items = self
            .matching(criteria)
            .await
            .into_iter()
            .map(|record| {
                let summary: Record = record
                    .into_iter()
                    .filter(|(key, _)| INDEX_FIELDS.contains(&key.as_str()))
                    .collect();
                options.project(&summary)
            })
            .collect();
        Ok(GetResult::with_items(items))
    }
}

/// The tag vocabulary is every tag already used by a stored record.
#[async_trait]
impl TagVocabulary for MemoryManager {
    async fn existing_tags(
        &self,
        _cx: &RequestContext,
        tags: &[String],
    ) -> StorageResult<Vec<String>> {
        let records = self.records.read().await;
        let known = |tag: &String| {
            records.values().any(|record| {
                record
                    .get(TAGS_KEY)
                    .and_then(Value::as_array)
                    .is_some_and(|used| used.iter().any(|t| t.as_str() == Some(tag.as_str())))
            })
        };
        Ok(tags.iter().filter(|tag| known(*tag)).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemata_storage::WithJoins;
    use serde_json::json;

    #[test]
    fn test_nested_join_options_forward_editable() {
        let mut options = GetOptions::with_joins(WithJoins::Only(vec!["_author".into()]));
        options.editable = true;
        options.fields = Some(vec!["title".into()]);
        options.extra.insert("locale".into(), json!("fr"));

        let nested = nested_join_options(&options);

        assert_eq!(nested.with_joins, WithJoins::Only(vec!["_author".into()]));
        assert_eq!(nested.get_options.get("editable"), Some(&json!(true)));
        assert_eq!(nested.get_options.get("locale"), Some(&json!("fr")));
        assert!(!nested.get_options.contains_key("fields"));

        let plain = nested_join_options(&GetOptions::default());
        assert!(plain.get_options.is_empty());
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_sort_title() {
        let manager = MemoryManager::new("person");
        let stored = manager
            .insert(json!({"title": "Ada  Lovelace!"}))
            .await
            .unwrap();
        assert!(stored.get(ID_KEY).and_then(Value::as_str).is_some());
        assert_eq!(stored.get(SORT_TITLE_KEY), Some(&json!("ada lovelace")));
        assert_eq!(stored.get(TYPE_KEY), Some(&json!("person")));

        let kept = manager.insert(json!({"_id": "p1"})).await.unwrap();
        assert_eq!(kept.get(ID_KEY), Some(&json!("p1")));
        assert_eq!(manager.len().await, 2);
        assert!(manager.insert(json!("nope")).await.is_err());
    }

    #[tokio::test]
    async fn test_get_filters_and_projects() {
        let manager = MemoryManager::new("person");
        manager
            .insert_all([
                json!({"_id": "p1", "title": "Ada", "born": 1815}),
                json!({"_id": "p2", "title": "Alan", "born": 1912}),
            ])
            .await
            .unwrap();
        let cx = RequestContext::anonymous();
        let options = GetOptions {
            fields: Some(vec!["title".into()]),
            ..GetOptions::default()
        };

        let result = manager
            .get(&cx, &Criteria::ids(["p2"]), &options)
            .await
            .unwrap();
        assert_eq!(result.items, vec![json!({"_id": "p2", "title": "Alan"}).as_object().cloned().unwrap()]);
        assert_eq!(manager.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_get_indexes_returns_summaries() {
        let manager = MemoryManager::new("person");
        manager
            .insert(json!({"_id": "p1", "title": "Ada", "bio": "long"}))
            .await
            .unwrap();
        let result = manager
            .get_indexes(&RequestContext::anonymous(), &Criteria::All, &GetOptions::default())
            .await
            .unwrap();
        assert_eq!(
            Value::Object(result.items[0].clone()),
            json!({"_id": "p1", "title": "Ada", "sortTitle": "ada", "type": "person"})
        );
    }

    #[tokio::test]
    async fn test_existing_tags() {
        let manager = MemoryManager::new("article");
        manager
            .insert(json!({"tags": ["rust", "cms"]}))
            .await
            .unwrap();
        let known = manager
            .existing_tags(
                &RequestContext::anonymous(),
                &["cms".to_string(), "go".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(known, vec!["cms".to_string()]);
    }
}
