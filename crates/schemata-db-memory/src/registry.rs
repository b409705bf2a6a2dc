use std::sync::{Arc, Weak};

use async_trait::async_trait;
use dashmap::DashMap;
use schemata_core::RequestContext;
use schemata_schema::TagVocabulary;
use schemata_storage::{Manager, ManagerRegistry, StorageResult};
use tracing::debug;

use crate::manager::MemoryManager;

/// Content type name to manager, shared by every manager it links for joins.
pub struct MemoryManagers {
    managers: DashMap<String, Manager>,
    stores: DashMap<String, Arc<MemoryManager>>,
    this: Weak<MemoryManagers>,
}

impl MemoryManagers {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            managers: DashMap::new(),
            stores: DashMap::new(),
            this: this.clone(),
        })
    }

    /// Registers a manager dedicated to `type_name`. When the manager's own type differs,
    /// fetches for `type_name` return its index summaries.
    pub fn register_dedicated(&self, type_name: impl Into<String>, manager: MemoryManager) -> Arc<MemoryManager> {
        self.insert(type_name.into(), manager, Manager::Dedicated)
    }

    /// Registers a shared manager serving `type_name` among others.
    pub fn register_generic(&self, type_name: impl Into<String>, manager: MemoryManager) -> Arc<MemoryManager> {
        self.insert(type_name.into(), manager, Manager::Generic)
    }

    /// Registers an already shared manager under another type name.
    pub fn alias(&self, type_name: impl Into<String>, manager: &Arc<MemoryManager>, generic: bool) {
        let type_name = type_name.into();
        self.stores.insert(type_name.clone(), Arc::clone(manager));
        let manager = Arc::clone(manager);
        let entry = if generic {
            Manager::Generic(manager)
        } else {
            Manager::Dedicated(manager)
        };
        self.managers.insert(type_name, entry);
    }

    fn insert(
        &self,
        type_name: String,
        manager: MemoryManager,
        wrap: fn(schemata_storage::DynManager) -> Manager,
    ) -> Arc<MemoryManager> {
        let this: Weak<dyn ManagerRegistry> = self.this.clone();
        manager.attach(this);
        let manager = Arc::new(manager);
        debug!(type_name = %type_name, instance = ?manager.type_name(), "Registered content manager");
        self.stores.insert(type_name.clone(), manager.clone());
        self.managers.insert(type_name, wrap(manager.clone()));
        manager
    }

    /// Every distinct registered store, aliases counted once.
    fn distinct_stores(&self) -> Vec<Arc<MemoryManager>> {
        let mut stores: Vec<Arc<MemoryManager>> = Vec::new();
        for entry in self.stores.iter() {
            if !stores.iter().any(|s| Arc::ptr_eq(s, entry.value())) {
                stores.push(entry.value().clone());
            }
        }
        stores
    }

    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.managers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl ManagerRegistry for MemoryManagers {
    fn manager(&self, type_name: &str) -> Option<Manager> {
        self.managers.get(type_name).map(|entry| entry.value().clone())
    }
}

/// The vocabulary is every tag used by a record in any registered store.
#[async_trait]
impl TagVocabulary for MemoryManagers {
    async fn existing_tags(
        &self,
        cx: &RequestContext,
        tags: &[String],
    ) -> StorageResult<Vec<String>> {
        let mut known = Vec::new();
        for store in self.distinct_stores() {
            known.extend(store.existing_tags(cx, tags).await?);
        }
        Ok(tags.iter().filter(|tag| known.contains(tag)).cloned().collect())
    }
}

impl std::fmt::Debug for MemoryManagers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryManagers")
            .field("types", &self.type_names())
            .finish()
    }
}
