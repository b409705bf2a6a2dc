//! Manager traits for the content store abstraction.
//!
//! A content store exposes one [`ContentManager`] per content type, looked up through a
//! [`ManagerRegistry`].

use async_trait::async_trait;
use schemata_core::RequestContext;
use schemata_core::record::TYPE_KEY;

use crate::DynManager;
use crate::error::StorageError;
use crate::types::{Criteria, GetOptions, GetResult};

/// Fetch operations for one content type.
///
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use schemata_storage::{ContentManager, Criteria, GetOptions, StorageError};
///
/// async fn person(manager: &dyn ContentManager, cx: &RequestContext) -> Result<(), StorageError> {
///     let found = manager.get(cx, &Criteria::ids(["123"]), &GetOptions::default()).await?;
///     assert!(found.total <= 1);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ContentManager: Send + Sync {
    /// Name of the instance type, when the manager keeps instance and index
    /// representations apart.
    ///
    /// A join targeting the instance type uses [`get`](Self::get); a join targeting any other
    /// type name served by this manager uses [`get_indexes`](Self::get_indexes).
    fn instance_type_name(&self) -> Option<&str> {
        None
    }

    /// Fetches instance records matching the criteria.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure or criteria problems; no matches is an empty
    /// result.
    async fn get(
        &self,
        cx: &RequestContext,
        criteria: &Criteria,
        options: &GetOptions,
    ) -> Result<GetResult, StorageError>;

    /// Fetches index/summary records matching the criteria.
    ///
    /// Managers without a separate index representation serve their instances.
    async fn get_indexes(
        &self,
        cx: &RequestContext,
        criteria: &Criteria,
        options: &GetOptions,
    ) -> Result<GetResult, StorageError> {
        self.get(cx, criteria, options).await
    }
}

/// A manager registered for a content type.
#[derive(Clone)]
pub enum Manager {
    /// The type has its own manager.
    Dedicated(DynManager),
    /// The type is served by a shared store; fetches must be filtered by `type`.
    Generic(DynManager),
}

impl Manager {
    /// The underlying manager.
    pub fn inner(&self) -> &DynManager {
        match self {
            Self::Dedicated(manager) | Self::Generic(manager) => manager,
        }
    }

    /// Fetches records of `type_name`, choosing the getter the manager prefers for that type.
    ///
    /// Dedicated managers with an instance type use `get` for the instance type and
    /// `get_indexes` for anything else. Generic managers always use `get` with the criteria
    /// narrowed to `type_name`.
    pub async fn fetch(
        &self,
        cx: &RequestContext,
        type_name: &str,
        criteria: Criteria,
        options: &GetOptions,
    ) -> Result<GetResult, StorageError> {
        match self {
            Self::Dedicated(manager) => match manager.instance_type_name() {
                Some(instance) if instance != type_name => {
                    manager.get_indexes(cx, &criteria, options).await
                }
                _ => manager.get(cx, &criteria, options).await,
            },
            Self::Generic(manager) => {
                let typed = Criteria::field_eq(TYPE_KEY, type_name).and(criteria);
                manager.get(cx, &typed, options).await
            }
        }
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dedicated(manager) => f
                .debug_tuple("Dedicated")
                .field(&manager.instance_type_name())
                .finish(),
            Self::Generic(_) => f.write_str("Generic"),
        }
    }
}

/// Resolves content type names to managers.
pub trait ManagerRegistry: Send + Sync {
    /// The manager for `type_name`, if one is registered.
    fn manager(&self, type_name: &str) -> Option<Manager>;

    /// Returns true if a manager is registered for `type_name`.
    fn contains(&self, type_name: &str) -> bool {
        self.manager(type_name).is_some()
    }
}

// Ensure traits are object-safe by using them as trait objects
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    // Compile-time test that ContentManager is object-safe
    fn _assert_manager_object_safe(_: &dyn ContentManager) {}

    // Compile-time test that ManagerRegistry is object-safe
    fn _assert_registry_object_safe(_: &dyn ManagerRegistry) {}

    #[derive(Default)]
    struct Recording {
        instance: Option<String>,
        calls: Mutex<Vec<(&'static str, Criteria)>>,
    }

    #[async_trait]
    impl ContentManager for Recording {
        fn instance_type_name(&self) -> Option<&str> {
            self.instance.as_deref()
        }

        async fn get(
            &self,
            _cx: &RequestContext,
            criteria: &Criteria,
            _options: &GetOptions,
        ) -> Result<GetResult, StorageError> {
            self.calls.lock().unwrap().push(("get", criteria.clone()));
            Ok(GetResult::empty())
        }

        async fn get_indexes(
            &self,
            _cx: &RequestContext,
            criteria: &Criteria,
            _options: &GetOptions,
        ) -> Result<GetResult, StorageError> {
            self.calls
                .lock()
                .unwrap()
                .push(("get_indexes", criteria.clone()));
            Ok(GetResult::empty())
        }
    }

    #[tokio::test]
    async fn test_dedicated_picks_getter_by_instance_type() {
        let recording = Arc::new(Recording {
            instance: Some("blogPost".to_string()),
            ..Recording::default()
        });
        let manager = Manager::Dedicated(recording.clone());
        let cx = RequestContext::anonymous();
        let options = GetOptions::default();

        manager
            .fetch(&cx, "blogPost", Criteria::ids(["1"]), &options)
            .await
            .unwrap();
        manager
            .fetch(&cx, "blog", Criteria::ids(["2"]), &options)
            .await
            .unwrap();

        let calls = recording.calls.lock().unwrap();
        assert_eq!(calls[0].0, "get");
        assert_eq!(calls[1].0, "get_indexes");
    }

    #[tokio::test]
    async fn test_generic_filters_by_type() {
        let recording = Arc::new(Recording::default());
        let manager = Manager::Generic(recording.clone());
        let cx = RequestContext::anonymous();

        manager
            .fetch(&cx, "person", Criteria::ids(["1"]), &GetOptions::default())
            .await
            .unwrap();

        let calls = recording.calls.lock().unwrap();
        assert_eq!(calls[0].0, "get");
        let criteria = &calls[0].1;
        let person = json!({"_id": "1", "type": "person"});
        let event = json!({"_id": "1", "type": "event"});
        assert!(criteria.matches(person.as_object().unwrap()));
        assert!(!criteria.matches(event.as_object().unwrap()));
    }
}
