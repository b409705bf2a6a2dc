//! Recording manager doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use schemata_core::{Record, RequestContext};
use schemata_storage::{
    ContentManager, Criteria, GetOptions, GetResult, Manager, ManagerRegistry, StorageError,
};
use serde_json::Value;

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub type_name: String,
    pub criteria: Criteria,
    pub options: GetOptions,
}

/// A registry of in-test managers that records every fetch.
#[derive(Default)]
pub(crate) struct RecordingManagers {
    records: HashMap<String, Vec<Record>>,
    generic: bool,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingManagers {
    pub fn with_records(mut self, type_name: &str, records: Vec<Value>) -> Self {
        let records = records
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        self.records.insert(type_name.to_string(), records);
        self
    }

    /// Serve every type through one shared, type-filtered manager.
    pub fn generic(mut self) -> Self {
        self.generic = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl ManagerRegistry for RecordingManagers {
    fn manager(&self, type_name: &str) -> Option<Manager> {
        if self.generic {
            return Some(Manager::Generic(Arc::new(RecordingManager {
                type_name: "generic".to_string(),
                records: self.records.values().flatten().cloned().collect(),
                calls: self.calls.clone(),
            })));
        }
        let records = self.records.get(type_name)?;
        Some(Manager::Dedicated(Arc::new(RecordingManager {
            type_name: type_name.to_string(),
            records: records.clone(),
            calls: self.calls.clone(),
        })))
    }
}

struct RecordingManager {
    type_name: String,
    records: Vec<Record>,
    calls: Arc<Mutex<Vec<Call>>>,
}

#[async_trait]
impl ContentManager for RecordingManager {
    async fn get(
        &self,
        _cx: &RequestContext,
        criteria: &Criteria,
        options: &GetOptions,
    ) -> Result<GetResult, StorageError> {
        self.calls.lock().unwrap().push(Call {
            type_name: self.type_name.clone(),
            criteria: criteria.clone(),
            options: options.clone(),
        });
        let items = self
            .records
            .iter()
            .filter(|r| criteria.matches(r))
            .map(|r| options.project(r))
            .collect();
        Ok(GetResult::with_items(items))
    }
}
