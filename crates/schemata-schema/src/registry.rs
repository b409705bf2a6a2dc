//! Field type registry.
//!
//! Holds, per field type name, the converters for each input format, the exporters for each
//! output format, the search indexer, the emptiness predicate and the default renderer. It is
//! populated once at startup and shared read-only afterwards.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::field::Field;
use crate::format::Format;
use crate::types::{
    Converter, Emptiness, Exporter, FieldTypePlugin, Indexer, Renderer, builtins,
};

/// Registry of field type capabilities.
#[derive(Default)]
pub struct FieldTypeRegistry {
    converters: HashMap<(Format, String), Arc<dyn Converter>>,
    exporters: HashMap<(Format, String), Arc<dyn Exporter>>,
    indexers: HashMap<String, Arc<dyn Indexer>>,
    empties: HashMap<String, Arc<dyn Emptiness>>,
    renderers: HashMap<String, Arc<dyn Renderer>>,
}

impl FieldTypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in field type.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for plugin in builtins() {
            registry.register(plugin);
        }
        registry
    }

    /// Register a field type, replacing any capability already registered under its name.
    pub fn register(&mut self, plugin: FieldTypePlugin) {
        let FieldTypePlugin {
            name,
            converters,
            exporters,
            indexer,
            emptiness,
            renderer,
        } = plugin;

        tracing::debug!(
            field_type = %name,
            converters = converters.len(),
            exporters = exporters.len(),
            "Registered field type"
        );

        for (format, converter) in converters {
            self.converters.insert((format, name.clone()), converter);
        }
        for (format, exporter) in exporters {
            self.exporters.insert((format, name.clone()), exporter);
        }
        if let Some(indexer) = indexer {
            self.indexers.insert(name.clone(), indexer);
        }
        if let Some(emptiness) = emptiness {
            self.empties.insert(name.clone(), emptiness);
        }
        if let Some(renderer) = renderer {
            self.renderers.insert(name, renderer);
        }
    }

    pub fn converter(&self, format: &Format, field_type: &str) -> Option<&Arc<dyn Converter>> {
        self.converters
            .get(&(format.clone(), field_type.to_string()))
    }

    pub fn exporter(&self, format: &Format, field_type: &str) -> Option<&Arc<dyn Exporter>> {
        self.exporters.get(&(format.clone(), field_type.to_string()))
    }

    pub fn indexer(&self, field_type: &str) -> Option<&Arc<dyn Indexer>> {
        self.indexers.get(field_type)
    }

    pub fn emptiness(&self, field_type: &str) -> Option<&Arc<dyn Emptiness>> {
        self.empties.get(field_type)
    }

    pub fn renderer(&self, field_type: &str) -> Option<&Arc<dyn Renderer>> {
        self.renderers.get(field_type)
    }

    /// Whether a present value is empty for its field; types without a predicate are never
    /// empty.
    pub fn is_value_empty(&self, field: &Field, value: &Value) -> bool {
        self.emptiness(&field.field_type)
            .is_some_and(|empty| empty.is_empty(field, value))
    }

    /// Every type name with at least one registered capability, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let names: BTreeSet<&String> = self
            .converters
            .keys()
            .map(|(_, name)| name)
            .chain(self.exporters.keys().map(|(_, name)| name))
            .chain(self.indexers.keys())
            .chain(self.empties.keys())
            .chain(self.renderers.keys())
            .collect();
        names.into_iter().cloned().collect()
    }
}

impl fmt::Debug for FieldTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
