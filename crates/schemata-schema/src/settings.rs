//! Engine settings.

use serde::{Deserialize, Serialize};

/// Settings for the schema engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSettings {
    /// A `groupFields` member naming a missing field is a composition error instead of a
    /// debug diagnostic.
    pub strict_groups: bool,
    /// Form tag input is restricted to the existing tag vocabulary.
    pub lock_tags: bool,
    /// Weight of indexed field text when the field sets none.
    pub search_weight: u32,
    /// Fields marked `required` fail conversion when left empty.
    pub enforce_required: bool,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            strict_groups: false,
            lock_tags: false,
            search_weight: 15,
            enforce_required: true,
        }
    }
}

impl SchemaSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.search_weight == 0 {
            return Err("schema.search_weight must be greater than 0".into());
        }
        Ok(())
    }
}
