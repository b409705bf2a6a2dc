//! Field descriptors and schemas.
//!
//! A schema is an ordered list of [`Field`]s. Group markers (fields of type `group`) live in
//! the same list and share the field namespace.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Renderer;

/// An ordered list of field descriptors.
pub type Schema = Vec<Field>;

/// Built-in field type names.
pub mod kinds {
    pub const STRING: &str = "string";
    pub const SLUG: &str = "slug";
    pub const TAGS: &str = "tags";
    pub const BOOLEAN: &str = "boolean";
    pub const CHECKBOXES: &str = "checkboxes";
    pub const SELECT: &str = "select";
    pub const INTEGER: &str = "integer";
    pub const FLOAT: &str = "float";
    pub const URL: &str = "url";
    pub const DATE: &str = "date";
    pub const TIME: &str = "time";
    pub const PASSWORD: &str = "password";
    pub const GROUP: &str = "group";
    pub const ARRAY: &str = "array";
    pub const AREA: &str = "area";
    pub const SINGLETON: &str = "singleton";
    pub const JOIN_BY_ONE: &str = "joinByOne";
    pub const JOIN_BY_ARRAY: &str = "joinByArray";
    pub const JOIN_BY_ONE_REVERSE: &str = "joinByOneReverse";
    pub const JOIN_BY_ARRAY_REVERSE: &str = "joinByArrayReverse";
}

/// The four join shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// Stored foreign id in `idField`, hydrated into one object.
    ByOne,
    /// Stored id list in `idsField`, hydrated into an array in id order.
    ByArray,
    /// Records of the other type whose `idField` points here.
    ByOneReverse,
    /// Records of the other type whose `idsField` contains this id.
    ByArrayReverse,
}

impl JoinKind {
    /// The join kind for a field type name, if it is a join type.
    pub fn from_type(field_type: &str) -> Option<Self> {
        match field_type {
            kinds::JOIN_BY_ONE => Some(Self::ByOne),
            kinds::JOIN_BY_ARRAY => Some(Self::ByArray),
            kinds::JOIN_BY_ONE_REVERSE => Some(Self::ByOneReverse),
            kinds::JOIN_BY_ARRAY_REVERSE => Some(Self::ByArrayReverse),
            _ => None,
        }
    }

    /// Reverse joins are read-only from this side.
    pub fn is_reverse(self) -> bool {
        matches!(self, Self::ByOneReverse | Self::ByArrayReverse)
    }
}

/// One choice of a `select` or `checkboxes` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Choice {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Fields shown in the editor only while this choice is selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_fields: Option<Vec<String>>,
}

impl Choice {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }
}

/// Presentation hook attached to a field.
#[derive(Clone)]
pub enum RenderHook {
    /// A named template, resolved through the configured template renderer.
    Template(String),
    /// A renderer supplied in code.
    Custom(Arc<dyn Renderer>),
}

impl fmt::Debug for RenderHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(name) => f.debug_tuple("Template").field(name).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Metadata for one named, typed value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub def: Option<Value>,
    /// Name of the owning group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    // Composition-time positioning hints, never persisted.
    #[serde(skip_serializing)]
    pub before: Option<String>,
    #[serde(skip_serializing)]
    pub after: Option<String>,
    #[serde(skip_serializing)]
    pub start: bool,
    #[serde(skip_serializing)]
    pub end: bool,

    /// Edited in context on the show page, not in regular forms.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub contextual: bool,
    /// Nested schema of an `array` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    // Join attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships_field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relationship: Vec<Field>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub if_only_one: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_joins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub get_options: Map<String, Value>,

    // Search indexing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silent: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Maximum number of tags kept when the tag vocabulary is locked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_type: Option<String>,
    /// Template name, normalized into `render` by composition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip)]
    pub render: Option<RenderHook>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            ..Self::default()
        }
    }

    /// A group marker entry.
    pub fn group_marker(name: impl Into<String>, label: Option<String>, icon: Option<String>) -> Self {
        Self {
            label,
            icon,
            ..Self::new(name, kinds::GROUP)
        }
    }

    /// A `joinByOne` field storing the foreign id under `id_field`.
    pub fn join_by_one(
        name: impl Into<String>,
        with_type: impl Into<String>,
        id_field: impl Into<String>,
    ) -> Self {
        Self {
            with_type: Some(with_type.into()),
            id_field: Some(id_field.into()),
            ..Self::new(name, kinds::JOIN_BY_ONE)
        }
    }

    /// A `joinByArray` field storing the foreign ids under `ids_field`.
    pub fn join_by_array(
        name: impl Into<String>,
        with_type: impl Into<String>,
        ids_field: impl Into<String>,
    ) -> Self {
        Self {
            with_type: Some(with_type.into()),
            ids_field: Some(ids_field.into()),
            ..Self::new(name, kinds::JOIN_BY_ARRAY)
        }
    }

    /// An `array` field with a nested schema.
    pub fn array(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            schema: Some(schema),
            ..Self::new(name, kinds::ARRAY)
        }
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_def(mut self, def: impl Into<Value>) -> Self {
        self.def = Some(def.into());
        self
    }

    #[must_use]
    pub fn before(mut self, name: impl Into<String>) -> Self {
        self.before = Some(name.into());
        self
    }

    #[must_use]
    pub fn after(mut self, name: impl Into<String>) -> Self {
        self.after = Some(name.into());
        self
    }

    #[must_use]
    pub fn at_start(mut self) -> Self {
        self.start = true;
        self
    }

    #[must_use]
    pub fn at_end(mut self) -> Self {
        self.end = true;
        self
    }

    #[must_use]
    pub fn choices<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = values.into_iter().map(Choice::new).collect();
        self
    }

    #[must_use]
    pub fn with_joins<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_joins = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn relationships(mut self, field: impl Into<String>, relationship: Schema) -> Self {
        self.relationships_field = Some(field.into());
        self.relationship = relationship;
        self
    }

    #[must_use]
    pub fn if_only_one(mut self) -> Self {
        self.if_only_one = true;
        self
    }

    pub fn is_group(&self) -> bool {
        self.field_type == kinds::GROUP
    }

    pub fn is_array(&self) -> bool {
        self.field_type == kinds::ARRAY
    }

    pub fn join_kind(&self) -> Option<JoinKind> {
        JoinKind::from_type(&self.field_type)
    }

    /// Storage key holding this field's persisted value.
    ///
    /// Joins persist their ids rather than the hydrated objects.
    pub fn storage_key(&self) -> &str {
        match self.join_kind() {
            Some(JoinKind::ByOne) => self.id_field.as_deref().unwrap_or(&self.name),
            Some(JoinKind::ByArray) => self.ids_field.as_deref().unwrap_or(&self.name),
            _ => &self.name,
        }
    }

    /// Choice values, in declaration order.
    pub fn choice_values(&self) -> impl Iterator<Item = &str> {
        self.choices.iter().map(|c| c.value.as_str())
    }

    /// Default as a string, when it is one.
    pub fn def_str(&self) -> Option<&str> {
        self.def.as_ref().and_then(Value::as_str)
    }

    /// Clears composition-time positioning hints.
    pub(crate) fn clear_positioning(&mut self) {
        self.before = None;
        self.after = None;
        self.start = false;
        self.end = false;
    }
}

/// A `groupFields` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub fields: Vec<String>,
}

impl GroupSpec {
    pub fn new<I, S>(name: impl Into<String>, label: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            label: Some(label.into()),
            icon: None,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}
