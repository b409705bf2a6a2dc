//! # schemata-schema
//!
//! Declarative content schemas: ordered lists of typed field descriptors.
//!
//! - [`compose`] builds schemas from reusable pieces (add, remove, reorder, require, group).
//! - [`convert`] turns untyped input (CSV rows, form submissions) into sanitized values.
//! - [`export`] writes typed values back to flat formats.
//! - [`index`] extracts weighted search text.
//! - [`join`] hydrates join fields with related records fetched through content managers,
//!   including joins nested inside array fields, with bounded recursion.
//!
//! Field types are pluggable through the [`FieldTypeRegistry`]; [`Schemas`] ties a registry,
//! a manager registry and [`SchemaSettings`] together.

pub mod compose;
pub mod convert;
pub mod error;
pub mod export;
pub mod field;
pub mod format;
pub mod index;
pub mod join;
pub mod registry;
pub mod service;
pub mod settings;
pub mod types;

#[cfg(test)]
mod test_support;

pub use compose::{AlterFields, ComposeSpec};
pub use convert::{ConversionReport, ConvertContext, FieldOutcome};
pub use error::{ComposeError, ConvertError, ErrorCategory, ExportError, JoinError, RenderError};
pub use export::ExportSummary;
pub use field::{Choice, Field, GroupSpec, JoinKind, RenderHook, Schema, kinds};
pub use format::Format;
pub use index::{SearchText, SearchTexts};
pub use join::{JoinOptions, RELATIONSHIP_KEY};
pub use registry::FieldTypeRegistry;
pub use service::{Schemas, SchemasBuilder, TagVocabulary, TemplateRenderer};
pub use settings::SchemaSettings;
pub use types::{Converter, Emptiness, Exporter, FieldTypePlugin, Indexer, Renderer};
