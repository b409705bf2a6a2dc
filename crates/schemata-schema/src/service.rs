//! The [`Schemas`] service: one handle bundling the field type registry, the content
//! managers, settings and optional collaborators.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use schemata_core::{Record, RequestContext};
use schemata_storage::{DynManagers, StorageError};

use crate::compose::{self, ComposeSpec};
use crate::convert::{self, ConversionReport, ConvertContext};
use crate::error::{ComposeError, ConvertError, ExportError, JoinError, RenderError};
use crate::export::{self, ExportSummary};
use crate::field::{Field, RenderHook, Schema};
use crate::format::Format;
use crate::index::{self, SearchText};
use crate::join::{self, JoinOptions};
use crate::registry::FieldTypeRegistry;
use crate::settings::SchemaSettings;

/// The existing tag vocabulary, consulted when tags are locked.
#[async_trait]
pub trait TagVocabulary: Send + Sync {
    /// The subset of `tags` that already exist, in input order.
    async fn existing_tags(
        &self,
        cx: &RequestContext,
        tags: &[String],
    ) -> Result<Vec<String>, StorageError>;
}

/// Renders named templates for fields.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, field: &Field) -> Result<String, RenderError>;
}

/// Schema operations bound to a registry, a manager registry and settings.
#[derive(Clone)]
pub struct Schemas {
    registry: Arc<FieldTypeRegistry>,
    managers: DynManagers,
    settings: SchemaSettings,
    tags: Option<Arc<dyn TagVocabulary>>,
    templates: Option<Arc<dyn TemplateRenderer>>,
}

impl Schemas {
    pub fn builder(managers: DynManagers) -> SchemasBuilder {
        SchemasBuilder {
            registry: None,
            managers,
            settings: SchemaSettings::default(),
            tags: None,
            templates: None,
        }
    }

    pub fn registry(&self) -> &FieldTypeRegistry {
        &self.registry
    }

    pub fn managers(&self) -> &DynManagers {
        &self.managers
    }

    pub fn settings(&self) -> &SchemaSettings {
        &self.settings
    }

    pub fn tag_vocabulary(&self) -> Option<&Arc<dyn TagVocabulary>> {
        self.tags.as_ref()
    }

    pub fn compose(&self, spec: &ComposeSpec) -> Result<Schema, ComposeError> {
        compose::compose(spec, self.settings.strict_groups)
    }

    pub fn refine(&self, schema: &[Field], spec: &ComposeSpec) -> Result<Schema, ComposeError> {
        compose::refine(schema, spec, self.settings.strict_groups)
    }

    pub fn subset(&self, schema: &[Field], names: &[&str]) -> Schema {
        compose::subset(schema, names)
    }

    pub fn new_instance(&self, schema: &[Field]) -> Record {
        compose::new_instance(schema)
    }

    pub fn subset_instance(&self, schema: &[Field], instance: &Record) -> Record {
        compose::subset_instance(schema, instance)
    }

    pub fn empty(&self, schema: &[Field], object: &Record) -> bool {
        compose::empty(&self.registry, schema, object)
    }

    pub async fn convert_fields(
        &self,
        cx: &RequestContext,
        schema: &[Field],
        format: &Format,
        input: &Record,
        target: &mut Record,
    ) -> Result<(), ConvertError> {
        let cx = ConvertContext::new(cx, self, format);
        convert::convert_fields(&cx, schema, input, target).await
    }

    pub async fn convert_fields_report(
        &self,
        cx: &RequestContext,
        schema: &[Field],
        format: &Format,
        input: &Record,
        target: &mut Record,
    ) -> Result<ConversionReport, ConvertError> {
        let cx = ConvertContext::new(cx, self, format);
        convert::convert_fields_report(&cx, schema, input, target).await
    }

    pub async fn export_fields(
        &self,
        cx: &RequestContext,
        schema: &[Field],
        format: &Format,
        source: &Record,
        output: &mut Record,
    ) -> Result<ExportSummary, ExportError> {
        export::export_fields(&self.registry, cx, schema, format, source, output).await
    }

    pub fn index_fields(&self, schema: &[Field], object: &Record) -> Vec<SearchText> {
        index::index_fields(&self.registry, self.settings.search_weight, schema, object)
    }

    pub async fn join(
        &self,
        cx: &RequestContext,
        schema: &[Field],
        targets: &mut [Record],
        options: &JoinOptions,
    ) -> Result<(), JoinError> {
        join::join(self.managers.as_ref(), cx, schema, targets, options).await
    }

    pub async fn join_one(
        &self,
        cx: &RequestContext,
        schema: &[Field],
        target: &mut Record,
        options: &JoinOptions,
    ) -> Result<(), JoinError> {
        self.join(cx, schema, std::slice::from_mut(target), options)
            .await
    }

    /// Renders a field: its own hook first, then its type's renderer, then the template named
    /// after its type.
    pub fn render_field(&self, field: &Field) -> Result<String, RenderError> {
        let rendered = match &field.render {
            Some(RenderHook::Custom(renderer)) => renderer.render(field)?,
            Some(RenderHook::Template(template)) => self.render_template(template, field)?,
            None => match self.registry.renderer(&field.field_type) {
                Some(renderer) => renderer.render(field)?,
                None => self.render_template(&field.field_type, field)?,
            },
        };
        Ok(rendered.trim().to_string())
    }

    fn render_template(&self, template: &str, field: &Field) -> Result<String, RenderError> {
        match &self.templates {
            Some(templates) => templates.render(template, field),
            None => Err(RenderError::NoRenderer {
                field_type: field.field_type.clone(),
            }),
        }
    }
}

impl fmt::Debug for Schemas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schemas")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .field("tags", &self.tags.is_some())
            .field("templates", &self.templates.is_some())
            .finish()
    }
}

/// Builder for [`Schemas`].
pub struct SchemasBuilder {
    registry: Option<Arc<FieldTypeRegistry>>,
    managers: DynManagers,
    settings: SchemaSettings,
    tags: Option<Arc<dyn TagVocabulary>>,
    templates: Option<Arc<dyn TemplateRenderer>>,
}

impl SchemasBuilder {
    /// Use this registry instead of the built-in types.
    #[must_use]
    pub fn registry(mut self, registry: Arc<FieldTypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: SchemaSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn tag_vocabulary(mut self, tags: Arc<dyn TagVocabulary>) -> Self {
        self.tags = Some(tags);
        self
    }

    #[must_use]
    pub fn templates(mut self, templates: Arc<dyn TemplateRenderer>) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn build(self) -> Schemas {
        Schemas {
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(FieldTypeRegistry::with_builtins())),
            managers: self.managers,
            settings: self.settings,
            tags: self.tags,
            templates: self.templates,
        }
    }
}
