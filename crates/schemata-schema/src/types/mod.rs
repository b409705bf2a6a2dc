//! Field type capabilities and the built-in field types.
//!
//! A field type is a bundle of optional capabilities registered under its name: converters
//! per input [`Format`], exporters per output format, a search [`Indexer`], an [`Emptiness`]
//! predicate and a default [`Renderer`]. [`FieldTypePlugin`] collects them for registration.

mod area;
mod array;
mod boolean;
mod choice;
mod date;
mod group;
mod join;
mod number;
mod password;
mod string;
mod tags;
mod url;

use std::sync::Arc;

use async_trait::async_trait;
use schemata_core::{Record, RequestContext};
use serde_json::Value;

use crate::convert::ConvertContext;
use crate::error::{ConvertError, ExportError, RenderError};
use crate::field::Field;
use crate::format::Format;
use crate::index::SearchTexts;

pub use area::{area_is_empty, text_to_area};

/// Sanitizes raw input for one field and assigns it on the target.
///
/// Bad input degrades to a safe value instead of failing; errors are reserved for
/// misconfiguration and collaborator failures.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(
        &self,
        cx: &ConvertContext<'_>,
        input: &Record,
        name: &str,
        target: &mut Record,
        field: &Field,
    ) -> Result<(), ConvertError>;
}

/// Writes one field's value into an output record.
#[async_trait]
pub trait Exporter: Send + Sync {
    async fn export(
        &self,
        cx: &RequestContext,
        source: &Record,
        field: &Field,
        name: &str,
        output: &mut Record,
    ) -> Result<(), ExportError>;
}

/// Produces search text for one field value.
pub trait Indexer: Send + Sync {
    fn index(&self, value: Option<&Value>, field: &Field, texts: &mut SearchTexts);
}

impl<F> Indexer for F
where
    F: Fn(Option<&Value>, &Field, &mut SearchTexts) + Send + Sync,
{
    fn index(&self, value: Option<&Value>, field: &Field, texts: &mut SearchTexts) {
        self(value, field, texts)
    }
}

/// Decides whether a present, non-`false` value is empty.
pub trait Emptiness: Send + Sync {
    fn is_empty(&self, field: &Field, value: &Value) -> bool;
}

impl<F> Emptiness for F
where
    F: Fn(&Field, &Value) -> bool + Send + Sync,
{
    fn is_empty(&self, field: &Field, value: &Value) -> bool {
        self(field, value)
    }
}

/// Renders a field's editor presentation.
pub trait Renderer: Send + Sync {
    fn render(&self, field: &Field) -> Result<String, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&Field) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, field: &Field) -> Result<String, RenderError> {
        self(field)
    }
}

/// Everything a field type contributes to the registry.
pub struct FieldTypePlugin {
    pub(crate) name: String,
    pub(crate) converters: Vec<(Format, Arc<dyn Converter>)>,
    pub(crate) exporters: Vec<(Format, Arc<dyn Exporter>)>,
    pub(crate) indexer: Option<Arc<dyn Indexer>>,
    pub(crate) emptiness: Option<Arc<dyn Emptiness>>,
    pub(crate) renderer: Option<Arc<dyn Renderer>>,
}

impl FieldTypePlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            converters: Vec::new(),
            exporters: Vec::new(),
            indexer: None,
            emptiness: None,
            renderer: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn converter(mut self, format: Format, converter: impl Converter + 'static) -> Self {
        self.converters.push((format, Arc::new(converter)));
        self
    }

    /// Registers the same converter for both `csv` and `form`.
    #[must_use]
    pub fn converters(mut self, converter: impl Converter + 'static) -> Self {
        let shared: Arc<dyn Converter> = Arc::new(converter);
        self.converters.push((Format::Csv, shared.clone()));
        self.converters.push((Format::Form, shared));
        self
    }

    #[must_use]
    pub fn exporter(mut self, format: Format, exporter: impl Exporter + 'static) -> Self {
        self.exporters.push((format, Arc::new(exporter)));
        self
    }

    #[must_use]
    pub fn indexer(mut self, indexer: impl Indexer + 'static) -> Self {
        self.indexer = Some(Arc::new(indexer));
        self
    }

    #[must_use]
    pub fn emptiness(mut self, emptiness: impl Emptiness + 'static) -> Self {
        self.emptiness = Some(Arc::new(emptiness));
        self
    }

    #[must_use]
    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }
}

/// The built-in field types.
pub(crate) fn builtins() -> Vec<FieldTypePlugin> {
    let mut plugins = Vec::new();
    plugins.extend(string::plugins());
    plugins.push(password::plugin());
    plugins.push(boolean::plugin());
    plugins.extend(choice::plugins());
    plugins.extend(number::plugins());
    plugins.push(tags::plugin());
    plugins.push(url::plugin());
    plugins.extend(date::plugins());
    plugins.push(group::plugin());
    plugins.push(array::plugin());
    plugins.extend(area::plugins());
    plugins.extend(join::plugins());
    plugins
}

/// Converter assigning a pure sanitization of the field's raw input.
pub struct Sanitizer<F>(pub F);

#[async_trait]
impl<F> Converter for Sanitizer<F>
where
    F: Fn(Option<&Value>, &Field) -> Value + Send + Sync,
{
    async fn convert(
        &self,
        _cx: &ConvertContext<'_>,
        input: &Record,
        name: &str,
        target: &mut Record,
        field: &Field,
    ) -> Result<(), ConvertError> {
        target.insert(name.to_string(), (self.0)(input.get(name), field));
        Ok(())
    }
}

/// Converter for types that carry no data in a format.
pub struct Ignore;

#[async_trait]
impl Converter for Ignore {
    async fn convert(
        &self,
        _cx: &ConvertContext<'_>,
        _input: &Record,
        _name: &str,
        _target: &mut Record,
        _field: &Field,
    ) -> Result<(), ConvertError> {
        Ok(())
    }
}

/// Exporter for types that are deliberately left out of an output.
pub struct Omit;

#[async_trait]
impl Exporter for Omit {
    async fn export(
        &self,
        _cx: &RequestContext,
        _source: &Record,
        _field: &Field,
        _name: &str,
        _output: &mut Record,
    ) -> Result<(), ExportError> {
        Ok(())
    }
}

/// Exporter writing a flat text rendition of the stored value.
pub struct Text<F>(pub F);

#[async_trait]
impl<F> Exporter for Text<F>
where
    F: Fn(Option<&Value>) -> String + Send + Sync,
{
    async fn export(
        &self,
        _cx: &RequestContext,
        source: &Record,
        _field: &Field,
        name: &str,
        output: &mut Record,
    ) -> Result<(), ExportError> {
        output.insert(name.to_string(), Value::String((self.0)(source.get(name))));
        Ok(())
    }
}

/// Plain text of a scalar; empty for anything else.
pub(crate) fn plain_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Comma-joined text of a list of scalars.
pub(crate) fn comma_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| plain_text(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        other => plain_text(other),
    }
}

pub(crate) fn empty_text(_field: &Field, value: &Value) -> bool {
    value.as_str().is_some_and(str::is_empty)
}

pub(crate) fn empty_list(_field: &Field, value: &Value) -> bool {
    value.as_array().is_some_and(Vec::is_empty)
}

/// Indexes a scalar as text.
pub(crate) fn index_text(value: Option<&Value>, field: &Field, texts: &mut SearchTexts) {
    let text = plain_text(value);
    texts.push(field, text);
}
