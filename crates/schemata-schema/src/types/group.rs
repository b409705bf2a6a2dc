//! `group`: a presentation marker with no data.

use super::{FieldTypePlugin, Ignore, Omit};
use crate::field::kinds;
use crate::format::Format;

pub(super) fn plugin() -> FieldTypePlugin {
    FieldTypePlugin::new(kinds::GROUP)
        .converters(Ignore)
        .exporter(Format::Csv, Omit)
}
