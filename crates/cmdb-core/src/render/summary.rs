use serde_json::Value;

use crate::model::{Object, Type};
use crate::render::result::ObjectSummary;
use crate::render::template::display_value;

/// Build an object's own summary entries and summary line
///
/// Types without summary fields fall back to `"{type label} #{public_id}"`
/// with no entries.
pub fn object_summaries(
    type_: &Type,
    object: &Object,
    separator: &str,
) -> (Vec<ObjectSummary>, String) {
    if !type_.has_summaries() {
        return (Vec::new(), default_summary_line(type_, object));
    }

    let summaries: Vec<ObjectSummary> = type_
        .summary_fields()
        .into_iter()
        .map(|descriptor| ObjectSummary {
            name: descriptor.name.clone(),
            label: descriptor.label.clone(),
            kind: descriptor.kind,
            value: object
                .get_value(&descriptor.name)
                .cloned()
                .unwrap_or(Value::Null),
        })
        .collect();

    if summaries.is_empty() {
        return (summaries, default_summary_line(type_, object));
    }

    let line = summaries
        .iter()
        .map(|s| display_value(&s.value))
        .collect::<Vec<_>>()
        .join(separator);

    (summaries, line)
}

fn default_summary_line(type_: &Type, object: &Object) -> String {
    format!("{} #{}", type_.label, object.public_id)
}
