use serde_json::Value;

use crate::errors::{CmdbError, Result};
use crate::model::{value_is_empty, FieldDescriptor, MergeStrategy, Object};
use crate::render::dates::{parse_permissive, structured_date};
use crate::render::reference::ReferenceResolver;
use crate::render::result::RenderedField;

/// Merge one field descriptor with the value stored on `object`
///
/// A field the object does not store renders with a null value. Textual
/// dates that cannot be parsed render as null. When `references` is given,
/// non-empty `ref`/`location` values get a resolved [`crate::render::Reference`].
///
/// # Errors
///
/// Returns only what the reference resolver cannot absorb: `AccessDenied`
/// and backend `Store` failures.
pub fn merge_field(
    descriptor: &FieldDescriptor,
    object: &Object,
    references: Option<&ReferenceResolver<'_>>,
) -> Result<RenderedField> {
    let stored = object.get_value(&descriptor.name).cloned().unwrap_or(Value::Null);

    let value = match merge_value(descriptor, stored) {
        Ok(v) => v,
        Err(err) => {
            tracing::debug!(
                object_id = object.public_id,
                error = %err,
                "field value dropped"
            );
            Value::Null
        }
    };

    let mut field = RenderedField::from_descriptor(descriptor, value);

    if descriptor.kind.strategy() == MergeStrategy::Reference && !value_is_empty(&field.value) {
        if let Some(resolver) = references {
            field.reference = Some(resolver.resolve(descriptor, &field.value)?);
        }
    }

    Ok(field)
}

/// Apply the kind-specific conversion to a stored value
fn merge_value(descriptor: &FieldDescriptor, stored: Value) -> Result<Value> {
    match (descriptor.kind.strategy(), stored) {
        (MergeStrategy::Date, Value::String(text)) => parse_permissive(&text)
            .map(structured_date)
            .ok_or_else(|| CmdbError::FieldResolution {
                field: descriptor.name.clone(),
                reason: format!("unrecognised date '{}'", text),
            }),
        (_, value) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AllowAllAccess;
    use crate::model::{FieldKind, Type};
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_scalar_copied_as_is() {
        let object = Object::new(1, 1, 1).with_field("hostname", json!("web-01"));
        let descriptor = FieldDescriptor::new("hostname", FieldKind::Text, "Hostname");

        let field = merge_field(&descriptor, &object, None).unwrap();

        assert_eq!(field.value, json!("web-01"));
        assert_eq!(field.label, "Hostname");
        assert!(field.reference.is_none());
    }

    #[test]
    fn test_missing_value_is_null() {
        let object = Object::new(1, 1, 1);
        let descriptor = FieldDescriptor::new("hostname", FieldKind::Text, "Hostname");

        let field = merge_field(&descriptor, &object, None).unwrap();
        assert_eq!(field.value, Value::Null);
    }

    #[test]
    fn test_textual_date_is_structured() {
        let object = Object::new(1, 1, 1).with_field("installed", json!("1970-01-02"));
        let descriptor = FieldDescriptor::new("installed", FieldKind::Date, "Installed");

        let field = merge_field(&descriptor, &object, None).unwrap();
        assert_eq!(field.value, json!({ "$date": 86_400_000 }));
    }

    #[test]
    fn test_unparseable_date_is_null() {
        let object = Object::new(1, 1, 1).with_field("installed", json!("someday"));
        let descriptor = FieldDescriptor::new("installed", FieldKind::Date, "Installed");

        let field = merge_field(&descriptor, &object, None).unwrap();
        assert_eq!(field.value, Value::Null);
    }

    #[test]
    fn test_structured_date_left_alone() {
        let object = Object::new(1, 1, 1).with_field("installed", json!({ "$date": 5 }));
        let descriptor = FieldDescriptor::new("installed", FieldKind::Date, "Installed");

        let field = merge_field(&descriptor, &object, None).unwrap();
        assert_eq!(field.value, json!({ "$date": 5 }));
    }

    #[test]
    fn test_reference_attached_only_when_resolving() {
        let mut store = MemoryStore::new();
        store.insert_type(Type::new(2, "rack", "Rack"));
        store.insert_object(Object::new(5, 2, 1));
        let object = Object::new(1, 1, 1).with_field("rack", json!(5));
        let descriptor = FieldDescriptor::reference("rack", "Rack", vec![2]);

        let plain = merge_field(&descriptor, &object, None).unwrap();
        assert!(plain.reference.is_none());

        let resolver = ReferenceResolver::new(&store, &AllowAllAccess, None, " | ");
        let resolved = merge_field(&descriptor, &object, Some(&resolver)).unwrap();
        let reference = resolved.reference.unwrap();
        assert_eq!(reference.object_id, 5);
        assert_eq!(reference.type_label, "Rack");
    }

    #[test]
    fn test_empty_reference_value_not_resolved() {
        let store = MemoryStore::new();
        let object = Object::new(1, 1, 1).with_field("rack", json!(""));
        let descriptor = FieldDescriptor::reference("rack", "Rack", vec![2]);
        let resolver = ReferenceResolver::new(&store, &AllowAllAccess, None, " | ");

        let field = merge_field(&descriptor, &object, Some(&resolver)).unwrap();
        assert!(field.reference.is_none());
    }
}
