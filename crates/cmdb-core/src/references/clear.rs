use std::time::Instant;

use cmdb_core_types::schema::OP_CLEAR_REFERENCES;
use serde_json::Value;

use crate::access::AllowAllAccess;
use crate::errors::Result;
use crate::model::{Object, Permission};
use crate::references::finder::{
    is_typed_mds_reference, referencing_field_names, ReverseReferenceFinder,
};
use crate::store::ObjectStoreMut;
use crate::{log_op_end, log_op_error, log_op_start};

/// Null every inbound reference to `target`
///
/// Runs with system privileges: every referencing object is rewritten
/// regardless of type ACLs. Only objects that actually change are written
/// back, so a repeated call rewrites nothing and returns `0`. A multi-data
/// value is only cleared when its `ref` field declares the target's type;
/// an equal id belonging to another type is left alone.
///
/// # Errors
///
/// Returns `Store` on backend failure and `ObjectNotFound` if a referencing
/// object disappears before it is written.
pub fn clear_references<S: ObjectStoreMut>(store: &mut S, target: &Object) -> Result<usize> {
    log_op_start!(OP_CLEAR_REFERENCES, object_id = target.public_id);
    let start = Instant::now();

    let result = clear_inner(store, target);

    let elapsed = start.elapsed().as_millis() as u64;
    match &result {
        Ok(count) => {
            log_op_end!(
                OP_CLEAR_REFERENCES,
                duration_ms = elapsed,
                object_id = target.public_id,
                updated = *count
            );
        }
        Err(err) => {
            log_op_error!(
                OP_CLEAR_REFERENCES,
                err.clone(),
                duration_ms = elapsed,
                object_id = target.public_id
            );
        }
    }
    result
}

fn clear_inner<S: ObjectStoreMut>(store: &mut S, target: &Object) -> Result<usize> {
    let referencing = ReverseReferenceFinder::new(&*store, &AllowAllAccess).collect(
        target,
        None,
        Permission::Update,
    )?;

    let mut updated = 0;
    for mut object in referencing {
        let type_ = store.get_type(object.type_id)?;
        let names = referencing_field_names(&type_, target.type_id);
        let mut changed = false;

        for field in object.fields.iter_mut() {
            if names.contains(&field.name.as_str())
                && crate::model::value_as_object_id(&field.value) == Some(target.public_id)
            {
                field.value = Value::Null;
                changed = true;
            }
        }
        for entry in object.multi_data_sections.iter_mut() {
            for value in entry.field_values_mut() {
                if is_typed_mds_reference(&type_, value, target) {
                    value.value = Value::Null;
                    changed = true;
                }
            }
        }

        if changed {
            tracing::debug!(
                object_id = object.public_id,
                target_id = target.public_id,
                "inbound reference cleared"
            );
            store.update_object(object)?;
            updated += 1;
        }
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDescriptor, FieldValue, MdsEntry, MdsValue, Type};
    use crate::store::{MemoryStore, ObjectStore};
    use serde_json::json;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_type(Type::new(2, "b", "B"));
        store.insert_type(
            Type::new(1, "a", "A")
                .with_field(FieldDescriptor::reference("ref-b", "B", vec![2]))
                .with_field(FieldDescriptor::new(
                    "note",
                    crate::model::FieldKind::Text,
                    "Note",
                )),
        );
        store.insert_object(Object::new(5, 2, 1));
        store.insert_object(
            Object::new(10, 1, 1)
                .with_field("ref-b", json!(5))
                .with_field("note", json!(5)),
        );
        store.insert_object(Object::new(11, 1, 1).with_multi_data_section(MdsEntry {
            section_id: "links".to_string(),
            values: vec![MdsValue {
                data: vec![FieldValue::new("ref-b", json!("5"))],
            }],
        }));
        store
    }

    #[test]
    fn test_clears_direct_and_mds_references() {
        let mut store = store();
        let target = store.get_object(5).unwrap();

        let updated = clear_references(&mut store, &target).unwrap();
        assert_eq!(updated, 2);

        let a = store.get_object(10).unwrap();
        assert_eq!(a.get_value("ref-b"), Some(&Value::Null));
        assert_eq!(a.get_value("note"), Some(&json!(5)));

        let mds = store.get_object(11).unwrap();
        let value = mds.multi_data_sections[0].field_values().next().unwrap();
        assert!(value.value.is_null());
    }

    #[test]
    fn test_mds_value_of_other_ref_type_is_kept() {
        let mut store = store();
        store.insert_type(Type::new(3, "c", "C"));
        store.insert_type(
            Type::new(1, "a", "A")
                .with_field(FieldDescriptor::reference("ref-b", "B", vec![2]))
                .with_field(FieldDescriptor::reference("ref-c", "C", vec![3])),
        );
        store.insert_object(Object::new(12, 1, 1).with_multi_data_section(MdsEntry {
            section_id: "links".to_string(),
            values: vec![MdsValue {
                data: vec![
                    FieldValue::new("ref-b", json!(5)),
                    FieldValue::new("ref-c", json!(5)),
                ],
            }],
        }));
        store.insert_object(Object::new(50, 1, 1).with_multi_data_section(MdsEntry {
            section_id: "links".to_string(),
            values: vec![MdsValue {
                data: vec![FieldValue::new("ref-c", json!(5))],
            }],
        }));
        let target = store.get_object(5).unwrap();

        let updated = clear_references(&mut store, &target).unwrap();
        assert_eq!(updated, 3);

        let mixed = store.get_object(12).unwrap();
        let values: Vec<&Value> = mixed.multi_data_sections[0]
            .field_values()
            .map(|v| &v.value)
            .collect();
        assert_eq!(values, vec![&Value::Null, &json!(5)]);

        let untouched = store.get_object(50).unwrap();
        let value = untouched.multi_data_sections[0].field_values().next().unwrap();
        assert_eq!(value.value, json!(5));
    }

    #[test]
    fn test_clearing_is_idempotent() {
        let mut store = store();
        let target = store.get_object(5).unwrap();

        clear_references(&mut store, &target).unwrap();
        let snapshot = store.clone();
        let second = clear_references(&mut store, &target).unwrap();

        assert_eq!(second, 0);
        assert_eq!(store.get_object(10).unwrap(), snapshot.get_object(10).unwrap());
        assert_eq!(store.get_object(11).unwrap(), snapshot.get_object(11).unwrap());
    }
}
