pub mod acl;
pub mod object;
pub mod type_schema;
pub mod user;

pub use acl::{Permission, TypeAcl};
pub use object::{FieldValue, MdsEntry, MdsValue, Object};
pub use type_schema::{
    ExternalLink, FieldDescriptor, FieldKind, FieldSection, MergeStrategy, MultiDataSection,
    ReferenceSection, ReferenceSummaryOverride, SectionDescriptor, SectionReference, SummaryConfig,
    Type,
};
pub use user::User;

/// Stable identity of a Type
pub type TypeId = i64;
/// Stable identity of an Object
pub type ObjectId = i64;
/// Stable identity of a User
pub type UserId = i64;
/// Stable identity of a user group
pub type GroupId = i64;

/// Interpret a stored value as an object id.
///
/// Reference fields are written both as JSON numbers and as numeric strings
/// depending on the client that saved them.
pub fn value_as_object_id(value: &serde_json::Value) -> Option<ObjectId> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whether a stored value counts as absent (null or empty string)
pub fn value_is_empty(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_as_object_id() {
        assert_eq!(value_as_object_id(&json!(5)), Some(5));
        assert_eq!(value_as_object_id(&json!("12")), Some(12));
        assert_eq!(value_as_object_id(&json!("abc")), None);
        assert_eq!(value_as_object_id(&json!(null)), None);
        assert_eq!(value_as_object_id(&json!(1.5)), None);
    }

    #[test]
    fn test_value_is_empty() {
        assert!(value_is_empty(&json!(null)));
        assert!(value_is_empty(&json!("")));
        assert!(!value_is_empty(&json!(0)));
        assert!(!value_is_empty(&json!("x")));
    }
}
