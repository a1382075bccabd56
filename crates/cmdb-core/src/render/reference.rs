use serde_json::Value;

use crate::access::AccessControl;
use crate::errors::{CmdbError, Result};
use crate::model::{value_as_object_id, FieldDescriptor, FieldKind, Permission, User};
use crate::render::result::{Reference, ReferenceSummary};
use crate::render::template::{display_value, Template};
use crate::store::ObjectStore;

/// Resolves the stored id of a `ref`/`location` field into a [`Reference`]
///
/// Missing targets produce a blank reference. Read permission on the target's
/// type is enforced for the requesting user and a denial is returned as an
/// error, never swallowed.
pub struct ReferenceResolver<'a> {
    store: &'a dyn ObjectStore,
    access: &'a dyn AccessControl,
    user: Option<&'a User>,
    separator: &'a str,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(
        store: &'a dyn ObjectStore,
        access: &'a dyn AccessControl,
        user: Option<&'a User>,
        separator: &'a str,
    ) -> Self {
        Self {
            store,
            access,
            user,
            separator,
        }
    }

    /// Resolve `value`, the stored content of `field`
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` when the requesting user may not read the
    /// target's type, or `Store` on backend failure. Absent targets are not
    /// errors.
    pub fn resolve(&self, field: &FieldDescriptor, value: &Value) -> Result<Reference> {
        let Some(object_id) = value_as_object_id(value) else {
            tracing::debug!(field = %field.name, "reference value is not an object id");
            return Ok(Reference::default());
        };

        let target = match self.store.get_object(object_id) {
            Ok(object) => object,
            Err(err) if err.is_recoverable() => {
                tracing::debug!(field = %field.name, object_id, "reference target missing");
                return Ok(Reference::default());
            }
            Err(err) => return Err(err),
        };
        let target_type = match self.store.get_type(target.type_id) {
            Ok(t) => t,
            Err(err) if err.is_recoverable() => {
                tracing::debug!(
                    field = %field.name,
                    object_id,
                    type_id = target.type_id,
                    "reference target has unknown type"
                );
                return Ok(Reference::default());
            }
            Err(err) => return Err(err),
        };
        if let Some(user) = self.user {
            self.access.verify(&target_type, user, Permission::Read)?;
        }

        let custom = field
            .override_for(target_type.public_id)
            .filter(|o| o.line.is_some() || !o.fields.is_empty());

        let summary_fields: Vec<(&str, FieldKind)> = match custom {
            Some(o) => o
                .fields
                .iter()
                .map(|name| {
                    let kind = target_type
                        .get_field(name)
                        .map_or(FieldKind::Other, |d| d.kind);
                    (name.as_str(), kind)
                })
                .collect(),
            None => target_type
                .summary_fields()
                .into_iter()
                .map(|d| (d.name.as_str(), d.kind))
                .collect(),
        };

        let mut summaries = Vec::with_capacity(summary_fields.len());
        for (name, kind) in summary_fields {
            match target.get_value(name) {
                Some(v) => summaries.push(ReferenceSummary {
                    value: display_value(v),
                    kind,
                }),
                None => {
                    tracing::debug!(object_id, field = name, "summary field missing on target");
                }
            }
        }

        let override_ = field.override_for(target_type.public_id);
        let mut reference = Reference {
            type_id: target_type.public_id,
            object_id,
            type_label: target_type.label.clone(),
            icon: override_
                .and_then(|o| o.icon.clone())
                .unwrap_or_else(|| target_type.icon_or_default().to_string()),
            prefix: override_.and_then(|o| o.prefix).unwrap_or(true),
            summaries,
            line: String::new(),
        };

        match custom.and_then(|o| o.line.as_deref()) {
            Some(line) => apply_line_template(&mut reference, line),
            None => {
                reference.line = reference
                    .summaries
                    .iter()
                    .map(|s| s.value.as_str())
                    .collect::<Vec<_>>()
                    .join(self.separator);
            }
        }

        Ok(reference)
    }
}

/// Fill `line` from the collected summary values
///
/// A template with no placeholders is shown as-is and the summaries are
/// dropped. A template that cannot be filled is kept unfilled along with
/// the summaries.
fn apply_line_template(reference: &mut Reference, line: &str) {
    let filled = Template::parse(line).and_then(|template| {
        if template.placeholder_count() == 0 {
            return Ok(None);
        }
        let values: Vec<&str> = reference.summaries.iter().map(|s| s.value.as_str()).collect();
        template.fill(&values).map(Some)
    });

    match filled {
        Ok(Some(text)) => reference.line = text,
        Ok(None) => {
            reference.line = line.to_string();
            reference.summaries.clear();
        }
        Err(err) => {
            if let CmdbError::Interpolation { reason, .. } = &err {
                tracing::debug!(template = line, reason = %reason, "summary line left unfilled");
            }
            reference.line = line.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AllowAllAccess, TypeAclAccess};
    use crate::model::{Object, ReferenceSummaryOverride, Type, TypeAcl};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn store_with_target() -> MemoryStore {
        let mut store = MemoryStore::new();
        let mut ip_type = Type::new(2, "ip", "IP Address")
            .with_field(FieldDescriptor::new("address", FieldKind::Text, "Address"))
            .with_field(FieldDescriptor::new("vlan", FieldKind::Number, "VLAN"))
            .with_summary_fields(vec!["address".to_string(), "vlan".to_string()]);
        ip_type.icon = Some("fa fa-globe".to_string());
        store.insert_type(ip_type);
        store.insert_object(
            Object::new(5, 2, 1)
                .with_field("address", json!("10.0.0.1"))
                .with_field("vlan", json!(12)),
        );
        store
    }

    fn ref_field() -> FieldDescriptor {
        FieldDescriptor::reference("ip", "IP", vec![2])
    }

    #[test]
    fn test_resolve_with_default_summaries() {
        let store = store_with_target();
        let resolver = ReferenceResolver::new(&store, &AllowAllAccess, None, " | ");

        let reference = resolver.resolve(&ref_field(), &json!(5)).unwrap();

        assert_eq!(reference.object_id, 5);
        assert_eq!(reference.type_id, 2);
        assert_eq!(reference.type_label, "IP Address");
        assert_eq!(reference.icon, "fa fa-globe");
        assert!(reference.prefix);
        assert_eq!(reference.summaries.len(), 2);
        assert_eq!(reference.line, "10.0.0.1 | 12");
    }

    #[test]
    fn test_resolve_missing_target_is_blank() {
        let store = store_with_target();
        let resolver = ReferenceResolver::new(&store, &AllowAllAccess, None, " | ");

        let reference = resolver.resolve(&ref_field(), &json!(999)).unwrap();
        assert!(reference.is_blank());
        assert_eq!(reference, Reference::default());
    }

    #[test]
    fn test_override_line_template() {
        let store = store_with_target();
        let field = ref_field().with_summary_override(ReferenceSummaryOverride {
            type_id: 2,
            line: Some("IP {}".to_string()),
            icon: Some("fa fa-network-wired".to_string()),
            prefix: Some(false),
            fields: vec!["address".to_string()],
        });
        let resolver = ReferenceResolver::new(&store, &AllowAllAccess, None, " | ");

        let reference = resolver.resolve(&field, &json!("5")).unwrap();

        assert_eq!(reference.line, "IP 10.0.0.1");
        assert_eq!(reference.icon, "fa fa-network-wired");
        assert!(!reference.prefix);
        assert_eq!(reference.summaries.len(), 1);
    }

    #[test]
    fn test_template_without_placeholders_clears_summaries() {
        let store = store_with_target();
        let field = ref_field().with_summary_override(ReferenceSummaryOverride {
            type_id: 2,
            line: Some("Gateway".to_string()),
            fields: vec!["address".to_string()],
            ..Default::default()
        });
        let resolver = ReferenceResolver::new(&store, &AllowAllAccess, None, " | ");

        let reference = resolver.resolve(&field, &json!(5)).unwrap();

        assert_eq!(reference.line, "Gateway");
        assert!(reference.summaries.is_empty());
        assert!(reference.prefix);
    }

    #[test]
    fn test_unfillable_template_keeps_summaries() {
        let store = store_with_target();
        let field = ref_field().with_summary_override(ReferenceSummaryOverride {
            type_id: 2,
            line: Some("{} via {}".to_string()),
            fields: vec!["address".to_string(), "missing".to_string()],
            ..Default::default()
        });
        let resolver = ReferenceResolver::new(&store, &AllowAllAccess, None, " | ");

        let reference = resolver.resolve(&field, &json!(5)).unwrap();

        assert_eq!(reference.line, "{} via {}");
        assert_eq!(reference.summaries.len(), 1);
    }

    #[test]
    fn test_access_denied_propagates() {
        let mut store = store_with_target();
        let mut locked = store.get_type(2).unwrap();
        locked.acl = TypeAcl::granting(1, vec![crate::model::Permission::Read]);
        store.insert_type(locked);

        let access = TypeAclAccess::new();
        let outsider = User::new(3, "outsider", 9);
        let resolver = ReferenceResolver::new(&store, &access, Some(&outsider), " | ");

        let result = resolver.resolve(&ref_field(), &json!(5));
        assert!(matches!(result, Err(CmdbError::AccessDenied { .. })));
    }
}
