use std::collections::HashSet;
use std::time::Instant;

use cmdb_core_types::schema::OP_FIND_REFERENCING;
use serde::{Deserialize, Serialize};

use crate::access::AccessControl;
use crate::errors::{CmdbError, Result};
use crate::model::{
    value_as_object_id, FieldKind, FieldValue, Object, ObjectId, Permission, Type, TypeId, User,
    UserId,
};
use crate::references::paging::{paginate, sort_objects, PagedResult, SortKey, SortOrder};
use crate::store::ObjectStore;
use crate::{log_op_end, log_op_error, log_op_start};

/// Extra filter applied to referencing objects
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectCriteria {
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub type_ids: Option<Vec<TypeId>>,
    #[serde(default)]
    pub author_id: Option<UserId>,
}

impl ObjectCriteria {
    pub fn matches(&self, object: &Object) -> bool {
        self.active.map_or(true, |active| object.active == active)
            && self
                .type_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&object.type_id))
            && self.author_id.map_or(true, |id| object.author_id == id)
    }
}

/// Listing parameters for [`ReverseReferenceFinder::find_referencing`]
///
/// `limit <= 0` returns everything after `skip`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceQuery {
    #[serde(default)]
    pub criteria: ObjectCriteria,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub skip: usize,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub order: SortOrder,
}

impl ReferenceQuery {
    pub fn page(skip: usize, limit: i64) -> Self {
        Self {
            skip,
            limit,
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, sort: SortKey, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    pub fn with_criteria(mut self, criteria: ObjectCriteria) -> Self {
        self.criteria = criteria;
        self
    }
}

/// Finds every object that references a given target object
///
/// Two independent pipelines are merged: direct reference fields and
/// reference-section backing fields, and reference values nested inside
/// multi-data sections. An object found by both appears once.
pub struct ReverseReferenceFinder<'a> {
    store: &'a dyn ObjectStore,
    access: &'a dyn AccessControl,
}

impl<'a> ReverseReferenceFinder<'a> {
    pub fn new(store: &'a dyn ObjectStore, access: &'a dyn AccessControl) -> Self {
        Self { store, access }
    }

    /// List the objects referencing `target`, sorted and paginated
    ///
    /// Objects whose type `user` may not access with `permission` are left
    /// out. `total` counts the merged, filtered set before pagination.
    ///
    /// # Errors
    ///
    /// Returns `Store` on backend failure.
    pub fn find_referencing(
        &self,
        target: &Object,
        query: &ReferenceQuery,
        user: Option<&User>,
        permission: Permission,
    ) -> Result<PagedResult<Object>> {
        log_op_start!(
            OP_FIND_REFERENCING,
            object_id = target.public_id,
            skip = query.skip,
            limit = query.limit
        );
        let start = Instant::now();

        let result = self.collect(target, user, permission).map(|merged| {
            let mut filtered: Vec<Object> = merged
                .into_iter()
                .filter(|o| query.criteria.matches(o))
                .collect();
            let total = filtered.len();
            sort_objects(&mut filtered, &query.sort, query.order);
            PagedResult {
                results: paginate(filtered, query.skip, query.limit),
                total,
                skip: query.skip,
                limit: query.limit,
            }
        });

        let elapsed = start.elapsed().as_millis() as u64;
        match &result {
            Ok(page) => {
                log_op_end!(
                    OP_FIND_REFERENCING,
                    duration_ms = elapsed,
                    object_id = target.public_id,
                    total = page.total,
                    results_len = page.results.len()
                );
            }
            Err(err) => {
                log_op_error!(
                    OP_FIND_REFERENCING,
                    err.clone(),
                    duration_ms = elapsed,
                    object_id = target.public_id
                );
            }
        }
        result
    }

    /// Merged, unsorted, unpaginated referencing objects
    ///
    /// # Errors
    ///
    /// Returns `Store` on backend failure.
    pub(crate) fn collect(
        &self,
        target: &Object,
        user: Option<&User>,
        permission: Permission,
    ) -> Result<Vec<Object>> {
        let types = self.permitted_types(user, permission)?;
        let direct = self.direct_matches(target, &types)?;
        let mds = self.mds_matches(target, &types)?;
        Ok(merge_unique(direct, mds))
    }

    fn permitted_types(&self, user: Option<&User>, permission: Permission) -> Result<Vec<Type>> {
        let mut permitted = Vec::new();
        for type_ in self.store.list_types()? {
            let allowed = match user {
                None => true,
                Some(user) => match self.access.verify(&type_, user, permission) {
                    Ok(()) => true,
                    Err(CmdbError::AccessDenied { .. }) => false,
                    Err(err) => return Err(err),
                },
            };
            if allowed {
                permitted.push(type_);
            }
        }
        Ok(permitted)
    }

    /// Objects holding `target`'s id in a ref field or a reference-section
    /// backing field declared for the target's type
    fn direct_matches(&self, target: &Object, types: &[Type]) -> Result<Vec<Object>> {
        let candidates: Vec<&Type> = types
            .iter()
            .filter(|t| t.references_type(target.type_id))
            .collect();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<TypeId> = candidates.iter().map(|t| t.public_id).collect();
        let objects = self.store.objects_of_types(&ids)?;

        Ok(objects
            .into_iter()
            .filter(|object| {
                candidates
                    .iter()
                    .find(|t| t.public_id == object.type_id)
                    .is_some_and(|t| {
                        referencing_field_names(t, target.type_id)
                            .iter()
                            .any(|name| points_at(object.get_value(name), target.public_id))
                    })
            })
            .collect())
    }

    /// Objects holding `target`'s id in a multi-data-section value their
    /// type declares as a `ref` field
    fn mds_matches(&self, target: &Object, types: &[Type]) -> Result<Vec<Object>> {
        let candidates: Vec<&Type> = types
            .iter()
            .filter(|t| t.ref_fields_targeting(target.type_id).next().is_some())
            .collect();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<TypeId> = candidates.iter().map(|t| t.public_id).collect();
        let objects = self.store.objects_of_types(&ids)?;

        Ok(objects
            .into_iter()
            .filter(Object::has_multi_data_values)
            .filter(|object| {
                candidates
                    .iter()
                    .find(|t| t.public_id == object.type_id)
                    .is_some_and(|t| {
                        object
                            .multi_data_sections
                            .iter()
                            .flat_map(|entry| entry.field_values())
                            .any(|value| is_mds_reference(t, value, target.public_id))
                    })
            })
            .collect())
    }
}

/// Names of the fields of `type_` that may hold an id of a `target_type` object
pub(crate) fn referencing_field_names(type_: &Type, target_type: TypeId) -> Vec<&str> {
    type_
        .ref_fields_targeting(target_type)
        .map(|f| f.name.as_str())
        .chain(
            type_
                .reference_sections_targeting(target_type)
                .map(|s| s.field.as_str()),
        )
        .collect()
}

/// Whether a multi-data-section value is a `ref` field pointing at `target_id`
pub(crate) fn is_mds_reference(type_: &Type, value: &FieldValue, target_id: ObjectId) -> bool {
    type_
        .get_field(&value.name)
        .is_some_and(|d| d.kind == FieldKind::Ref)
        && points_at(Some(&value.value), target_id)
}

/// Stricter form of [`is_mds_reference`]: the `ref` field must also declare
/// the target's type among its `ref_types`
pub(crate) fn is_typed_mds_reference(type_: &Type, value: &FieldValue, target: &Object) -> bool {
    type_
        .get_field(&value.name)
        .is_some_and(|d| d.references_type(target.type_id))
        && points_at(Some(&value.value), target.public_id)
}

fn points_at(value: Option<&serde_json::Value>, target_id: ObjectId) -> bool {
    value.and_then(value_as_object_id) == Some(target_id)
}

/// Union of two result sets by public_id; `primary` wins on duplicates
pub fn merge_unique(primary: Vec<Object>, secondary: Vec<Object>) -> Vec<Object> {
    let mut seen: HashSet<ObjectId> = primary.iter().map(|o| o.public_id).collect();
    let mut merged = primary;
    for object in secondary {
        if seen.insert(object.public_id) {
            merged.push(object);
        }
    }
    merged
}
