use std::collections::{BTreeMap, HashMap};

use crate::errors::{CmdbError, Result};
use crate::model::{Object, ObjectId, Type, TypeId, User, UserId};
use crate::store::{ObjectStore, ObjectStoreMut};

/// In-memory store for types, objects and users
///
/// Objects are kept in a `BTreeMap` so per-type scans come back in
/// public_id order. Not thread-safe for writers; readers share `&self`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub(crate) types: HashMap<TypeId, Type>,
    pub(crate) objects: BTreeMap<ObjectId, Object>,
    pub(crate) users: HashMap<UserId, User>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_type(&mut self, type_: Type) {
        self.types.insert(type_.public_id, type_);
    }

    pub fn insert_object(&mut self, object: Object) {
        self.objects.insert(object.public_id, object);
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.public_id, user);
    }

    /// Remove a user, e.g. to model a deleted author
    pub fn remove_user(&mut self, id: UserId) -> Option<User> {
        self.users.remove(&id)
    }

    /// Remove an object without touching its inbound references
    pub fn remove_object(&mut self, id: ObjectId) -> Option<Object> {
        self.objects.remove(&id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

impl ObjectStore for MemoryStore {
    fn get_object(&self, id: ObjectId) -> Result<Object> {
        self.objects
            .get(&id)
            .cloned()
            .ok_or(CmdbError::ObjectNotFound { object_id: id })
    }

    fn get_type(&self, id: TypeId) -> Result<Type> {
        self.types
            .get(&id)
            .cloned()
            .ok_or(CmdbError::TypeNotFound { type_id: id })
    }

    fn get_user(&self, id: UserId) -> Result<User> {
        self.users
            .get(&id)
            .cloned()
            .ok_or(CmdbError::UserNotFound { user_id: id })
    }

    fn list_types(&self) -> Result<Vec<Type>> {
        let mut types: Vec<Type> = self.types.values().cloned().collect();
        types.sort_by_key(|t| t.public_id);
        Ok(types)
    }

    fn objects_of_types(&self, type_ids: &[TypeId]) -> Result<Vec<Object>> {
        Ok(self
            .objects
            .values()
            .filter(|o| type_ids.contains(&o.type_id))
            .cloned()
            .collect())
    }
}

impl ObjectStoreMut for MemoryStore {
    fn update_object(&mut self, object: Object) -> Result<()> {
        match self.objects.get_mut(&object.public_id) {
            Some(slot) => {
                *slot = object;
                Ok(())
            }
            None => Err(CmdbError::ObjectNotFound {
                object_id: object.public_id,
            }),
        }
    }
}
