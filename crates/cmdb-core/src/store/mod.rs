//! Object store collaborator
//!
//! The render engine and the reverse-reference finder read through
//! [`ObjectStore`]; persistence itself lives outside this crate. Every read
//! is a point lookup or a per-type scan, issued sequentially.

pub mod memory;

pub use memory::MemoryStore;

use crate::errors::Result;
use crate::model::{Object, ObjectId, Type, TypeId, User, UserId};

/// Read access to objects, types and users
///
/// Implementations return the NotFound family of [`crate::errors::CmdbError`]
/// for absent records and `CmdbError::Store` for backend failures.
pub trait ObjectStore {
    /// Get an object by public_id
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` if no such object exists.
    fn get_object(&self, id: ObjectId) -> Result<Object>;

    /// Get a type by public_id
    ///
    /// # Errors
    ///
    /// Returns `TypeNotFound` if no such type exists.
    fn get_type(&self, id: TypeId) -> Result<Type>;

    /// Get a user by public_id
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the user does not exist or was deleted.
    fn get_user(&self, id: UserId) -> Result<User>;

    /// List every type definition
    ///
    /// # Errors
    ///
    /// Returns `Store` on backend failure.
    fn list_types(&self) -> Result<Vec<Type>>;

    /// List the objects of the given types, ordered by public_id
    ///
    /// # Errors
    ///
    /// Returns `Store` on backend failure.
    fn objects_of_types(&self, type_ids: &[TypeId]) -> Result<Vec<Object>>;
}

/// Write access needed to clear inbound references of a deleted object
pub trait ObjectStoreMut: ObjectStore {
    /// Replace a stored object with the given version
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` if the object does not exist.
    fn update_object(&mut self, object: Object) -> Result<()>;
}
