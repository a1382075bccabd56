//! Access control collaborator
//!
//! The render engine never interprets ACL storage itself; it asks an
//! [`AccessControl`] implementation whether a user may act on a type.
//! Denials are security-relevant and always propagate to the caller.

use crate::errors::{CmdbError, Result};
use crate::model::{GroupId, Permission, Type, User};

/// Decides whether a user holds a permission on a type's objects
pub trait AccessControl {
    /// Verify `user` may exercise `permission` on objects of `type_`
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` when the permission is not granted.
    fn verify(&self, type_: &Type, user: &User, permission: Permission) -> Result<()>;
}

/// Access control that grants everything
///
/// Useful for internal jobs (exports, reference clearing) that run with
/// system privileges.
///
/// # Example
/// ```
/// use cmdb_core::access::{AccessControl, AllowAllAccess};
/// use cmdb_core::model::{Permission, Type, User};
///
/// let type_ = Type::new(1, "server", "Server");
/// let user = User::new(1, "admin", 1);
/// assert!(AllowAllAccess.verify(&type_, &user, Permission::Read).is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllAccess;

impl AccessControl for AllowAllAccess {
    fn verify(&self, _type: &Type, _user: &User, _permission: Permission) -> Result<()> {
        Ok(())
    }
}

/// Access control driven by the ACL stored on each type
///
/// Users whose group is listed in `admin_groups` bypass type ACLs.
#[derive(Debug, Clone, Default)]
pub struct TypeAclAccess {
    admin_groups: Vec<GroupId>,
}

impl TypeAclAccess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat members of `group_id` as administrators
    pub fn with_admin_group(mut self, group_id: GroupId) -> Self {
        self.admin_groups.push(group_id);
        self
    }
}

impl AccessControl for TypeAclAccess {
    fn verify(&self, type_: &Type, user: &User, permission: Permission) -> Result<()> {
        if self.admin_groups.contains(&user.group_id) || type_.acl.grants(user.group_id, permission)
        {
            return Ok(());
        }
        Err(CmdbError::AccessDenied {
            type_id: type_.public_id,
            user_id: user.public_id,
            permission: permission.to_string(),
        })
    }
}
