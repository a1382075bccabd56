use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::GroupId;

/// Permission a user may hold on the objects of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Create,
    Read,
    Update,
    Delete,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Create => "create",
            Permission::Read => "read",
            Permission::Update => "update",
            Permission::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access control list stored on a Type
///
/// When `activated` is false the type is open to every authenticated user.
/// Otherwise a user is granted exactly the permissions listed for their group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeAcl {
    #[serde(default)]
    pub activated: bool,
    #[serde(default)]
    pub groups: BTreeMap<GroupId, Vec<Permission>>,
}

impl TypeAcl {
    /// An activated ACL granting the given permissions to one group
    pub fn granting(group_id: GroupId, permissions: Vec<Permission>) -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(group_id, permissions);
        Self {
            activated: true,
            groups,
        }
    }

    /// Check whether a group holds a permission under this ACL
    pub fn grants(&self, group_id: GroupId, permission: Permission) -> bool {
        if !self.activated {
            return true;
        }
        self.groups
            .get(&group_id)
            .is_some_and(|perms| perms.contains(&permission))
    }
}
