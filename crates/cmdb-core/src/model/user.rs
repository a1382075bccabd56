use serde::{Deserialize, Serialize};

use super::{GroupId, UserId};

/// A CMDB user as seen by the render engine
///
/// Only the parts needed for display names and ACL checks are modelled;
/// credentials and the rest of user management live elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub public_id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub group_id: GroupId,
}

impl User {
    pub fn new(public_id: UserId, user_name: impl Into<String>, group_id: GroupId) -> Self {
        Self {
            public_id,
            user_name: user_name.into(),
            first_name: None,
            last_name: None,
            group_id,
        }
    }

    /// Name shown as author/editor: "first last" when both are set, else the login name
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                format!("{} {}", first, last)
            }
            _ => self.user_name.clone(),
        }
    }
}
