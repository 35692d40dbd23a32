//! Workspace user model

use serde::{Deserialize, Serialize};

/// Workspace member as returned by `users.list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID (`U…` or `W…`)
    pub id: String,

    /// Handle
    #[serde(default)]
    pub name: String,

    /// Full display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,

    /// Whether the account is deactivated
    #[serde(default)]
    pub deleted: bool,

    /// Whether this is a bot user
    #[serde(default)]
    pub is_bot: bool,
}

impl User {
    /// Best human-readable name: real name when set, otherwise the handle.
    pub fn display_name(&self) -> &str {
        match self.real_name.as_deref() {
            Some(real) if !real.is_empty() => real,
            _ => &self.name,
        }
    }
}
