//! Load-once user directory used to name direct messages

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::client::User;

/// Workspace users by id.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: RwLock<HashMap<String, User>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole directory.
    pub fn replace(&self, users: Vec<User>) {
        let map = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        *self.users.write().unwrap_or_else(PoisonError::into_inner) = map;
    }

    pub fn get(&self, id: &str) -> Option<User> {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.users.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn all(&self) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        users
    }

    /// Names a direct message with `user_id` can be addressed by:
    /// real name first, then handle.
    pub fn aliases_for(&self, user_id: &str) -> Vec<String> {
        let Some(user) = self.get(user_id) else {
            return Vec::new();
        };

        let mut aliases = Vec::with_capacity(2);
        if let Some(real) = user.real_name.filter(|r| !r.is_empty()) {
            aliases.push(real);
        }
        if !user.name.is_empty() && !aliases.contains(&user.name) {
            aliases.push(user.name);
        }
        aliases
    }

    /// Best name for a user, or `None` if unknown.
    pub fn display_name(&self, user_id: &str) -> Option<String> {
        self.get(user_id).map(|u| u.display_name().to_string())
    }
}
