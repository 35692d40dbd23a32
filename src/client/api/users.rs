//! Users API trait

use async_trait::async_trait;

use crate::client::models::User;
use crate::client::pagination::{CursorPage, CursorParams};
use crate::error::Result;

/// Workspace user operations
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// Fetch one page of workspace users (`users.list`)
    async fn list_users(&self, params: &CursorParams) -> Result<CursorPage<User>>;
}
