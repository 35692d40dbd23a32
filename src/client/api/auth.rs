//! Authentication API trait

use async_trait::async_trait;

use crate::client::models::AuthInfo;
use crate::error::Result;

/// Authentication operations for the Slack Web API
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Validate the configured credentials (`auth.test`)
    async fn auth_test(&self) -> Result<AuthInfo>;
}
