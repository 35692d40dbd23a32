//! Authentication models

use serde::{Deserialize, Serialize};

/// Identity returned by `auth.test`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthInfo {
    /// Workspace URL, e.g. `https://acme.slack.com/`
    #[serde(default)]
    pub url: String,

    /// Workspace name
    #[serde(default)]
    pub team: String,

    /// Handle of the authenticated user
    #[serde(default)]
    pub user: String,

    /// Workspace ID
    #[serde(default)]
    pub team_id: String,

    /// ID of the authenticated user
    #[serde(default)]
    pub user_id: String,
}
