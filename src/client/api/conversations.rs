//! Conversations API trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::models::Conversation;
use crate::client::pagination::{CursorPage, CursorParams};
use crate::error::Result;

/// Which subset of the workspace's conversations a list call covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationScope {
    /// Conversations the authenticated identity is a member of
    MemberOnly,
    /// Every conversation visible to the credential
    All,
}

impl std::fmt::Display for ConversationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationScope::MemberOnly => write!(f, "member"),
            ConversationScope::All => write!(f, "all"),
        }
    }
}

/// Conversation listing and lookup
#[async_trait]
pub trait ConversationsApi: Send + Sync {
    /// Fetch one page of conversations in `scope`.
    ///
    /// `MemberOnly` maps to `users.conversations`, `All` to `conversations.list`.
    async fn list_conversations(
        &self,
        scope: ConversationScope,
        params: &CursorParams,
    ) -> Result<CursorPage<Conversation>>;

    /// Fetch a single conversation by ID (`conversations.info`)
    async fn get_conversation(&self, id: &str) -> Result<Conversation>;
}
