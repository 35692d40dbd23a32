//! Mock Slack API client for testing
//!
//! Provides a scripted implementation of the API traits for unit testing
//! without making real API calls.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};

use super::api::{AuthApi, ConversationScope, ConversationsApi, UsersApi};
use super::models::{AuthInfo, Conversation, User};
use super::pagination::{CursorPage, CursorParams};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// Pages are served in order; page `n` is reached with the cursor `page-n`.
///
/// # Example
/// ```ignore
/// let mock = MockSlackClient::new()
///     .with_member_pages(vec![vec![channel("C1", "general", true)]])
///     .await;
///
/// let page = mock.list_conversations(ConversationScope::MemberOnly, &CursorParams::new()).await?;
/// assert_eq!(page.items.len(), 1);
/// ```
#[derive(Default)]
pub struct MockSlackClient {
    /// Pages served for `ConversationScope::MemberOnly`
    member_pages: Arc<Mutex<Vec<Vec<Conversation>>>>,
    /// Pages served for `ConversationScope::All`
    all_pages: Arc<Mutex<Vec<Vec<Conversation>>>>,
    /// Pages served by `list_users`
    user_pages: Arc<Mutex<Vec<Vec<User>>>>,
    /// Conversations available to `get_conversation`
    lookup: Arc<Mutex<HashMap<String, Conversation>>>,
    /// One-shot errors keyed by (scope, page index), consumed in order
    page_errors: Arc<Mutex<HashMap<(ConversationScope, usize), VecDeque<ApiError>>>>,
    /// Error returned by every `list_users` call
    users_error: Arc<Mutex<Option<ApiError>>>,
    /// When set, conversation list calls wait for a permit before answering
    gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Captured requests for test assertions
    captured_requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub auth_test: usize,
    pub list_member: usize,
    pub list_all: usize,
    pub get_conversation: usize,
    pub list_users: usize,
}

impl CallCounts {
    /// Get total number of API calls made.
    pub fn total(&self) -> usize {
        self.auth_test + self.list_member + self.list_all + self.get_conversation + self.list_users
    }
}

/// A captured conversation list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    pub scope: ConversationScope,
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

fn page_index(params: &CursorParams) -> usize {
    params
        .cursor
        .as_deref()
        .and_then(|c| c.strip_prefix("page-"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

fn page_at<T: Clone>(pages: &[Vec<T>], idx: usize) -> CursorPage<T> {
    let items = pages.get(idx).cloned().unwrap_or_default();
    if idx + 1 < pages.len() {
        CursorPage::with_cursor(items, format!("page-{}", idx + 1))
    } else {
        CursorPage::last(items)
    }
}

impl MockSlackClient {
    /// Create a new mock client with empty responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the member-scope pages.
    pub async fn with_member_pages(self, pages: Vec<Vec<Conversation>>) -> Self {
        *self.member_pages.lock().await = pages;
        self
    }

    /// Configure the all-scope pages.
    pub async fn with_all_pages(self, pages: Vec<Vec<Conversation>>) -> Self {
        *self.all_pages.lock().await = pages;
        self
    }

    /// Configure the user directory pages.
    pub async fn with_user_pages(self, pages: Vec<Vec<User>>) -> Self {
        *self.user_pages.lock().await = pages;
        self
    }

    /// Make a conversation available to `get_conversation`.
    pub async fn with_lookup(self, conv: Conversation) -> Self {
        self.lookup.lock().await.insert(conv.id.clone(), conv);
        self
    }

    /// Fail the request for page `idx` of `scope` once with `error`.
    ///
    /// Queue several errors for the same page by calling this repeatedly.
    pub async fn with_page_error(
        self,
        scope: ConversationScope,
        idx: usize,
        error: ApiError,
    ) -> Self {
        self.page_errors
            .lock()
            .await
            .entry((scope, idx))
            .or_default()
            .push_back(error);
        self
    }

    /// Make every `list_users` call fail.
    pub async fn with_users_error(self, error: ApiError) -> Self {
        *self.users_error.lock().await = Some(error);
        self
    }

    /// Hold conversation list calls until [`release`](Self::release) is called.
    pub async fn gated(self) -> Self {
        *self.gate.lock().await = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let `n` held list calls proceed.
    pub async fn release(&self, n: usize) {
        if let Some(ref gate) = *self.gate.lock().await {
            gate.add_permits(n);
        }
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Get all captured list requests.
    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.captured_requests.lock().await.clone()
    }

    async fn wait_for_gate(&self) {
        let gate = self.gate.lock().await.clone();
        if let Some(gate) = gate
            && let Ok(permit) = gate.acquire().await
        {
            permit.forget();
        }
    }
}

// ============================================================================
// AuthApi Implementation
// ============================================================================

#[async_trait]
impl AuthApi for MockSlackClient {
    async fn auth_test(&self) -> Result<AuthInfo> {
        self.call_count.lock().await.auth_test += 1;

        Ok(AuthInfo {
            url: "https://mock.slack.com/".to_string(),
            team: "Mock Workspace".to_string(),
            user: "mock-user".to_string(),
            team_id: "T0000000001".to_string(),
            user_id: "U0000000001".to_string(),
        })
    }
}

// ============================================================================
// ConversationsApi Implementation
// ============================================================================

#[async_trait]
impl ConversationsApi for MockSlackClient {
    async fn list_conversations(
        &self,
        scope: ConversationScope,
        params: &CursorParams,
    ) -> Result<CursorPage<Conversation>> {
        self.wait_for_gate().await;

        {
            let mut counts = self.call_count.lock().await;
            match scope {
                ConversationScope::MemberOnly => counts.list_member += 1,
                ConversationScope::All => counts.list_all += 1,
            }
        }
        self.captured_requests.lock().await.push(CapturedRequest {
            scope,
            cursor: params.cursor.clone(),
            limit: params.limit,
        });

        let idx = page_index(params);

        if let Some(queue) = self.page_errors.lock().await.get_mut(&(scope, idx))
            && let Some(err) = queue.pop_front()
        {
            return Err(err.into());
        }

        let pages = match scope {
            ConversationScope::MemberOnly => self.member_pages.lock().await,
            ConversationScope::All => self.all_pages.lock().await,
        };
        Ok(page_at(&pages, idx))
    }

    async fn get_conversation(&self, id: &str) -> Result<Conversation> {
        self.call_count.lock().await.get_conversation += 1;

        self.lookup
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("channel {}", id)).into())
    }
}

// ============================================================================
// UsersApi Implementation
// ============================================================================

#[async_trait]
impl UsersApi for MockSlackClient {
    async fn list_users(&self, params: &CursorParams) -> Result<CursorPage<User>> {
        self.call_count.lock().await.list_users += 1;

        if let Some(ref err) = *self.users_error.lock().await {
            return Err(err.clone().into());
        }

        let pages = self.user_pages.lock().await;
        Ok(page_at(&pages, page_index(params)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::channel;

    #[tokio::test]
    async fn test_mock_serves_pages_in_cursor_order() {
        let mock = MockSlackClient::new()
            .with_all_pages(vec![
                vec![channel("C0000000001", "a", false)],
                vec![channel("C0000000002", "b", false)],
            ])
            .await;

        let first = mock
            .list_conversations(ConversationScope::All, &CursorParams::new())
            .await
            .unwrap();
        assert_eq!(first.next_cursor.as_deref(), Some("page-1"));

        let second = mock
            .list_conversations(
                ConversationScope::All,
                &CursorParams::new().cursor("page-1"),
            )
            .await
            .unwrap();
        assert_eq!(second.items[0].id, "C0000000002");
        assert!(!second.has_next_page());

        assert_eq!(mock.call_counts().await.list_all, 2);
    }

    #[tokio::test]
    async fn test_mock_page_error_consumed_once() {
        let mock = MockSlackClient::new()
            .with_member_pages(vec![vec![channel("C0000000001", "a", true)]])
            .await
            .with_page_error(
                ConversationScope::MemberOnly,
                0,
                ApiError::ServerError("boom".to_string()),
            )
            .await;

        let params = CursorParams::new();
        assert!(
            mock.list_conversations(ConversationScope::MemberOnly, &params)
                .await
                .is_err()
        );
        assert!(
            mock.list_conversations(ConversationScope::MemberOnly, &params)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_mock_get_conversation_not_found() {
        let mock = MockSlackClient::new();
        let result = mock.get_conversation("C0000000009").await;
        assert!(matches!(
            result,
            Err(crate::error::Error::Api(ApiError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_mock_empty_scope_is_single_empty_page() {
        let mock = MockSlackClient::new();
        let page = mock
            .list_conversations(ConversationScope::All, &CursorParams::new())
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_next_page());
        assert_eq!(mock.call_counts().await.total(), 1);
    }
}
