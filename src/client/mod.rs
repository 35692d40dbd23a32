//! Slack Web API client

pub mod api;
#[cfg(test)]
pub mod fixtures;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod pagination;
pub mod parallel;
pub mod rate_limit;
pub mod slack;

pub use api::{AuthApi, ConversationScope, ConversationsApi, UsersApi};
#[cfg(test)]
pub use mock::MockSlackClient;
pub use models::{Conversation, User};
pub use pagination::{CursorPage, CursorParams};
pub use parallel::fetch_concurrently;
pub use slack::SlackClient;

/// Full Slack API surface used by slackop.
///
/// Implemented automatically for anything providing the three sub-traits.
pub trait SlackApi: AuthApi + ConversationsApi + UsersApi {}

impl<T: AuthApi + ConversationsApi + UsersApi> SlackApi for T {}
