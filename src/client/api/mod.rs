//! API trait definitions split by responsibility
//!
//! - [`AuthApi`] - token validation
//! - [`ConversationsApi`] - channel catalog listing and lookup
//! - [`UsersApi`] - workspace user directory
//!
//! The [`SlackApi`](super::SlackApi) super-trait combines all three.

mod auth;
mod conversations;
mod users;

pub use auth::AuthApi;
pub use conversations::{ConversationScope, ConversationsApi};
pub use users::UsersApi;
