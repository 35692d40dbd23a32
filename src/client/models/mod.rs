//! Slack Web API data models
//!
//! Only the fields the catalog and user directory consume are modelled;
//! unknown fields are ignored on deserialization.

mod auth;
mod conversation;
mod user;

pub use auth::AuthInfo;
pub use conversation::{Conversation, TextValue};
pub use user::User;
