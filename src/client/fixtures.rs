//! Test fixtures and builders for API model types
//!
//! Import via `use crate::client::fixtures::*` in test modules.

#![allow(dead_code)]

use super::models::{Conversation, TextValue, User};

// ============================================================================
// ConversationBuilder
// ============================================================================

/// Builder for test [`Conversation`] values.
///
/// # Example
/// ```ignore
/// let conv = ConversationBuilder::channel("C0000000001", "general")
///     .member(true)
///     .purpose("Announcements")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConversationBuilder {
    conv: Conversation,
}

impl ConversationBuilder {
    /// A public channel.
    pub fn channel(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            conv: Conversation {
                id: id.into(),
                name: name.into(),
                is_channel: true,
                ..Conversation::default()
            },
        }
    }

    /// A private channel.
    pub fn private(id: impl Into<String>, name: impl Into<String>) -> Self {
        let mut builder = Self::channel(id, name);
        builder.conv.is_channel = false;
        builder.conv.is_group = true;
        builder.conv.is_private = true;
        builder
    }

    /// A direct message with `user`.
    pub fn dm(id: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            conv: Conversation {
                id: id.into(),
                is_im: true,
                is_private: true,
                user: Some(user.into()),
                ..Conversation::default()
            },
        }
    }

    /// A multi-party direct message.
    pub fn group_dm(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            conv: Conversation {
                id: id.into(),
                name: name.into(),
                is_mpim: true,
                is_private: true,
                ..Conversation::default()
            },
        }
    }

    pub fn member(mut self, is_member: bool) -> Self {
        self.conv.is_member = is_member;
        self
    }

    pub fn archived(mut self, is_archived: bool) -> Self {
        self.conv.is_archived = is_archived;
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.conv.topic = Some(TextValue {
            value: topic.into(),
        });
        self
    }

    pub fn purpose(mut self, purpose: impl Into<String>) -> Self {
        self.conv.purpose = Some(TextValue {
            value: purpose.into(),
        });
        self
    }

    pub fn num_members(mut self, count: u32) -> Self {
        self.conv.num_members = Some(count);
        self
    }

    pub fn build(self) -> Conversation {
        self.conv
    }
}

/// Shorthand for a public channel with a membership flag.
pub fn channel(id: &str, name: &str, is_member: bool) -> Conversation {
    ConversationBuilder::channel(id, name)
        .member(is_member)
        .build()
}

/// Shorthand for a direct message.
pub fn dm(id: &str, user: &str) -> Conversation {
    ConversationBuilder::dm(id, user).build()
}

/// Shorthand for a user with a handle and real name.
pub fn user(id: &str, name: &str, real_name: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        real_name: if real_name.is_empty() {
            None
        } else {
            Some(real_name.to_string())
        },
        deleted: false,
        is_bot: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_builder() {
        let conv = ConversationBuilder::channel("C0000000001", "general")
            .member(true)
            .purpose("Announcements")
            .num_members(10)
            .build();

        assert!(conv.is_channel);
        assert!(conv.is_member);
        assert!(!conv.is_private);
        assert_eq!(conv.purpose.unwrap().value, "Announcements");
    }

    #[test]
    fn test_private_builder() {
        let conv = ConversationBuilder::private("G0000000001", "secret").build();
        assert!(conv.is_private);
        assert!(conv.is_group);
    }

    #[test]
    fn test_dm_builder() {
        let conv = dm("D0000000001", "U0000000001");
        assert!(conv.is_im);
        assert_eq!(conv.user.as_deref(), Some("U0000000001"));
    }
}
