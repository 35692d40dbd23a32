//! Conversation (channel, group, DM) model

use serde::{Deserialize, Serialize};

/// A `{ "value": … }` text block such as a topic or purpose
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    #[serde(default)]
    pub value: String,
}

/// Conversation object from `conversations.list`, `users.conversations`
/// and `conversations.info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation ID (`C…`, `G…` or `D…`)
    pub id: String,

    /// Channel name; empty for direct messages
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub is_channel: bool,

    #[serde(default)]
    pub is_group: bool,

    #[serde(default)]
    pub is_im: bool,

    #[serde(default)]
    pub is_mpim: bool,

    #[serde(default)]
    pub is_private: bool,

    #[serde(default)]
    pub is_archived: bool,

    /// Absent on some list responses; treated as false
    #[serde(default)]
    pub is_member: bool,

    /// Counterpart user of a direct message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<TextValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<TextValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_members: Option<u32>,
}
