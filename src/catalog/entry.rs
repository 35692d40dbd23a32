//! Catalog entry model and name normalization

use serde::{Deserialize, Serialize};

use crate::client::Conversation;

/// Kind of conversation a catalog entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelKind {
    Public,
    Private,
    DirectMessage,
    GroupDirectMessage,
}

impl ChannelKind {
    /// Short label used in tables.
    pub fn label(&self) -> &'static str {
        match self {
            ChannelKind::Public => "public",
            ChannelKind::Private => "private",
            ChannelKind::DirectMessage => "dm",
            ChannelKind::GroupDirectMessage => "group-dm",
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(
            self,
            ChannelKind::DirectMessage | ChannelKind::GroupDirectMessage
        )
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Display-only details carried alongside an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u32>,
}

/// One channel or conversation in the workspace catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    /// Channel name; empty for direct messages.
    #[serde(default)]
    pub name: String,
    pub kind: ChannelKind,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub is_archived: bool,
    /// Counterpart user id for a direct message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default)]
    pub metadata: EntryMetadata,
}

impl CatalogEntry {
    #[cfg(test)]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            is_member: false,
            is_archived: false,
            user: None,
            metadata: EntryMetadata::default(),
        }
    }

    /// Name as a person would type it: `#general` for channels, the bare
    /// name otherwise, falling back to the id.
    pub fn display_name(&self) -> String {
        match self.kind {
            ChannelKind::Public | ChannelKind::Private if !self.name.is_empty() => {
                format!("#{}", self.name)
            }
            _ if !self.name.is_empty() => self.name.clone(),
            _ => self.id.clone(),
        }
    }
}

impl From<Conversation> for CatalogEntry {
    fn from(conv: Conversation) -> Self {
        let kind = if conv.is_im {
            ChannelKind::DirectMessage
        } else if conv.is_mpim {
            ChannelKind::GroupDirectMessage
        } else if conv.is_private || conv.is_group {
            ChannelKind::Private
        } else {
            ChannelKind::Public
        };

        let non_empty = |text: Option<crate::client::models::TextValue>| {
            text.map(|t| t.value).filter(|v| !v.is_empty())
        };

        Self {
            id: conv.id,
            name: conv.name,
            kind,
            is_member: conv.is_member,
            is_archived: conv.is_archived,
            user: conv.user,
            metadata: EntryMetadata {
                topic: non_empty(conv.topic),
                purpose: non_empty(conv.purpose),
                member_count: conv.num_members,
            },
        }
    }
}

/// Whether `input` already has the shape of a Slack conversation id.
///
/// `C`, `D` or `G` followed by uppercase letters and digits, at least
/// nine characters in total.
pub fn is_conversation_id(input: &str) -> bool {
    let mut chars = input.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    matches!(first, 'C' | 'D' | 'G')
        && input.len() >= 9
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Strip a leading `#` or `@` and surrounding whitespace.
pub fn strip_sigil(input: &str) -> &str {
    let trimmed = input.trim();
    trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix('@'))
        .unwrap_or(trimmed)
        .trim()
}

/// Key used in the name index: sigil stripped and case-folded.
pub fn normalize_name(input: &str) -> String {
    strip_sigil(input).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::ConversationBuilder;

    #[test]
    fn test_id_shape_accepts_channel_ids() {
        assert!(is_conversation_id("C0123456789"));
        assert!(is_conversation_id("D0ABCDEF12"));
        assert!(is_conversation_id("G01234567"));
    }

    #[test]
    fn test_id_shape_rejects_names() {
        assert!(!is_conversation_id("general"));
        assert!(!is_conversation_id("Cats-and-dogs"));
        assert!(!is_conversation_id("C012"));
        assert!(!is_conversation_id("CHANNELS1a"));
        assert!(!is_conversation_id("U0123456789"));
        assert!(!is_conversation_id(""));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("#General"), "general");
        assert_eq!(normalize_name("  @Ada "), "ada");
        assert_eq!(normalize_name("dev-ops"), "dev-ops");
    }

    #[test]
    fn test_from_public_conversation() {
        let conv = ConversationBuilder::channel("C0000000001", "general")
            .member(true)
            .topic("Company-wide")
            .purpose("")
            .num_members(42)
            .build();

        let entry = CatalogEntry::from(conv);

        assert_eq!(entry.kind, ChannelKind::Public);
        assert!(entry.is_member);
        assert_eq!(entry.metadata.topic.as_deref(), Some("Company-wide"));
        assert_eq!(entry.metadata.purpose, None);
        assert_eq!(entry.metadata.member_count, Some(42));
        assert_eq!(entry.display_name(), "#general");
    }

    #[test]
    fn test_from_private_and_direct_conversations() {
        let private =
            CatalogEntry::from(ConversationBuilder::private("G0000000001", "secret").build());
        assert_eq!(private.kind, ChannelKind::Private);

        let dm =
            CatalogEntry::from(ConversationBuilder::dm("D0000000001", "U0000000001").build());
        assert_eq!(dm.kind, ChannelKind::DirectMessage);
        assert_eq!(dm.user.as_deref(), Some("U0000000001"));
        assert_eq!(dm.display_name(), "D0000000001");

        let group = CatalogEntry::from(
            ConversationBuilder::group_dm("G0000000002", "mpdm-ada--bob-1").build(),
        );
        assert_eq!(group.kind, ChannelKind::GroupDirectMessage);
        assert!(group.kind.is_direct());
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ChannelKind::GroupDirectMessage).unwrap();
        assert_eq!(json, "\"group-direct-message\"");
    }
}
