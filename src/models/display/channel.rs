//! Channel display models

use serde::Serialize;
use tabled::Tabled;

use super::common::{check, truncate_string};
use crate::catalog::CatalogEntry;

/// Channel row for `channel list` and `channel get`.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ChannelDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    /// `#name` for channels, `@person` for direct messages
    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "TYPE")]
    pub kind: String,

    #[tabled(rename = "MEMBER")]
    #[serde(skip)]
    pub member_mark: String,

    #[tabled(skip)]
    pub is_member: bool,

    #[tabled(skip)]
    pub is_archived: bool,

    #[tabled(rename = "MEMBERS")]
    pub members: String,

    #[tabled(rename = "PURPOSE")]
    pub purpose: String,
}

impl ChannelDisplay {
    /// Build a row from an entry and the label the catalog gives it.
    pub fn new(entry: &CatalogEntry, label: String) -> Self {
        let kind = if entry.is_archived {
            format!("{} (archived)", entry.kind)
        } else {
            entry.kind.to_string()
        };

        Self {
            id: entry.id.clone(),
            name: label,
            kind,
            member_mark: check(entry.is_member),
            is_member: entry.is_member,
            is_archived: entry.is_archived,
            members: entry
                .metadata
                .member_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "--".to_string()),
            purpose: entry
                .metadata
                .purpose
                .as_deref()
                .map(|p| truncate_string(p, 50))
                .unwrap_or_default(),
        }
    }
}

impl From<&CatalogEntry> for ChannelDisplay {
    fn from(entry: &CatalogEntry) -> Self {
        Self::new(entry, entry.display_name())
    }
}

/// Result row for `channel resolve`.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ResolveDisplay {
    #[tabled(rename = "INPUT")]
    pub input: String,

    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    /// Whether the id came from the local catalog
    #[tabled(rename = "KNOWN")]
    #[serde(skip)]
    pub known_mark: String,

    #[tabled(skip)]
    pub known: bool,
}

impl ResolveDisplay {
    pub fn new(input: &str, id: String, name: Option<String>) -> Self {
        let known = name.is_some();
        Self {
            input: input.to_string(),
            id,
            name: name.unwrap_or_else(|| "--".to_string()),
            known_mark: check(known),
            known,
        }
    }
}
