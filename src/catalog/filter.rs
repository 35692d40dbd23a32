//! Standard listing filter over catalog entries

use std::str::FromStr;

use clap::ValueEnum;

use super::entry::{CatalogEntry, ChannelKind};

/// Which kinds of conversation a listing includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum KindFilter {
    #[default]
    All,
    Public,
    Private,
    Dm,
    GroupDm,
    /// Only conversations the user belongs to
    Member,
}

impl FromStr for KindFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

/// Listing filter: kind, substring search and archived handling.
#[derive(Debug, Clone, Default)]
pub struct ChannelFilter {
    pub kind: KindFilter,
    /// Case-insensitive substring of name or purpose
    pub search: Option<String>,
    pub include_archived: bool,
}

impl ChannelFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: KindFilter) -> Self {
        self.kind = kind;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = (!term.trim().is_empty()).then(|| term.trim().to_lowercase());
        self
    }

    pub fn include_archived(mut self, include: bool) -> Self {
        self.include_archived = include;
        self
    }

    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        if entry.is_archived && !self.include_archived {
            return false;
        }

        let kind_ok = match self.kind {
            KindFilter::All => true,
            KindFilter::Public => entry.kind == ChannelKind::Public,
            KindFilter::Private => entry.kind == ChannelKind::Private,
            KindFilter::Dm => entry.kind == ChannelKind::DirectMessage,
            KindFilter::GroupDm => entry.kind == ChannelKind::GroupDirectMessage,
            KindFilter::Member => entry.is_member,
        };
        if !kind_ok {
            return false;
        }

        match &self.search {
            None => true,
            Some(term) => {
                entry.name.to_lowercase().contains(term.as_str())
                    || entry
                        .metadata
                        .purpose
                        .as_deref()
                        .is_some_and(|p| p.to_lowercase().contains(term.as_str()))
            }
        }
    }
}
