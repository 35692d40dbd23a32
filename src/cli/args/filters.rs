//! Filter argument types for CLI commands

use clap::Args;

use crate::catalog::{ChannelFilter, KindFilter};

/// Filter arguments for `channel list`.
#[derive(Args, Debug, Clone, Default)]
pub struct ChannelFilterArgs {
    /// Conversation type (all, public, private, dm, group-dm, member)
    #[arg(
        long = "type",
        short = 't',
        value_enum,
        default_value = "all",
        hide_possible_values = true
    )]
    pub kind: KindFilter,

    /// Match a substring of the channel name or purpose
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Include archived channels
    #[arg(long)]
    pub include_archived: bool,
}

impl ChannelFilterArgs {
    pub fn to_filter(&self) -> ChannelFilter {
        let filter = ChannelFilter::new()
            .kind(self.kind)
            .include_archived(self.include_archived);
        match &self.search {
            Some(term) => filter.search(term.as_str()),
            None => filter,
        }
    }
}
