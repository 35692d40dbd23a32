//! Result limiting for list commands

use clap::Args;

/// Largest listing a single command prints.
pub const MAX_LIMIT: usize = 500;

/// Shared limit argument for list commands.
///
/// Flatten this into any command that prints a list:
/// ```ignore
/// List {
///     #[command(flatten)]
///     limit: LimitArgs,
/// }
/// ```
#[derive(Args, Debug, Default, Clone)]
pub struct LimitArgs {
    /// Maximum results to return (at most 500)
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

impl LimitArgs {
    /// Effective limit: the requested one clamped to 1..=500, or 500.
    pub fn effective(&self) -> usize {
        self.limit.unwrap_or(MAX_LIMIT).clamp(1, MAX_LIMIT)
    }
}
