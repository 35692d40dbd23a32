//! Display model implementations for table and JSON output
//!
//! Display models transform catalog types into CLI-friendly formats
//! with appropriate column names and serialization.

mod channel;
mod common;

pub use channel::{ChannelDisplay, ResolveDisplay};
pub use common::truncate_string;
