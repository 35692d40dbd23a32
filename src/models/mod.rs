//! Display models for CLI output
//!
//! Converts catalog types into table rows and JSON records.

pub mod display;

pub use display::{ChannelDisplay, ResolveDisplay};
