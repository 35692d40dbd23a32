//! Progressive channel catalog
//!
//! Keeps every channel, private group and DM the token can see in memory so
//! that commands can turn `#general` into `C0123456789` without an API call.
//! The catalog starts from the last snapshot on disk, then fills in from
//! Slack in the background: member channels first, everything else after.
//!
//! # Architecture
//!
//! ```text
//! ChannelCatalog (resolve.rs)  ── read-only lookups, fetch-by-id fallback
//!        │
//!        ├── CatalogCache (cache.rs) ── index + refresh state behind locks
//!        │
//!        └── RefreshCoordinator (refresh.rs) ── background population
//!                 ├── CatalogFetcher (fetcher.rs) ── paging + retry
//!                 └── SnapshotStore (snapshot.rs) ── JSON files on disk
//! ```

pub mod cache;
pub mod entry;
pub mod fetcher;
pub mod filter;
pub mod index;
pub mod limiter;
pub mod refresh;
pub mod resolve;
pub mod snapshot;
pub mod users;

pub use entry::CatalogEntry;
#[cfg(test)]
pub use entry::ChannelKind;
pub use filter::{ChannelFilter, KindFilter};
pub use limiter::RefreshDecision;
pub use refresh::{CatalogStores, PopulationStatus};
pub use resolve::{CacheInfo, ChannelCatalog, Startup};
pub use snapshot::{SnapshotInfo, SnapshotStore};
