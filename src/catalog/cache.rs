//! Shared catalog state: the index and the refresh bookkeeping
//!
//! Readers take a short read lock and copy out what they need; a page is
//! applied under one write lock so readers never see it half-applied.

use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info};
use tokio::time::Instant;

use super::entry::CatalogEntry;
use super::index::CatalogIndex;
use super::limiter::{RefreshDecision, RefreshState};
use super::snapshot::SnapshotStore;
use super::users::UserDirectory;
use crate::client::ConversationScope;
use crate::config::RefreshPolicy;

/// Channel catalog held in memory for the life of the process.
#[derive(Debug, Default)]
pub struct CatalogCache {
    index: RwLock<CatalogIndex>,
    refresh: Mutex<RefreshState>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogIndex> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_refresh<R>(&self, f: impl FnOnce(&mut RefreshState) -> R) -> R {
        let mut state = self.refresh.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Seed the index from a snapshot. Returns the number of entries loaded.
    ///
    /// Any load failure leaves the index empty; the caller proceeds as a
    /// cold start.
    pub fn warm_start(&self, store: &SnapshotStore, users: &UserDirectory) -> usize {
        match store.load::<CatalogEntry>() {
            Ok(entries) => {
                let count = entries.len();
                // Saved membership flags are kept as-is
                self.ingest(entries, ConversationScope::All, users);
                self.mark_refreshed(Instant::now());
                info!("Warm start with {} catalog entries", count);
                count
            }
            Err(e) => {
                debug!("No usable catalog snapshot ({}), cold start", e);
                0
            }
        }
    }

    /// Apply one page of entries observed in a fetch of `scope`.
    pub fn ingest(
        &self,
        entries: Vec<CatalogEntry>,
        scope: ConversationScope,
        users: &UserDirectory,
    ) {
        // Resolve DM names before taking the write lock
        let dm_aliases: Vec<(String, Vec<String>)> = entries
            .iter()
            .filter_map(|e| e.user.as_deref().map(|u| (e.id.clone(), users.aliases_for(u))))
            .filter(|(_, aliases)| !aliases.is_empty())
            .collect();

        let mut index = self.write();
        for entry in entries {
            index.upsert(entry, scope);
        }
        for (id, aliases) in dm_aliases {
            for alias in aliases {
                index.claim_alias(&alias, &id);
            }
        }
    }

    /// Give every known direct message its counterpart's names.
    pub fn backfill_dm_aliases(&self, users: &UserDirectory) -> usize {
        let dms: Vec<(String, String)> = self
            .read()
            .entries()
            .filter_map(|e| e.user.clone().map(|u| (e.id.clone(), u)))
            .collect();

        let mut claimed = 0;
        let aliases: Vec<(String, Vec<String>)> = dms
            .into_iter()
            .map(|(id, user)| (id, users.aliases_for(&user)))
            .collect();

        let mut index = self.write();
        for (id, names) in aliases {
            for name in names {
                if index.claim_alias(&name, &id) {
                    claimed += 1;
                }
            }
        }
        claimed
    }

    /// Copy of every entry, sorted by display name.
    pub fn snapshot(&self) -> Vec<CatalogEntry> {
        self.read().to_vec()
    }

    /// Entries matching `pred`, sorted by display name.
    pub fn filter(&self, pred: impl Fn(&CatalogEntry) -> bool) -> Vec<CatalogEntry> {
        let mut entries: Vec<CatalogEntry> =
            self.read().entries().filter(|e| pred(e)).cloned().collect();
        entries.sort_by_key(|e| (e.display_name().to_lowercase(), e.id.clone()));
        entries
    }

    /// Number of entries matching `pred`, without copying any of them.
    pub fn count(&self, pred: impl Fn(&CatalogEntry) -> bool) -> usize {
        self.read().entries().filter(|e| pred(e)).count()
    }

    pub fn get(&self, id: &str) -> Option<CatalogEntry> {
        self.read().get(id).cloned()
    }

    /// Id for a name: exact alias key first, then case-folded.
    pub fn lookup_name(&self, name: &str) -> Option<String> {
        let index = self.read();
        index
            .alias(name)
            .or_else(|| index.lookup_name(name))
            .map(str::to_string)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn mark_refreshed(&self, now: Instant) {
        self.with_refresh(|state| state.mark_refreshed(now));
    }

    /// Run the manual refresh limiter at `now`.
    pub fn evaluate_refresh(&self, policy: &RefreshPolicy, now: Instant) -> RefreshDecision {
        self.with_refresh(|state| state.evaluate(policy, now))
    }

    pub fn refresh_state(&self) -> RefreshState {
        self.with_refresh(|state| state.clone())
    }
}
