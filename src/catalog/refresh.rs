//! Background population of the catalog
//!
//! Population runs the member-scoped phase first so the channels a person
//! actually uses resolve quickly, then walks the whole workspace. Each page
//! is ingested as soon as it arrives. Upstream failures end a phase but
//! never reach readers of the catalog.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;

use super::cache::CatalogCache;
use super::entry::CatalogEntry;
use super::fetcher::CatalogFetcher;
use super::limiter::RefreshDecision;
use super::snapshot::SnapshotStore;
use super::users::UserDirectory;
use crate::client::{ConversationScope, SlackApi, User};
use crate::config::CatalogSettings;

/// Where the population task currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationStatus {
    /// Never started (offline, or not launched yet)
    Idle,
    MemberPhase,
    FullPhase,
    Complete,
}

impl PopulationStatus {
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            PopulationStatus::MemberPhase | PopulationStatus::FullPhase
        )
    }
}

impl std::fmt::Display for PopulationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PopulationStatus::Idle => "idle",
            PopulationStatus::MemberPhase => "loading member channels",
            PopulationStatus::FullPhase => "loading all channels",
            PopulationStatus::Complete => "complete",
        };
        write!(f, "{}", label)
    }
}

/// Counts for one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseReport {
    pub pages: usize,
    pub entries: usize,
    pub completed: bool,
}

/// Counts for one full population run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PopulationReport {
    pub users_loaded: usize,
    pub member: PhaseReport,
    pub full: PhaseReport,
    pub snapshot_saved: bool,
}

/// Snapshot files the coordinator reads and writes.
#[derive(Debug, Clone)]
pub struct CatalogStores {
    pub channels: SnapshotStore,
    pub users: SnapshotStore,
}

impl CatalogStores {
    pub fn in_dir(cache_dir: &std::path::Path) -> Self {
        Self {
            channels: SnapshotStore::channels(cache_dir),
            users: SnapshotStore::users(cache_dir),
        }
    }
}

/// Runs population passes against a shared [`CatalogCache`].
///
/// At most one pass is active; a pass requested while one is running is
/// queued and runs once the active one finishes.
pub struct RefreshCoordinator<C> {
    cache: Arc<CatalogCache>,
    users: Arc<UserDirectory>,
    fetcher: CatalogFetcher<C>,
    stores: Option<CatalogStores>,
    settings: CatalogSettings,
    status: watch::Sender<PopulationStatus>,
    active: AtomicBool,
    rerun: AtomicBool,
}

impl<C: SlackApi + 'static> RefreshCoordinator<C> {
    pub fn new(
        cache: Arc<CatalogCache>,
        users: Arc<UserDirectory>,
        fetcher: CatalogFetcher<C>,
        stores: Option<CatalogStores>,
        settings: CatalogSettings,
    ) -> Self {
        let (status, _) = watch::channel(PopulationStatus::Idle);
        Self {
            cache,
            users,
            fetcher,
            stores,
            settings,
            status,
            active: AtomicBool::new(false),
            rerun: AtomicBool::new(false),
        }
    }

    pub fn fetcher(&self) -> &CatalogFetcher<C> {
        &self.fetcher
    }

    pub fn status(&self) -> PopulationStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PopulationStatus> {
        self.status.subscribe()
    }

    /// Start a background population pass.
    ///
    /// Returns `false` when a pass was already running; a rerun is queued
    /// instead.
    pub fn launch(self: &Arc<Self>) -> bool {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Population already running, queueing a rerun");
            self.rerun.store(true, Ordering::SeqCst);
            return false;
        }

        self.status.send_replace(PopulationStatus::MemberPhase);
        let this = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                this.populate().await;

                if this.rerun.swap(false, Ordering::SeqCst) {
                    continue;
                }
                this.active.store(false, Ordering::SeqCst);

                // A launch between the swap and the store queued a rerun
                // but saw us as active
                if this.rerun.swap(false, Ordering::SeqCst)
                    && this
                        .active
                        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                        .is_ok()
                {
                    continue;
                }
                break;
            }
        });
        true
    }

    /// Ask for an operator refresh; launches a pass when allowed.
    pub fn request_refresh(self: &Arc<Self>) -> RefreshDecision {
        self.request_refresh_at(Instant::now())
    }

    pub fn request_refresh_at(self: &Arc<Self>, now: Instant) -> RefreshDecision {
        let decision = self.cache.evaluate_refresh(&self.settings.refresh, now);
        match decision {
            RefreshDecision::Allowed => {
                info!("Manual refresh approved");
                self.launch();
            }
            RefreshDecision::Denied { retry_after } => {
                info!("Manual refresh denied, retry in {:?}", retry_after);
            }
        }
        decision
    }

    /// Wait until no pass is running.
    ///
    /// Returns immediately when population was never launched.
    pub async fn wait_until_idle(&self) -> PopulationStatus {
        let mut rx = self.subscribe();
        match rx.wait_for(|s| !s.is_running()).await {
            Ok(status) => *status,
            // Sender lives in self, so this cannot close while we hold &self
            Err(_) => self.status(),
        }
    }

    /// One full pass: users (once), member phase, full phase, snapshot.
    pub async fn populate(&self) -> PopulationReport {
        let started = Instant::now();
        let mut report = PopulationReport {
            users_loaded: self.ensure_users().await,
            ..Default::default()
        };

        self.status.send_replace(PopulationStatus::MemberPhase);
        report.member = self.run_phase(ConversationScope::MemberOnly).await;

        self.status.send_replace(PopulationStatus::FullPhase);
        report.full = self.run_phase(ConversationScope::All).await;

        if report.full.completed {
            self.cache.mark_refreshed(Instant::now());
            report.snapshot_saved = self.persist_catalog();
        }

        self.status.send_replace(PopulationStatus::Complete);
        info!(
            "Population finished in {:?}: member {} pages/{} entries{}, all {} pages/{} entries{}, {} cached",
            started.elapsed(),
            report.member.pages,
            report.member.entries,
            if report.member.completed { "" } else { " (aborted)" },
            report.full.pages,
            report.full.entries,
            if report.full.completed { "" } else { " (aborted)" },
            self.cache.len()
        );
        report
    }

    async fn run_phase(&self, scope: ConversationScope) -> PhaseReport {
        let mut report = PhaseReport::default();
        let mut cursor: Option<String> = None;

        loop {
            let page = match self
                .fetcher
                .fetch_page_with_retry(cursor.as_deref(), scope)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        "Catalog phase '{}' aborted after {} pages: {}",
                        scope, report.pages, e
                    );
                    return report;
                }
            };

            report.pages += 1;
            report.entries += page.entries.len();
            self.cache.ingest(page.entries, scope, &self.users);
            debug!(
                "Phase '{}' page {}: {} entries so far",
                scope, report.pages, report.entries
            );

            let Some(next) = page.next_cursor else {
                break;
            };
            cursor = Some(next);

            match scope {
                ConversationScope::MemberOnly => {
                    tokio::time::sleep(self.settings.member_page_delay).await;
                }
                ConversationScope::All => {
                    let every = self.settings.full_pause_every;
                    if every > 0 && report.pages % every == 0 {
                        debug!("Pausing {:?} after {} pages", self.settings.full_pause, report.pages);
                        tokio::time::sleep(self.settings.full_pause).await;
                    }
                }
            }
        }

        info!(
            "Catalog phase '{}' complete: {} pages, {} entries",
            scope, report.pages, report.entries
        );
        report.completed = true;
        report
    }

    /// Load the user directory from upstream if it is still empty.
    async fn ensure_users(&self) -> usize {
        if !self.users.is_empty() {
            return 0;
        }

        let mut users: Vec<User> = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            match self.fetcher.fetch_user_page(cursor.as_deref()).await {
                Ok(page) => {
                    users.extend(page.items);
                    match page.next_cursor {
                        Some(next) => cursor = Some(next),
                        None => break,
                    }
                }
                Err(e) => {
                    warn!("Could not load user directory: {}", e);
                    return 0;
                }
            }
        }

        let count = users.len();
        self.users.replace(users);
        if let Some(stores) = &self.stores
            && let Err(e) = stores.users.save(&self.users.all())
        {
            warn!("Failed to save user snapshot: {}", e);
        }
        let claimed = self.cache.backfill_dm_aliases(&self.users);
        debug!("Loaded {} users, {} DM aliases backfilled", count, claimed);
        count
    }

    fn persist_catalog(&self) -> bool {
        let Some(stores) = &self.stores else {
            return false;
        };
        let entries: Vec<CatalogEntry> = self.cache.snapshot();
        match stores.channels.save(&entries) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save catalog snapshot: {}", e);
                false
            }
        }
    }
}
