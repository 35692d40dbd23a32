//! Name-to-id resolution over the catalog
//!
//! [`ChannelCatalog`] is built once per process and handed to every command.
//! Local reads never wait on the network; only the `*_or_fetch` helpers
//! reach upstream, and only for ids the catalog has not seen.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

use super::cache::CatalogCache;
use super::entry::{CatalogEntry, is_conversation_id, strip_sigil};
use super::fetcher::{CatalogFetcher, RetryPolicy};
use super::limiter::RefreshDecision;
use super::refresh::{CatalogStores, PopulationStatus, RefreshCoordinator};
use super::users::UserDirectory;
use crate::client::{ConversationScope, SlackApi, fetch_concurrently};
use crate::config::CatalogSettings;
use crate::error::{ApiError, Result};

/// How to start the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Startup {
    /// Load snapshots, then populate in the background
    Background,
    /// Load snapshots only
    Offline,
    /// Load snapshots only; upstream is reached just for direct lookups
    OnDemand,
    /// Skip the channel snapshot and populate from scratch
    Fresh,
}

/// Operator-facing catalog state.
#[derive(Debug, Clone, Serialize)]
pub struct CacheInfo {
    pub last_refresh: Option<DateTime<Utc>>,
    pub entry_count: usize,
    pub refresh_calls_in_window: u32,
    pub member_count: usize,
    pub user_count: usize,
    pub status: PopulationStatus,
}

/// The channel catalog and its background population.
pub struct ChannelCatalog<C> {
    cache: Arc<CatalogCache>,
    users: Arc<UserDirectory>,
    coordinator: Arc<RefreshCoordinator<C>>,
}

impl<C: SlackApi + 'static> ChannelCatalog<C> {
    /// Build an empty catalog. Nothing is loaded or fetched until
    /// [`start`](Self::start).
    pub fn new(client: Arc<C>, settings: CatalogSettings, stores: Option<CatalogStores>) -> Self {
        let cache = Arc::new(CatalogCache::new());
        let users = Arc::new(UserDirectory::new());
        let fetcher = CatalogFetcher::new(client, settings.page_size, RetryPolicy::from(&settings));
        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::clone(&cache),
            Arc::clone(&users),
            fetcher,
            stores,
            settings,
        ));

        Self {
            cache,
            users,
            coordinator,
        }
    }

    /// Build and start a catalog in one step.
    pub fn open(
        client: Arc<C>,
        settings: CatalogSettings,
        stores: Option<CatalogStores>,
        startup: Startup,
    ) -> Self {
        let catalog = Self::new(client, settings, stores.clone());
        catalog.start(stores.as_ref(), startup);
        catalog
    }

    /// Warm-start from snapshots and, for [`Startup::Background`] and
    /// [`Startup::Fresh`], launch population.
    ///
    /// Must be called from within a tokio runtime when population launches.
    pub fn start(&self, stores: Option<&CatalogStores>, startup: Startup) {
        if let Some(stores) = stores {
            match stores.users.load() {
                Ok(users) => self.users.replace(users),
                Err(e) => debug!("No user snapshot ({})", e),
            }
            if startup != Startup::Fresh {
                self.cache.warm_start(&stores.channels, &self.users);
            }
        }

        if matches!(startup, Startup::Background | Startup::Fresh) {
            self.coordinator.launch();
        }
    }

    /// Turn a name or id into an id.
    ///
    /// Id-shaped input comes back unchanged; names are matched exactly,
    /// then case-insensitively. Unknown names also come back unchanged.
    pub fn resolve_id(&self, name_or_id: &str) -> String {
        let input = name_or_id.trim();
        if is_conversation_id(input) {
            return input.to_string();
        }

        self.cache
            .lookup_name(strip_sigil(input))
            .unwrap_or_else(|| input.to_string())
    }

    /// Entry for an id, if the catalog has it.
    pub fn get_entry(&self, id: &str) -> Option<CatalogEntry> {
        self.cache.get(id)
    }

    /// Whether nothing has been loaded or fetched yet.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Every entry matching `pred`, sorted by display name.
    pub fn list_entries(&self, pred: impl Fn(&CatalogEntry) -> bool) -> Vec<CatalogEntry> {
        self.cache.filter(pred)
    }

    pub fn cache_info(&self) -> CacheInfo {
        let state = self.cache.refresh_state();
        CacheInfo {
            last_refresh: state.last_refresh_at(),
            entry_count: self.cache.len(),
            refresh_calls_in_window: state.calls_in_window(),
            member_count: self.cache.count(|e| e.is_member),
            user_count: self.users.len(),
            status: self.coordinator.status(),
        }
    }

    /// Ask for a full repopulation, subject to the manual refresh limiter.
    pub fn request_refresh(&self) -> RefreshDecision {
        self.coordinator.request_refresh()
    }

    pub fn status(&self) -> PopulationStatus {
        self.coordinator.status()
    }

    /// Wait for the running population pass, if any, to finish.
    pub async fn wait_for_population(&self) -> PopulationStatus {
        self.coordinator.wait_until_idle().await
    }

    /// Display name for an id, or the id itself when unknown.
    pub fn entry_name(&self, id: &str) -> String {
        match self.get_entry(id) {
            Some(entry) => self.label(&entry),
            None => id.to_string(),
        }
    }

    /// Human label for an entry; direct messages are named after the user.
    pub fn label(&self, entry: &CatalogEntry) -> String {
        match entry.user.as_deref().and_then(|u| self.users.display_name(u)) {
            Some(name) if entry.kind.is_direct() => format!("@{}", name),
            _ => entry.display_name(),
        }
    }

    /// Resolve locally, falling back to a direct upstream lookup by id.
    ///
    /// A fetched entry is added to the catalog so later reads hit locally.
    pub async fn resolve_or_fetch(&self, name_or_id: &str) -> Result<CatalogEntry> {
        let id = self.resolve_id(name_or_id);
        if let Some(entry) = self.get_entry(&id) {
            return Ok(entry);
        }

        debug!("Catalog miss for '{}', fetching {}", name_or_id, id);
        let entry = self
            .coordinator
            .fetcher()
            .fetch_entry(&id)
            .await
            .map_err(|e| match e {
                crate::error::Error::Api(ApiError::NotFound(_)) => {
                    ApiError::NotFound(format!("channel '{}'", name_or_id)).into()
                }
                other => other,
            })?;
        self.ingest_one(entry.clone());
        Ok(entry)
    }

    /// Resolve several names, fetching local misses concurrently.
    ///
    /// Results keep the input order; one failure does not affect the rest.
    pub async fn resolve_many(
        &self,
        inputs: &[String],
        max_concurrent: usize,
    ) -> Vec<(String, Result<CatalogEntry>)> {
        let mut results: Vec<Option<Result<CatalogEntry>>> = Vec::with_capacity(inputs.len());
        let mut misses: Vec<(usize, String)> = Vec::new();

        for (idx, input) in inputs.iter().enumerate() {
            let id = self.resolve_id(input);
            match self.get_entry(&id) {
                Some(entry) => results.push(Some(Ok(entry))),
                None => {
                    results.push(None);
                    misses.push((idx, id));
                }
            }
        }

        if !misses.is_empty() {
            let fetcher = self.coordinator.fetcher().clone();
            let ids: Vec<String> = misses.iter().map(|(_, id)| id.clone()).collect();
            let fetched = fetch_concurrently(
                ids,
                move |id: String| {
                    let fetcher = fetcher.clone();
                    async move { fetcher.fetch_entry(&id).await }
                },
                max_concurrent,
            )
            .await;

            for ((idx, _), result) in misses.into_iter().zip(fetched) {
                if let Ok(entry) = &result {
                    self.ingest_one(entry.clone());
                }
                results[idx] = Some(result);
            }
        }

        inputs
            .iter()
            .cloned()
            .zip(results)
            .map(|(input, result)| {
                let result = result.unwrap_or_else(|| {
                    Err(ApiError::NotFound(format!("channel '{}'", input)).into())
                });
                (input, result)
            })
            .collect()
    }

    fn ingest_one(&self, entry: CatalogEntry) {
        self.cache
            .ingest(vec![entry], ConversationScope::All, &self.users);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entry::ChannelKind;
    use crate::catalog::filter::{ChannelFilter, KindFilter};
    use crate::client::MockSlackClient;
    use crate::client::fixtures::{ConversationBuilder, channel, dm, user};
    use crate::error::Error;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_snapshot(dir: &std::path::Path, count: usize) -> CatalogStores {
        let stores = CatalogStores::in_dir(dir);
        let mut entries = vec![CatalogEntry::new("C0000000001", "general", ChannelKind::Public)];
        for i in 2..=count {
            entries.push(CatalogEntry::new(
                format!("C00000000{:02}", i),
                format!("channel-{}", i),
                ChannelKind::Public,
            ));
        }
        stores.channels.save(&entries).unwrap();
        stores
    }

    async fn catalog(
        mock: MockSlackClient,
    ) -> (Arc<MockSlackClient>, ChannelCatalog<MockSlackClient>) {
        let client = Arc::new(mock);
        let catalog = ChannelCatalog::new(Arc::clone(&client), CatalogSettings::default(), None);
        (client, catalog)
    }

    #[tokio::test]
    async fn test_empty_catalog_answers_immediately() {
        let (client, catalog) = catalog(MockSlackClient::new()).await;

        assert_eq!(catalog.resolve_id("general"), "general");
        assert!(catalog.get_entry("C0000000001").is_none());
        assert!(catalog.list_entries(|_| true).is_empty());
        assert!(catalog.is_empty());
        assert_eq!(client.call_counts().await.total(), 0);
    }

    #[tokio::test]
    async fn test_id_shaped_input_unchanged() {
        let (_client, catalog) = catalog(MockSlackClient::new()).await;

        assert_eq!(catalog.resolve_id(" C0123456789 "), "C0123456789");
    }

    #[tokio::test(start_paused = true)]
    async fn test_warm_start_resolves_before_network() {
        let dir = TempDir::new().unwrap();
        let stores = write_snapshot(dir.path(), 10);
        let mock = MockSlackClient::new()
            .with_member_pages(vec![vec![channel("C0000000099", "late", true)]])
            .await
            .gated()
            .await;
        let client = Arc::new(mock);

        let catalog = ChannelCatalog::open(
            Arc::clone(&client),
            CatalogSettings::default(),
            Some(stores),
            Startup::Background,
        );

        // No list call has been allowed through yet
        assert_eq!(catalog.resolve_id("general"), "C0000000001");
        assert_eq!(catalog.resolve_id("#Channel-7"), "C0000000007");
        assert_eq!(catalog.cache_info().entry_count, 10);
        assert!(catalog.cache_info().last_refresh.is_some());
        assert_eq!(client.call_counts().await.list_member, 0);

        client.release(2).await;
        catalog.wait_for_population().await;
        assert_eq!(catalog.resolve_id("late"), "C0000000099");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cold_start_counts_everything_fetched() {
        let dir = TempDir::new().unwrap();
        let stores = CatalogStores::in_dir(dir.path());
        let mock = MockSlackClient::new()
            .with_member_pages(vec![vec![channel("C0000000001", "general", true)]])
            .await
            .with_all_pages(vec![
                vec![channel("C0000000001", "general", false)],
                vec![
                    channel("C0000000002", "random", false),
                    channel("C0000000003", "ops", false),
                ],
            ])
            .await;

        let catalog = ChannelCatalog::open(
            Arc::new(mock),
            CatalogSettings::default(),
            Some(stores.clone()),
            Startup::Background,
        );
        assert!(catalog.list_entries(|_| true).len() <= 3);

        assert_eq!(catalog.wait_for_population().await, PopulationStatus::Complete);
        let info = catalog.cache_info();
        assert_eq!(info.entry_count, 3);
        assert_eq!(info.member_count, 1);
        assert!(stores.channels.exists());
    }

    #[tokio::test]
    async fn test_offline_start_makes_no_calls() {
        let dir = TempDir::new().unwrap();
        let stores = write_snapshot(dir.path(), 2);
        let client = Arc::new(MockSlackClient::new());

        let catalog = ChannelCatalog::open(
            Arc::clone(&client),
            CatalogSettings::default(),
            Some(stores),
            Startup::Offline,
        );

        assert_eq!(catalog.wait_for_population().await, PopulationStatus::Idle);
        assert_eq!(catalog.cache_info().entry_count, 2);
        assert_eq!(client.call_counts().await.total(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_start_ignores_channel_snapshot() {
        let dir = TempDir::new().unwrap();
        let stores = write_snapshot(dir.path(), 5);
        let mock = MockSlackClient::new()
            .with_all_pages(vec![vec![channel("C0000000042", "fresh", false)]])
            .await;

        let catalog = ChannelCatalog::open(
            Arc::new(mock),
            CatalogSettings::default(),
            Some(stores.clone()),
            Startup::Fresh,
        );
        assert!(catalog.cache_info().last_refresh.is_none());

        catalog.wait_for_population().await;
        assert_eq!(catalog.resolve_id("general"), "general");
        assert_eq!(catalog.resolve_id("fresh"), "C0000000042");
        // The new snapshot replaces the old one
        assert_eq!(stores.channels.info().unwrap().entry_count, 1);
    }

    #[tokio::test]
    async fn test_on_demand_start_only_fetches_misses() {
        let dir = TempDir::new().unwrap();
        let stores = write_snapshot(dir.path(), 3);
        let mock = MockSlackClient::new()
            .with_all_pages(vec![vec![channel("C0000000077", "never-listed", false)]])
            .await
            .with_lookup(channel("C0000000042", "deploys", true))
            .await;
        let client = Arc::new(mock);

        let catalog = ChannelCatalog::open(
            Arc::clone(&client),
            CatalogSettings::default(),
            Some(stores),
            Startup::OnDemand,
        );

        assert_eq!(catalog.status(), PopulationStatus::Idle);
        assert_eq!(
            catalog.resolve_or_fetch("general").await.unwrap().id,
            "C0000000001"
        );
        assert_eq!(client.call_counts().await.total(), 0);

        let fetched = catalog.resolve_or_fetch("C0000000042").await.unwrap();
        assert_eq!(fetched.name, "deploys");

        let counts = client.call_counts().await;
        assert_eq!(counts.get_conversation, 1);
        assert_eq!(counts.total(), 1);
        assert_eq!(catalog.status(), PopulationStatus::Idle);
    }

    #[tokio::test]
    async fn test_list_entries_with_filter() {
        let dir = TempDir::new().unwrap();
        let stores = write_snapshot(dir.path(), 3);
        let catalog = ChannelCatalog::open(
            Arc::new(MockSlackClient::new()),
            CatalogSettings::default(),
            Some(stores),
            Startup::Offline,
        );

        let filter = ChannelFilter::new().kind(KindFilter::Public).search("channel");
        let names: Vec<String> = catalog
            .list_entries(|e| filter.matches(e))
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["channel-2", "channel-3"]);
    }

    #[tokio::test]
    async fn test_resolve_or_fetch_caches_result() {
        let mock = MockSlackClient::new()
            .with_lookup(
                ConversationBuilder::private("G0000000001", "secret")
                    .member(true)
                    .build(),
            )
            .await;
        let (client, catalog) = catalog(mock).await;

        let entry = catalog.resolve_or_fetch("G0000000001").await.unwrap();
        assert_eq!(entry.name, "secret");

        // Second lookup by name is local
        let again = catalog.resolve_or_fetch("secret").await.unwrap();
        assert_eq!(again.id, "G0000000001");
        assert_eq!(client.call_counts().await.get_conversation, 1);
    }

    #[tokio::test]
    async fn test_resolve_or_fetch_unknown_name_is_not_found() {
        let (_client, catalog) = catalog(MockSlackClient::new()).await;

        let err = catalog.resolve_or_fetch("nowhere").await.unwrap_err();
        match err {
            Error::Api(ApiError::NotFound(msg)) => assert!(msg.contains("nowhere")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_many_keeps_order_and_failures() {
        let mock = MockSlackClient::new()
            .with_lookup(channel("C0000000005", "five", false))
            .await;
        let (client, catalog) = catalog(mock).await;
        catalog.ingest_one(CatalogEntry::new("C0000000001", "general", ChannelKind::Public));

        let inputs = vec![
            "C0000000005".to_string(),
            "#general".to_string(),
            "ghost".to_string(),
        ];
        let results = catalog.resolve_many(&inputs, 4).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].1.as_ref().unwrap().name, "five");
        assert_eq!(results[1].1.as_ref().unwrap().id, "C0000000001");
        assert!(results[2].1.is_err());
        assert_eq!(results[2].0, "ghost");
        // Only the two misses went upstream
        assert_eq!(client.call_counts().await.get_conversation, 2);
        assert!(catalog.get_entry("C0000000005").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dm_label_uses_user_name() {
        let mock = MockSlackClient::new()
            .with_user_pages(vec![vec![user("U0000000001", "ada", "Ada Lovelace")]])
            .await
            .with_member_pages(vec![vec![dm("D0000000001", "U0000000001")]])
            .await;
        let catalog = ChannelCatalog::open(
            Arc::new(mock),
            CatalogSettings::default(),
            None,
            Startup::Background,
        );
        catalog.wait_for_population().await;

        assert_eq!(catalog.entry_name("D0000000001"), "@Ada Lovelace");
        assert_eq!(catalog.resolve_id("@ada"), "D0000000001");
        assert_eq!(catalog.entry_name("C0000000404"), "C0000000404");
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_refresh_right_after_startup_denied() {
        let dir = TempDir::new().unwrap();
        let stores = write_snapshot(dir.path(), 1);
        let catalog = ChannelCatalog::open(
            Arc::new(MockSlackClient::new()),
            CatalogSettings::default(),
            Some(stores),
            Startup::Background,
        );

        match catalog.request_refresh() {
            RefreshDecision::Denied { retry_after } => {
                assert!(retry_after > Duration::from_secs(29));
                assert!(retry_after <= Duration::from_secs(30));
            }
            RefreshDecision::Allowed => panic!("refresh right after warm start should be denied"),
        }
        assert_eq!(catalog.cache_info().refresh_calls_in_window, 0);
    }
}
