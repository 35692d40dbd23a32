//! Page-at-a-time catalog fetching with upstream retry discipline

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use super::entry::CatalogEntry;
use crate::client::{ConversationScope, CursorPage, CursorParams, SlackApi, User};
use crate::config::CatalogSettings;
use crate::error::{FailureClass, Result};

/// One page of catalog entries and where the next one starts.
#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    pub next_cursor: Option<String>,
}

/// Ceiling for a single transient backoff sleep
pub const MAX_TRANSIENT_BACKOFF: Duration = Duration::from_secs(60);

/// Retry budget for failures that are not upstream rate limits.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub transient_retries: u32,
    pub transient_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            transient_retries: 3,
            transient_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Doubling backoff for the given retry attempt, capped at
    /// [`MAX_TRANSIENT_BACKOFF`].
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.transient_backoff
            .checked_mul(2u32.saturating_pow(attempt))
            .map_or(MAX_TRANSIENT_BACKOFF, |d| d.min(MAX_TRANSIENT_BACKOFF))
    }
}

impl From<&CatalogSettings> for RetryPolicy {
    fn from(settings: &CatalogSettings) -> Self {
        Self {
            transient_retries: settings.transient_retries,
            transient_backoff: settings.transient_backoff,
        }
    }
}

/// Fetches catalog pages from the upstream API.
pub struct CatalogFetcher<C> {
    client: Arc<C>,
    page_size: usize,
    retry: RetryPolicy,
}

impl<C> Clone for CatalogFetcher<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            page_size: self.page_size,
            retry: self.retry,
        }
    }
}

impl<C: SlackApi> CatalogFetcher<C> {
    pub fn new(client: Arc<C>, page_size: usize, retry: RetryPolicy) -> Self {
        Self {
            client,
            page_size,
            retry,
        }
    }

    fn params(&self, cursor: Option<&str>) -> CursorParams {
        let params = CursorParams::new().limit(self.page_size);
        match cursor {
            Some(c) => params.cursor(c),
            None => params,
        }
    }

    /// Fetch a single page once. Errors are returned unclassified.
    pub async fn fetch_page(
        &self,
        cursor: Option<&str>,
        scope: ConversationScope,
    ) -> Result<CatalogPage> {
        let page = self
            .client
            .list_conversations(scope, &self.params(cursor))
            .await?;

        Ok(CatalogPage {
            entries: page.items.into_iter().map(CatalogEntry::from).collect(),
            next_cursor: page.next_cursor,
        })
    }

    /// Fetch a page, sleeping through rate limits and retrying transient
    /// failures. The same cursor is requested again after every wait.
    pub async fn fetch_page_with_retry(
        &self,
        cursor: Option<&str>,
        scope: ConversationScope,
    ) -> Result<CatalogPage> {
        let label = format!("{} page {}", scope, cursor.unwrap_or("<first>"));
        self.with_retry(&label, || self.fetch_page(cursor, scope))
            .await
    }

    /// Fetch one page of the user directory with the same retry rules.
    pub async fn fetch_user_page(&self, cursor: Option<&str>) -> Result<CursorPage<User>> {
        let params = self.params(cursor);
        self.with_retry("users", || self.client.list_users(&params))
            .await
    }

    /// Direct lookup of one conversation by id.
    pub async fn fetch_entry(&self, id: &str) -> Result<CatalogEntry> {
        let conv = self.client.get_conversation(id).await?;
        Ok(CatalogEntry::from(conv))
    }

    async fn with_retry<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut transient_attempts = 0u32;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => match e.class() {
                    FailureClass::RateLimited(wait) => {
                        warn!("Rate limited on {}, sleeping {:?}", label, wait);
                        tokio::time::sleep(wait).await;
                    }
                    FailureClass::Transient if transient_attempts < self.retry.transient_retries => {
                        let backoff = self.retry.backoff_for(transient_attempts);
                        transient_attempts += 1;
                        debug!(
                            "Transient failure on {} ({}), retry {} in {:?}",
                            label, e, transient_attempts, backoff
                        );
                        tokio::time::sleep(backoff).await;
                    }
                    _ => return Err(e),
                },
            }
        }
    }
}
