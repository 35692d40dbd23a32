//! Bounded concurrent fetching for independent API lookups.
//!
//! Used when several catalog misses need a direct upstream fetch-by-id.

use std::future::Future;
use std::pin::Pin;

use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;

use crate::error::Result;

/// Type alias for boxed futures used in concurrent fetching
type KeyFuture<T> = Pin<Box<dyn Future<Output = (usize, Result<T>)> + Send>>;

/// Run `fetch` for every key, at most `max_concurrent` at a time.
///
/// Results come back in the order of `keys`; one failed key does not
/// cancel the others.
///
/// # Example
///
/// ```ignore
/// let results = fetch_concurrently(
///     vec!["C0000000001".to_string(), "C0000000002".to_string()],
///     move |id| {
///         let c = client.clone();
///         async move { c.get_conversation(&id).await }
///     },
///     4,
/// )
/// .await;
/// ```
pub async fn fetch_concurrently<K, T, F, Fut>(
    keys: Vec<K>,
    fetch: F,
    max_concurrent: usize,
) -> Vec<Result<T>>
where
    K: Send + 'static,
    T: Send + 'static,
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    if keys.is_empty() {
        return Vec::new();
    }

    let max_concurrent = max_concurrent.max(1);
    debug!(
        "Fetching {} keys with max {} concurrent",
        keys.len(),
        max_concurrent
    );

    let mut slots: Vec<Option<Result<T>>> = (0..keys.len()).map(|_| None).collect();
    let mut futures: FuturesUnordered<KeyFuture<T>> = FuturesUnordered::new();
    let mut pending = keys.into_iter().enumerate();

    let make_future = |idx: usize, key: K, f: &F| -> KeyFuture<T> {
        let fut = f(key);
        Box::pin(async move { (idx, fut.await) })
    };

    // Seed initial batch up to max_concurrent
    for (idx, key) in pending.by_ref().take(max_concurrent) {
        futures.push(make_future(idx, key, &fetch));
    }

    while let Some((idx, result)) = futures.next().await {
        if let Err(ref e) = result {
            debug!("Fetch {} failed: {}", idx, e);
        }
        slots[idx] = Some(result);

        if let Some((next_idx, key)) = pending.next() {
            futures.push(make_future(next_idx, key, &fetch));
        }
    }

    slots.into_iter().flatten().collect()
}
