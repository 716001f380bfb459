use super::types::CacheEntry;
use moka::future::Cache;
use std::future::Future;

/// Bounded topic → summary cache. Entries never expire; the least valuable
/// entries are evicted once `capacity` is reached.
#[derive(Clone)]
pub struct SummaryCache {
    inner: Cache<String, CacheEntry>,
}

impl std::fmt::Debug for SummaryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

impl SummaryCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub async fn get(&self, topic: &str) -> Option<CacheEntry> {
        self.inner.get(topic).await
    }

    pub async fn insert(&self, topic: impl Into<String>, entry: CacheEntry) {
        self.inner.insert(topic.into(), entry).await;
    }

    /// Cached entry for `topic`, or the result of `init` (stored only on `Ok`).
    ///
    /// Concurrent callers for the same topic share a single `init` run.
    /// Returns the entry and whether it was freshly computed.
    pub async fn get_or_try_insert<F, E>(&self, topic: &str, init: F) -> Result<(CacheEntry, bool), E>
    where
        F: Future<Output = Result<CacheEntry, E>>,
        E: Clone + Send + Sync + 'static,
    {
        match self.inner.entry_by_ref(topic).or_try_insert_with(init).await {
            Ok(entry) => {
                let fresh = entry.is_fresh();
                Ok((entry.into_value(), fresh))
            }
            Err(err) => Err((*err).clone()),
        }
    }

    /// Approximate number of entries (eviction bookkeeping runs lazily).
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}
