use crate::core::cache::SummaryCache;
use crate::core::error::DigestError;
use crate::core::types::{CacheEntry, Digest};
use crate::nlp::Summarizer;
use crate::scraping::{PageSource, ScrapeLimiter};
use crate::tools::search::SearchProvider;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const NO_RESULTS_MESSAGE: &str = "No relevant search results found. Try another topic.";
pub const NO_CONTENT_MESSAGE: &str =
    "Could not extract enough content to generate a summary from any of the search results.";

/// Placed after every page in the aggregate text, so each page is its own paragraph.
const PAGE_SEPARATOR: &str = "\n\n";

/// Topic → summary pipeline: cache lookup, search, sequential scraping, LSA summary.
pub struct DigestService {
    search: Arc<dyn SearchProvider>,
    pages: Arc<dyn PageSource>,
    summarizer: Arc<Summarizer>,
    cache: SummaryCache,
    limiter: ScrapeLimiter,
    num_results: usize,
}

impl DigestService {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        pages: Arc<dyn PageSource>,
        summarizer: Arc<Summarizer>,
        cache: SummaryCache,
    ) -> Self {
        Self {
            search,
            pages,
            summarizer,
            cache,
            limiter: ScrapeLimiter::unlimited(),
            num_results: 5,
        }
    }

    pub fn with_limiter(mut self, limiter: ScrapeLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results;
        self
    }

    pub fn cache(&self) -> &SummaryCache {
        &self.cache
    }

    /// Summarize what the web says about `topic`.
    ///
    /// Cached topics are answered without any network call. Failures to reach
    /// the search provider (or a missing key) are returned as errors and leave
    /// the cache untouched; "no results" and "no content" outcomes are cached
    /// like any other summary.
    pub async fn digest(&self, topic: &str) -> Result<Digest, DigestError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(DigestError::MissingTopic);
        }

        let (entry, fresh) = self
            .cache
            .get_or_try_insert(topic, self.run_pipeline(topic))
            .await?;

        if fresh {
            info!(
                "Digest for '{}': {} sentences from {} pages",
                topic,
                entry.summary.len(),
                entry.urls_found.len()
            );
        } else {
            info!("Cache hit for '{}'", topic);
        }

        Ok(Digest {
            topic: topic.to_string(),
            entry,
            cached: !fresh,
        })
    }

    async fn run_pipeline(&self, topic: &str) -> Result<CacheEntry, DigestError> {
        info!("Cache miss for '{}', searching via {}", topic, self.search.name());

        let urls = self
            .search
            .search(topic, self.num_results)
            .await
            .map_err(|e| {
                warn!("Search failed for '{}': {}", topic, e);
                DigestError::from(e)
            })?;

        let mut error = None;
        let mut aggregate = String::new();
        let mut urls_found = Vec::new();

        if urls.is_empty() {
            error = Some(NO_RESULTS_MESSAGE.to_string());
        } else {
            info!("Scraping {} result URLs for '{}'", urls.len(), topic);
            for url in urls {
                self.limiter.acquire().await;
                if let Some(text) = self.pages.scrape(&url).await {
                    aggregate.push_str(&text);
                    aggregate.push_str(PAGE_SEPARATOR);
                    urls_found.push(url);
                }
            }
        }

        let summary = self.summarize_blocking(topic, aggregate).await;
        if summary.is_empty() && error.is_none() {
            error = Some(NO_CONTENT_MESSAGE.to_string());
        }

        Ok(CacheEntry {
            summary,
            error,
            urls_found,
        })
    }

    /// Run the summarizer on the blocking pool so long inputs never stall the runtime.
    async fn summarize_blocking(&self, topic: &str, aggregate: String) -> Vec<String> {
        if aggregate.is_empty() {
            return Vec::new();
        }

        let summarizer = Arc::clone(&self.summarizer);
        let started = Instant::now();
        match tokio::task::spawn_blocking(move || summarizer.summarize(&aggregate)).await {
            Ok(summary) => {
                debug!("Summarized '{}' in {:?}", topic, started.elapsed());
                summary
            }
            Err(e) => {
                warn!("Summarizer task failed for '{}': {}", topic, e);
                Vec::new()
            }
        }
    }
}
