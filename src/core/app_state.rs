use crate::core::cache::SummaryCache;
use crate::core::config::DigestConfig;
use crate::nlp::Summarizer;
use crate::scraping::{HttpPageScraper, ScrapeLimiter, TextCleaner};
use crate::tools::digest::DigestService;
use crate::tools::search::SerpApiProvider;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid boilerplate phrase list: {0}")]
    Boilerplate(#[from] aho_corasick::BuildError),

    #[error("English tokenizer unavailable: {0}")]
    Tokenizer(#[from] regex::Error),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DigestConfig>,
    pub digest: Arc<DigestService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("cache", self.digest.cache())
            .finish()
    }
}

impl AppState {
    /// Wire the production pipeline: SerpApi search, HTTP scraping, LSA summary.
    ///
    /// The tokenizer and the phrase matcher are built here, so a request can
    /// never fail for lack of them.
    pub async fn new(http_client: reqwest::Client, config: DigestConfig) -> Result<Self, StartupError> {
        let cleaner = Arc::new(TextCleaner::new(&config.scrape.extra_boilerplate_phrases)?);
        let summarizer = Arc::new(Summarizer::from_config(&config.summary)?);
        let pages = Arc::new(HttpPageScraper::new(
            http_client.clone(),
            cleaner,
            &config.scrape,
        ));
        let search = Arc::new(SerpApiProvider::new(http_client, config.search.clone()));

        let cache = SummaryCache::new(config.cache.resolve_capacity());
        for seed in config.cache.seed.iter().cloned() {
            let (topic, entry) = seed.into_parts();
            info!("Seeding cache entry for '{}'", topic);
            cache.insert(topic, entry).await;
        }

        let digest = DigestService::new(search, pages, summarizer, cache)
            .with_limiter(ScrapeLimiter::new(config.scrape.resolve_interval()))
            .with_num_results(config.search.resolve_num_results());

        Ok(Self::from_parts(config, digest))
    }

    pub fn from_parts(config: DigestConfig, digest: DigestService) -> Self {
        Self {
            config: Arc::new(config),
            digest: Arc::new(digest),
        }
    }
}
