use serde::{Deserialize, Serialize};

/// What the cache stores for one topic, and what every request renders.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct CacheEntry {
    pub summary: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// URLs whose pages contributed text to the summary.
    #[serde(default)]
    pub urls_found: Vec<String>,
}

/// Outcome of a single topic request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub topic: String,
    pub entry: CacheEntry,
    /// `true` when the entry was served from the cache without running the pipeline.
    pub cached: bool,
}

/// Cache entry declared in config and inserted at startup.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SeedEntry {
    pub topic: String,
    #[serde(default)]
    pub summary: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub urls_found: Vec<String>,
}

impl SeedEntry {
    pub fn into_parts(self) -> (String, CacheEntry) {
        (
            self.topic,
            CacheEntry {
                summary: self.summary,
                error: self.error,
                urls_found: self.urls_found,
            },
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopicForm {
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DigestRequest {
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DigestResponse {
    pub topic: String,
    pub summary: Vec<String>,
    pub error: Option<String>,
    pub urls_found: Vec<String>,
    pub cached: bool,
}

impl From<Digest> for DigestResponse {
    fn from(digest: Digest) -> Self {
        Self {
            topic: digest.topic,
            summary: digest.entry.summary,
            error: digest.entry.error,
            urls_found: digest.entry.urls_found,
            cached: digest.cached,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
