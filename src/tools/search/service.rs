use crate::core::error::SearchError;
use async_trait::async_trait;

/// Turns a topic into an ordered list of result URLs.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Up to `num_results` organic result URLs, in provider order.
    ///
    /// A missing API key must be reported as [`SearchError::MissingApiKey`]
    /// before any network traffic.
    async fn search(&self, topic: &str, num_results: usize) -> Result<Vec<String>, SearchError>;

    /// Provider name for logs.
    fn name(&self) -> &'static str;
}
