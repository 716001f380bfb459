use super::SearchProvider;
use crate::core::config::SearchConfig;
use crate::core::error::SearchError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    link: Option<String>,
}

/// Result links from a SerpApi JSON body, in order. Entries without a `link` are skipped.
///
/// A body carrying only an `error` (SerpApi's reply when Google has no results)
/// yields an empty list.
pub fn parse_organic_links(body: &str) -> Result<Vec<String>, SearchError> {
    let parsed: SerpApiResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Malformed(e.to_string()))?;

    if parsed.organic_results.is_empty() {
        if let Some(err) = parsed.error {
            info!("SerpApi returned no organic results: {}", err);
        }
    }

    Ok(parsed
        .organic_results
        .into_iter()
        .filter_map(|r| r.link)
        .filter(|link| !link.trim().is_empty())
        .collect())
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<SerpApiResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Google results through the SerpApi JSON endpoint.
pub struct SerpApiProvider {
    client: Client,
    config: SearchConfig,
}

impl SerpApiProvider {
    pub fn new(client: Client, config: SearchConfig) -> Self {
        Self { client, config }
    }

    fn request_url(&self, topic: &str, api_key: &str, num_results: usize) -> Result<Url, SearchError> {
        let base = self.config.resolve_base_url();
        let engine = self.config.resolve_engine();
        let num = num_results.to_string();
        Url::parse_with_params(
            &base,
            &[
                ("engine", engine.as_str()),
                ("q", topic),
                ("api_key", api_key),
                ("num", num.as_str()),
            ],
        )
        .map_err(|e| SearchError::Request(format!("invalid search endpoint '{}': {}", base, e)))
    }
}

#[async_trait]
impl SearchProvider for SerpApiProvider {
    async fn search(&self, topic: &str, num_results: usize) -> Result<Vec<String>, SearchError> {
        let api_key = self
            .config
            .resolve_api_key()
            .ok_or(SearchError::MissingApiKey)?;
        let url = self.request_url(topic, &api_key, num_results)?;

        let response = self.client.get(url).send().await.map_err(|e| {
            // Strip the URL: it carries the API key.
            SearchError::Request(e.without_url().to_string())
        })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Request(e.without_url().to_string()))?;

        if !status.is_success() {
            let message = error_message(&body);
            warn!("SerpApi returned {}: {}", status, message);
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mut links = parse_organic_links(&body)?;
        links.truncate(num_results);
        info!("SerpApi returned {} result URLs for '{}'", links.len(), topic);
        Ok(links)
    }

    fn name(&self) -> &'static str {
        "serpapi"
    }
}
