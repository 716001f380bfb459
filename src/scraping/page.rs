use super::clean::TextCleaner;
use super::politeness::browser_headers;
use crate::core::config::ScrapeConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

/// Elements dropped with their whole subtree before text is collected.
const REMOVED_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "nav", "footer", "header", "aside",
];
const REMOVED_CLASSES: &[&str] = &["ad", "sidebar"];
/// Text directly under these elements is never visible.
const INVISIBLE_PARENTS: &[&str] = &["style", "script", "head", "title", "meta"];

/// Something that turns a URL into cleaned page text.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Cleaned visible text of `url`, or `None` when the fetch failed or the
    /// page had too little content. Failures are logged, not returned.
    async fn scrape(&self, url: &str) -> Option<String>;
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(StatusCode),
}

/// Page scraper backed by a plain HTTP GET. No retries, no JavaScript.
pub struct HttpPageScraper {
    client: Client,
    cleaner: Arc<TextCleaner>,
    user_agent: String,
    timeout: Duration,
    min_content_chars: usize,
}

impl HttpPageScraper {
    pub fn new(client: Client, cleaner: Arc<TextCleaner>, config: &ScrapeConfig) -> Self {
        Self {
            client,
            cleaner,
            user_agent: config.resolve_user_agent(),
            timeout: config.resolve_timeout(),
            min_content_chars: config.resolve_min_content_chars(),
        }
    }

    pub fn min_content_chars(&self) -> usize {
        self.min_content_chars
    }

    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        let mut request = self
            .client
            .get(parsed)
            .timeout(self.timeout)
            .header("User-Agent", &self.user_agent);
        for (name, value) in browser_headers() {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response.text().await?)
    }

    /// Clean the visible text of `html`; `None` if it ends up shorter than the threshold.
    pub fn extract(&self, html: &str) -> Option<String> {
        let text = self.cleaner.clean(&extract_visible_text(html));
        let chars = text.chars().count();
        if chars < self.min_content_chars {
            return None;
        }
        Some(text)
    }
}

#[async_trait]
impl PageSource for HttpPageScraper {
    async fn scrape(&self, url: &str) -> Option<String> {
        let html = match self.fetch_html(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Error fetching {}: {}", url, e);
                return None;
            }
        };

        match self.extract(&html) {
            Some(text) => {
                info!("Extracted {} chars from {}", text.chars().count(), url);
                Some(text)
            }
            None => {
                warn!(
                    "Not enough relevant content from {} (minimum {} chars)",
                    url, self.min_content_chars
                );
                None
            }
        }
    }
}

fn is_removed(element: &Element) -> bool {
    REMOVED_TAGS.contains(&element.name())
        || element.classes().any(|class| REMOVED_CLASSES.contains(&class))
}

fn inside_removed(element: &ElementRef<'_>) -> bool {
    is_removed(element.value())
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| is_removed(ancestor.value()))
}

fn collect_text(element: ElementRef<'_>, parts: &mut Vec<String>) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if is_removed(child_element.value()) {
                continue;
            }
            collect_text(child_element, parts);
        } else if let Some(text) = child.value().as_text() {
            if INVISIBLE_PARENTS.contains(&element.value().name()) || text.trim().is_empty() {
                continue;
            }
            parts.push(text.to_string());
        }
    }
}

/// Visible text of the primary content region, one text node per line.
///
/// The region is the first `<main>` outside any removed subtree, then `<body>`,
/// then the whole document. The result is not cleaned.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let first_match = |css: &str| {
        Selector::parse(css)
            .ok()
            .and_then(|sel| document.select(&sel).find(|el| !inside_removed(el)))
    };

    let root = first_match("main")
        .or_else(|| first_match("body"))
        .unwrap_or_else(|| document.root_element());
    if is_removed(root.value()) {
        return String::new();
    }

    let mut parts = Vec::new();
    collect_text(root, &mut parts);
    parts.join("\n")
}
