use crate::core::types::SeedEntry;

// ---------------------------------------------------------------------------
// DigestConfig — file-based config loader (topic-digest.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CONFIG_PATH: &str = "TOPIC_DIGEST_CONFIG";
pub const ENV_SERPAPI_API_KEY: &str = "SERPAPI_API_KEY";
pub const ENV_SERPAPI_BASE_URL: &str = "SERPAPI_BASE_URL";
pub const ENV_SCRAPE_TIMEOUT_SECS: &str = "SCRAPE_TIMEOUT_SECS";
pub const ENV_SCRAPE_INTERVAL_MS: &str = "SCRAPE_INTERVAL_MS";
pub const ENV_CACHE_CAPACITY: &str = "CACHE_CAPACITY";
pub const ENV_PORT: &str = "PORT";

pub const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com/search.json";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 150;
pub const DEFAULT_PORT: u16 = 5000;

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Search provider sub-config (the `search` key in topic-digest.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct SearchConfig {
    /// SerpApi key. Never logged.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Search engine parameter forwarded to the provider. Default: `google`.
    pub engine: Option<String>,
    /// Number of organic results to request. Default: 5.
    pub num_results: Option<usize>,
}

impl SearchConfig {
    /// API key: JSON field → `SERPAPI_API_KEY` env var → `None`.
    ///
    /// Called per request, so a key exported after startup is picked up.
    /// Blank values count as unset.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(k) = &self.api_key {
            let k = k.trim();
            if !k.is_empty() {
                return Some(k.to_string());
            }
        }
        env_nonempty(ENV_SERPAPI_API_KEY).map(|k| k.trim().to_string())
    }

    /// Endpoint: JSON field → `SERPAPI_BASE_URL` env var → `https://serpapi.com/search.json`.
    pub fn resolve_base_url(&self) -> String {
        if let Some(u) = &self.base_url {
            if !u.trim().is_empty() {
                return u.clone();
            }
        }
        env_nonempty(ENV_SERPAPI_BASE_URL).unwrap_or_else(|| DEFAULT_SERPAPI_BASE_URL.to_string())
    }

    pub fn resolve_engine(&self) -> String {
        self.engine
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or("google")
            .to_string()
    }

    pub fn resolve_num_results(&self) -> usize {
        self.num_results.filter(|n| *n > 0).unwrap_or(5)
    }
}

/// Page fetching sub-config (the `scrape` key).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ScrapeConfig {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    /// Pages whose cleaned text has fewer characters than this are discarded. Default: 150.
    pub min_content_chars: Option<usize>,
    /// Minimum spacing between page fetches. `0` disables pacing. Default: 1000.
    pub interval_ms: Option<u64>,
    /// Phrases stripped by the cleaner in addition to the built-in list.
    #[serde(default)]
    pub extra_boilerplate_phrases: Vec<String>,
}

impl ScrapeConfig {
    /// Timeout: JSON field → `SCRAPE_TIMEOUT_SECS` env var → 8.
    pub fn resolve_timeout(&self) -> std::time::Duration {
        let secs = self
            .timeout_secs
            .or_else(|| env_parse(ENV_SCRAPE_TIMEOUT_SECS))
            .unwrap_or(8);
        std::time::Duration::from_secs(secs)
    }

    pub fn resolve_user_agent(&self) -> String {
        self.user_agent
            .as_deref()
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or(DEFAULT_USER_AGENT)
            .to_string()
    }

    pub fn resolve_min_content_chars(&self) -> usize {
        self.min_content_chars.unwrap_or(DEFAULT_MIN_CONTENT_CHARS)
    }

    /// Interval: JSON field → `SCRAPE_INTERVAL_MS` env var → 1000.
    pub fn resolve_interval(&self) -> std::time::Duration {
        let ms = self
            .interval_ms
            .or_else(|| env_parse(ENV_SCRAPE_INTERVAL_MS))
            .unwrap_or(1000);
        std::time::Duration::from_millis(ms)
    }
}

/// Summarizer sub-config (the `summary` key).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct SummaryConfig {
    /// Maximum sentences in a summary. Default: 5.
    pub sentences: Option<usize>,
    /// Aggregate text shorter than this (in characters) is not summarized. Default: 150.
    pub min_chars: Option<usize>,
    /// Drop common English words from the term dictionary. Default: `false`.
    pub use_stop_words: Option<bool>,
}

impl SummaryConfig {
    pub fn resolve_sentences(&self) -> usize {
        self.sentences.unwrap_or(5)
    }

    pub fn resolve_min_chars(&self) -> usize {
        self.min_chars.unwrap_or(DEFAULT_MIN_CONTENT_CHARS)
    }

    pub fn resolve_use_stop_words(&self) -> bool {
        self.use_stop_words.unwrap_or(false)
    }
}

/// Topic cache sub-config (the `cache` key).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct CacheConfig {
    pub capacity: Option<u64>,
    /// Entries inserted at startup, served like any other cached topic.
    #[serde(default)]
    pub seed: Vec<SeedEntry>,
}

impl CacheConfig {
    /// Capacity: JSON field → `CACHE_CAPACITY` env var → 1000.
    pub fn resolve_capacity(&self) -> u64 {
        self.capacity
            .or_else(|| env_parse(ENV_CACHE_CAPACITY))
            .unwrap_or(1000)
    }
}

#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ServerConfig {
    pub port: Option<u16>,
}

impl ServerConfig {
    /// Port: JSON field → `PORT` env var → 5000. A `--port` CLI argument wins over all of these.
    pub fn resolve_port(&self) -> u16 {
        self.port.or_else(|| env_parse(ENV_PORT)).unwrap_or(DEFAULT_PORT)
    }

    /// Command line first (`--port N` or `--port=N`), then [`Self::resolve_port`].
    pub fn resolve_port_with_args<I, S>(&self, args: I) -> u16
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        port_from_args(args).unwrap_or_else(|| self.resolve_port())
    }
}

/// Last valid `--port` flag wins; unparsable values are ignored.
pub fn port_from_args<I, S>(args: I) -> Option<u16>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut port = None;
    let mut awaiting_value = false;
    for arg in args {
        let arg = arg.as_ref();
        if awaiting_value {
            awaiting_value = false;
            port = arg.parse().ok().or(port);
            continue;
        }
        match arg.strip_prefix("--port") {
            Some("") => awaiting_value = true,
            Some(value) => {
                if let Some(value) = value.strip_prefix('=') {
                    port = value.parse().ok().or(port);
                }
            }
            None => {}
        }
    }
    port
}

/// Top-level config loaded from `topic-digest.json`.
#[derive(serde::Deserialize, Default, Clone, Debug)]
#[serde(default)]
pub struct DigestConfig {
    pub search: SearchConfig,
    pub scrape: ScrapeConfig,
    pub summary: SummaryConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
}

impl DigestConfig {
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }
}

/// Load `topic-digest.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `TOPIC_DIGEST_CONFIG` env var path
/// 2. `./topic-digest.json`
/// 3. `../topic-digest.json`
///
/// Missing file → `DigestConfig::default()` (silent, all env-var fallbacks apply).
/// Parse error → log a warning, return `DigestConfig::default()`.
pub fn load_digest_config() -> DigestConfig {
    let mut candidates = vec![
        std::path::PathBuf::from("topic-digest.json"),
        std::path::PathBuf::from("../topic-digest.json"),
    ];
    if let Some(env_path) = env_nonempty(ENV_CONFIG_PATH) {
        candidates.insert(0, std::path::PathBuf::from(env_path));
    }

    for path in &candidates {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        return match DigestConfig::from_json(&contents) {
            Ok(cfg) => {
                tracing::info!("topic-digest.json loaded from {}", path.display());
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    "topic-digest.json parse error at {}: {}; using defaults",
                    path.display(),
                    e
                );
                DigestConfig::default()
            }
        };
    }

    DigestConfig::default()
}
