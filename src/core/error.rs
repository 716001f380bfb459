use thiserror::Error;

/// Failures of the search provider call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    /// No API key configured; raised before any request is sent.
    #[error("no API key configured for the search provider")]
    MissingApiKey,

    #[error("search request failed: {0}")]
    Request(String),

    #[error("search API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("search API response could not be parsed: {0}")]
    Malformed(String),
}

/// Request-level failures. These abort the pipeline and are never cached.
///
/// The `Display` output is the message shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DigestError {
    #[error("Please enter a topic.")]
    MissingTopic,

    #[error("SERPAPI_API_KEY environment variable is not set.")]
    MissingApiKey,

    #[error("An API or network error occurred: {0}")]
    Search(SearchError),
}

impl From<SearchError> for DigestError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::MissingApiKey => DigestError::MissingApiKey,
            other => DigestError::Search(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_from_provider_is_a_config_error() {
        let err: DigestError = SearchError::MissingApiKey.into();
        assert_eq!(err, DigestError::MissingApiKey);
    }

    #[test]
    fn search_failures_carry_detail_in_message() {
        let err: DigestError = SearchError::Api {
            status: 401,
            message: "Invalid API key".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "An API or network error occurred: search API returned 401: Invalid API key"
        );
    }
}
