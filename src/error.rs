use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpenSearchError {
    #[error("Unknown entity type \"{0}\". Available: term, gene_product")]
    UnknownEntityType(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{api} API error: {message}")]
    Api { api: String, message: String },

    #[error("{api} returned invalid JSON: {source}")]
    ApiJson {
        api: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{api} did not respond within {deadline:?}")]
    Timeout { api: String, deadline: Duration },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to initialize HTTP client: {0}")]
    HttpClientInit(#[source] reqwest::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl OpenSearchError {
    /// True when the failure came from the search backend rather than the request itself.
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::ApiJson { .. } | Self::Http(_) | Self::Timeout { .. }
        )
    }
}
