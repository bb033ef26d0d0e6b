use thiserror::Error;

/// Errors returned by the search-interest client.
#[derive(Debug, Error)]
pub enum TrendsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429: the provider is throttling this client.
    #[error("rate limited by provider (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The explore response carried no interest-over-time widget.
    #[error("no TIMESERIES widget in explore response for '{keyword}'")]
    MissingWidget { keyword: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl TrendsError {
    /// `true` when the caller should back off before the next request.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, TrendsError::RateLimited { .. })
    }
}
