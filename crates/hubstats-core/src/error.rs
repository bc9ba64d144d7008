//! Error taxonomy for Hub API requests

/// Maximum number of body characters kept in error messages
const BODY_EXCERPT_CHARS: usize = 500;

/// Error from fetching a single URL.
///
/// Rate limiting, invalid JSON and transport failures are transient and
/// retried by [`crate::fetch::Fetcher`]; other HTTP statuses are fatal.
#[derive(Debug)]
pub enum FetchError {
    /// Connection, DNS or read failure before a status was received
    Network { url: String, message: String },
    /// HTTP 429
    RateLimited { url: String },
    /// 2xx response whose body did not parse as JSON
    InvalidJson {
        url: String,
        message: String,
        body: String,
    },
    /// Non-2xx, non-429 response
    Http {
        url: String,
        status: u16,
        body: String,
    },
    /// Retry budget used up without a valid response
    Exhausted { url: String, attempts: u32 },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network { url, message } => write!(f, "request to {url} failed: {message}"),
            Self::RateLimited { url } => write!(f, "rate limit encountered at {url}"),
            Self::InvalidJson { url, message, body } => write!(
                f,
                "invalid JSON from {url}: {message} (body: {})",
                excerpt(body)
            ),
            Self::Http { url, status, body } => write!(
                f,
                "request to {url} failed with status code {status}: {}",
                excerpt(body)
            ),
            Self::Exhausted { url, attempts } => write!(
                f,
                "failed to retrieve valid JSON from {url} after {attempts} attempts"
            ),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::RateLimited { .. } | Self::InvalidJson { .. }
        )
    }
}

/// Truncate a response body for display
pub fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
