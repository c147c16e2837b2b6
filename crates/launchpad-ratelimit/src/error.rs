use thiserror::Error;

/// Rate limiting errors
#[derive(Debug, Error)]
pub enum RateLimitError {
    /// Invalid limit or window
    #[error("rate limit configuration error: {0}")]
    Config(String),

    /// Counter store unreachable or command failed
    #[error("redis error: {0}")]
    Redis(String),

    /// Limit reached for the current window
    #[error("rate limit exceeded")]
    Exceeded {
        /// Seconds until a request would be admitted
        retry_after: u64,
    },
}
