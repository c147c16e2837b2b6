use std::time::Duration;

use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;

use crate::error::RateLimitError;

/// Fixed-window counters shared across instances through Redis
///
/// The connection is opened on first use so a limiter can be built
/// before Redis is reachable.
pub struct RedisLimiter {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
    key_prefix: String,
    max_requests: u32,
    window_secs: u64,
}

impl RedisLimiter {
    pub fn new(url: &str, key_prefix: &str, max_requests: u32, window: Duration) -> Result<Self, RateLimitError> {
        let client = redis::Client::open(url).map_err(|e| RateLimitError::Redis(format!("invalid Redis URL: {e}")))?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            key_prefix: key_prefix.to_owned(),
            max_requests,
            window_secs: window.as_secs().max(1),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, RateLimitError> {
        self.connection
            .get_or_try_init(|| ConnectionManager::new(self.client.clone()))
            .await
            .cloned()
            .map_err(|e| RateLimitError::Redis(format!("failed to connect: {e}")))
    }

    /// Admit one request for `key`
    pub async fn check(&self, key: &str) -> Result<(), RateLimitError> {
        let mut conn = self.connection().await?;
        let counter_key = format!("{}:{key}", self.key_prefix);

        let (count, ttl): (u32, i64) = redis::pipe()
            .atomic()
            .incr(&counter_key, 1)
            .ttl(&counter_key)
            .query_async(&mut conn)
            .await
            .map_err(|e| RateLimitError::Redis(format!("INCR failed: {e}")))?;

        // No expiry yet means this request opened the window
        if ttl < 0 {
            let window = i64::try_from(self.window_secs).unwrap_or(i64::MAX);
            let () = redis::cmd("EXPIRE")
                .arg(&counter_key)
                .arg(window)
                .query_async(&mut conn)
                .await
                .map_err(|e| RateLimitError::Redis(format!("EXPIRE failed: {e}")))?;
        }

        if count > self.max_requests {
            tracing::debug!(key = %counter_key, count, "redis rate limit exceeded");
            return Err(RateLimitError::Exceeded {
                retry_after: u64::try_from(ttl).unwrap_or(self.window_secs).max(1),
            });
        }

        Ok(())
    }
}
