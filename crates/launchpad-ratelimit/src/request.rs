use std::time::Duration;

use launchpad_config::{RateLimitConfig, RateLimitStorage, RequestRateLimit};

use crate::{
    error::RateLimitError,
    storage::{memory::MemoryLimiter, redis::RedisLimiter},
};

/// HTTP request-level rate limiter (global and per-IP)
pub struct RequestLimiter {
    global: Option<Limiter>,
    per_ip: Option<Limiter>,
}

enum Limiter {
    Memory(MemoryLimiter),
    Redis(RedisLimiter),
}

impl Limiter {
    async fn check(&self, key: &str) -> Result<(), RateLimitError> {
        match self {
            Self::Memory(m) => m.check(key),
            Self::Redis(r) => r.check(key).await,
        }
    }
}

impl RequestLimiter {
    pub fn new(config: &RateLimitConfig) -> Result<Self, RateLimitError> {
        let build = |scope: &str, limit: Option<&RequestRateLimit>| {
            limit.map(|l| build_limiter(&config.storage, scope, l)).transpose()
        };

        Ok(Self {
            global: build("global", config.global.as_ref())?,
            per_ip: build("ip", config.per_ip.as_ref())?,
        })
    }

    /// Whether any limit is configured at all
    pub const fn is_active(&self) -> bool {
        self.global.is_some() || self.per_ip.is_some()
    }

    pub async fn check_global(&self) -> Result<(), RateLimitError> {
        match self.global {
            Some(ref limiter) => limiter.check("global").await,
            None => Ok(()),
        }
    }

    pub async fn check_ip(&self, ip: &str) -> Result<(), RateLimitError> {
        match self.per_ip {
            Some(ref limiter) => limiter.check(ip).await,
            None => Ok(()),
        }
    }
}

fn build_limiter(storage: &RateLimitStorage, scope: &str, limit: &RequestRateLimit) -> Result<Limiter, RateLimitError> {
    let window = parse_window(&limit.window)?;

    match storage {
        RateLimitStorage::Memory => Ok(Limiter::Memory(MemoryLimiter::new(limit.requests, window)?)),
        RateLimitStorage::Redis(redis) => Ok(Limiter::Redis(RedisLimiter::new(
            redis.url.as_str(),
            &format!("{}:{scope}", redis.key_prefix),
            limit.requests,
            window,
        )?)),
    }
}

fn parse_window(s: &str) -> Result<Duration, RateLimitError> {
    duration_str::parse(s).map_err(|e| RateLimitError::Config(format!("invalid duration '{s}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(requests: u32, window: &str) -> Option<RequestRateLimit> {
        Some(RequestRateLimit {
            requests,
            window: window.to_owned(),
        })
    }

    #[tokio::test]
    async fn global_limit_applies_to_everyone() {
        let limiter = RequestLimiter::new(&RateLimitConfig {
            global: limit(2, "1m"),
            ..RateLimitConfig::default()
        })
        .unwrap();

        assert!(limiter.is_active());
        limiter.check_global().await.unwrap();
        limiter.check_global().await.unwrap();
        assert!(matches!(
            limiter.check_global().await,
            Err(RateLimitError::Exceeded { .. })
        ));

        // No per-IP limit configured
        limiter.check_ip("10.0.0.1").await.unwrap();
    }

    #[tokio::test]
    async fn per_ip_limit_is_keyed() {
        let limiter = RequestLimiter::new(&RateLimitConfig {
            per_ip: limit(1, "1h"),
            ..RateLimitConfig::default()
        })
        .unwrap();

        limiter.check_ip("10.0.0.1").await.unwrap();
        limiter.check_ip("10.0.0.2").await.unwrap();
        assert!(limiter.check_ip("10.0.0.1").await.is_err());
        limiter.check_global().await.unwrap();
    }

    #[test]
    fn invalid_window_is_a_config_error() {
        let result = RequestLimiter::new(&RateLimitConfig {
            global: limit(1, "whenever"),
            ..RateLimitConfig::default()
        });

        assert!(matches!(result, Err(RateLimitError::Config(_))));
    }

    #[test]
    fn nothing_configured_is_inactive() {
        let limiter = RequestLimiter::new(&RateLimitConfig::default()).unwrap();
        assert!(!limiter.is_active());
    }
}
