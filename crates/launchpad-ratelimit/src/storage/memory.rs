use std::{num::NonZeroU32, sync::Arc, time::Duration};

use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::keyed::DashMapStateStore,
};

use crate::error::RateLimitError;

type KeyedLimiter = RateLimiter<String, DashMapStateStore<String>, DefaultClock>;

/// In-process GCRA limiter backed by governor
///
/// Admits a burst of `max_requests`, then replenishes evenly across `window`.
#[derive(Clone)]
pub struct MemoryLimiter {
    limiter: Arc<KeyedLimiter>,
    clock: DefaultClock,
}

impl MemoryLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Result<Self, RateLimitError> {
        let burst =
            NonZeroU32::new(max_requests).ok_or_else(|| RateLimitError::Config("requests must be > 0".to_string()))?;

        if window.is_zero() {
            return Err(RateLimitError::Config("rate limit window must be > 0".to_string()));
        }

        let quota = Quota::with_period(window / burst.get())
            .ok_or_else(|| RateLimitError::Config("rate limit window too small for request count".to_string()))?
            .allow_burst(burst);

        Ok(Self {
            limiter: Arc::new(RateLimiter::dashmap(quota)),
            clock: DefaultClock::default(),
        })
    }

    /// Admit one request for `key`
    pub fn check(&self, key: &str) -> Result<(), RateLimitError> {
        self.limiter.check_key(&key.to_owned()).map_err(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            RateLimitError::Exceeded {
                retry_after: wait.as_secs().max(1),
            }
        })
    }
}
