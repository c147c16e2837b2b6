use serde::Deserialize;
use url::Url;

/// Request rate limiting configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Storage backend
    #[serde(default)]
    pub storage: RateLimitStorage,
    /// Limit shared by all clients
    #[serde(default)]
    pub global: Option<RequestRateLimit>,
    /// Limit per client IP
    #[serde(default)]
    pub per_ip: Option<RequestRateLimit>,
}

/// Where counters live
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RateLimitStorage {
    /// In-process (single instance only)
    #[default]
    Memory,
    /// Shared across instances through Redis
    Redis(RedisConfig),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: Url,
    /// Prefix for counter keys
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

/// Requests allowed per window
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestRateLimit {
    /// Maximum requests per window
    pub requests: u32,
    /// Window duration (e.g. "1m", "1h")
    pub window: String,
}

fn default_key_prefix() -> String {
    "launchpad:ratelimit".to_string()
}
