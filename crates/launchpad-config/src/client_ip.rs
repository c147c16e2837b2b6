use serde::Deserialize;

/// How the client address is derived for per-IP rate limiting
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientIpConfig {
    /// Number of trusted proxies in front of the service
    ///
    /// Unset or zero means forwarding headers are ignored and the peer
    /// address is used.
    #[serde(default)]
    pub trusted_hops: Option<usize>,
}

impl ClientIpConfig {
    pub fn trusted_hops(&self) -> usize {
        self.trusted_hops.unwrap_or_default()
    }
}
