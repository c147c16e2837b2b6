use std::net::SocketAddr;

use serde::Deserialize;

use crate::{client_ip::ClientIpConfig, cors::CorsConfig, health::HealthConfig, rate_limit::RateLimitConfig};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub cors: Option<CorsConfig>,
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
    #[serde(default)]
    pub client_ip: Option<ClientIpConfig>,
}
