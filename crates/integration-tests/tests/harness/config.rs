//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use launchpad_auth::{SessionClaims, TokenVerifier};
use launchpad_config::{
    AuthConfig, ClientIpConfig, Config, CorsConfig, DatabaseConfig, Environment, HealthConfig, RateLimitConfig, ServerConfig,
    UploadsConfig,
};
use secrecy::SecretString;

/// Secret used by [`ConfigBuilder::with_auth`]
pub const TEST_SECRET: &str = "integration-test-secret";

/// Sign a token for `subject` with [`TEST_SECRET`]
pub fn token(subject: &str, ttl: chrono::Duration) -> String {
    TokenVerifier::new(&SecretString::from(TEST_SECRET))
        .issue(
            SessionClaims {
                subject: subject.to_owned(),
                team: None,
            },
            ttl,
        )
        .expect("token signs")
}

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                    ..ServerConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Render debug detail into error responses
    pub fn development(mut self) -> Self {
        self.config.environment = Environment::Development;
        self
    }

    /// Require bearer tokens signed with [`TEST_SECRET`]
    pub fn with_auth(mut self) -> Self {
        self.config.auth = Some(AuthConfig {
            enabled: true,
            secret: SecretString::from(TEST_SECRET),
            public_paths: vec!["/health".to_owned()],
        });
        self
    }

    /// Point the pool at `url`, giving up on connections after `connect_timeout`
    pub fn with_database(mut self, url: &str, connect_timeout: &str) -> Self {
        self.config.database = Some(DatabaseConfig {
            url: SecretString::from(url),
            max_connections: 2,
            connect_timeout: connect_timeout.to_owned(),
        });
        self
    }

    pub fn with_upload_limits(mut self, max_file_size: u64, max_files: usize) -> Self {
        self.config.uploads = UploadsConfig {
            max_file_size,
            max_files,
        };
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Set rate limit configuration
    pub fn with_rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.config.server.rate_limit = Some(config);
        self
    }

    /// Trust `hops` proxies' forwarding headers
    pub fn with_trusted_hops(mut self, hops: usize) -> Self {
        self.config.server.client_ip = Some(ClientIpConfig {
            trusted_hops: Some(hops),
        });
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
