use secrecy::SecretString;
use serde::Deserialize;

/// Bearer token verification configuration
///
/// Tokens are HS256-signed JWTs; only signature and expiry are checked.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Whether protected routes require a bearer token
    #[serde(default)]
    pub enabled: bool,

    /// HMAC secret the tokens are signed with
    pub secret: SecretString,

    /// Path prefixes that skip authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_public_paths() -> Vec<String> {
    vec!["/health".to_string()]
}
