#![allow(clippy::must_use_candidate)]

pub mod auth;
pub mod client_ip;
pub mod cors;
pub mod database;
mod env;
pub mod health;
mod loader;
pub mod rate_limit;
pub mod server;
pub mod telemetry;
pub mod uploads;

use serde::Deserialize;

pub use auth::*;
pub use client_ip::*;
pub use cors::*;
pub use database::*;
pub use health::*;
pub use rate_limit::*;
pub use server::*;
pub use telemetry::*;
pub use uploads::*;

/// Top-level Launchpad API configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Runtime mode; development responses carry debug detail
    #[serde(default)]
    pub environment: Environment,
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Bearer token verification
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    /// Postgres connection, if any
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// Multipart upload limits
    #[serde(default)]
    pub uploads: UploadsConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}

/// Deployment mode of the running service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Errors are reduced to the public envelope
    #[default]
    Production,
    /// Errors also carry the cause chain and raw error
    Development,
}

impl Environment {
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}
