use std::path::PathBuf;

use clap::Parser;

/// Launchpad API server
#[derive(Debug, Parser)]
#[command(name = "launchpad", about = "REST API for the Launchpad deployment platform")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "launchpad.toml", env = "LAUNCHPAD_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "LAUNCHPAD_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,

    /// Log filter directives, in `tracing_subscriber::EnvFilter` syntax
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_filter: String,
}
