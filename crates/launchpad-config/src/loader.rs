use std::path::Path;

use secrecy::ExposeSecret;

use crate::{AnyOrList, Config, RequestRateLimit};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if placeholder expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_auth_config()?;
        self.validate_database_config()?;
        self.validate_upload_limits()?;
        self.validate_rate_limits()?;
        self.validate_cors()?;
        Ok(())
    }

    fn validate_cors(&self) -> anyhow::Result<()> {
        let Some(ref cors) = self.server.cors else {
            return Ok(());
        };

        let wildcard = [("origins", &cors.origins), ("methods", &cors.methods), ("headers", &cors.headers)]
            .into_iter()
            .find(|(_, value)| **value == AnyOrList::Any);

        if cors.credentials
            && let Some((name, _)) = wildcard
        {
            anyhow::bail!("server.cors.credentials cannot be combined with a wildcard in server.cors.{name}");
        }

        Ok(())
    }

    fn validate_auth_config(&self) -> anyhow::Result<()> {
        let Some(ref auth) = self.auth else {
            return Ok(());
        };

        if auth.enabled && auth.secret.expose_secret().is_empty() {
            anyhow::bail!("auth.secret must not be empty when auth is enabled");
        }

        Ok(())
    }

    fn validate_database_config(&self) -> anyhow::Result<()> {
        let Some(ref database) = self.database else {
            return Ok(());
        };

        if database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be greater than 0");
        }

        duration_str::parse(&database.connect_timeout)
            .map_err(|e| anyhow::anyhow!("invalid database.connect_timeout '{}': {e}", database.connect_timeout))?;

        Ok(())
    }

    fn validate_upload_limits(&self) -> anyhow::Result<()> {
        if self.uploads.max_file_size == 0 {
            anyhow::bail!("uploads.max_file_size must be greater than 0");
        }

        if self.uploads.max_files == 0 {
            anyhow::bail!("uploads.max_files must be greater than 0");
        }

        Ok(())
    }

    fn validate_rate_limits(&self) -> anyhow::Result<()> {
        let Some(ref rate_limit) = self.server.rate_limit else {
            return Ok(());
        };

        let limits = [("global", &rate_limit.global), ("per_ip", &rate_limit.per_ip)];
        for (name, limit) in limits {
            if let Some(RequestRateLimit { requests, window }) = limit {
                if *requests == 0 {
                    anyhow::bail!("server.rate_limit.{name}.requests must be greater than 0");
                }
                duration_str::parse(window)
                    .map_err(|e| anyhow::anyhow!("invalid server.rate_limit.{name}.window '{window}': {e}"))?;
            }
        }

        Ok(())
    }
}
