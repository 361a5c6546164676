//! Configuration management.
//!
//! Handles loading configuration from a TOML file and resolving the
//! database connection string from CLI arguments, the config file and
//! environment variables.

use crate::error::{AnalystError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variables consulted for the connection string, in order.
pub const CONNECTION_ENV_VARS: &[&str] = &["DATABASE_URL", "POSTGRES_URL"];

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Postgres connection string, e.g. `postgres://reader@localhost:5432/app`.
    pub url: Option<String>,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sql-analyst")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalystError::configuration(format!("Failed to read config file: {e}"))
        })?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            AnalystError::configuration(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Resolves the connection string from the process environment.
    ///
    /// See [`Config::resolve_connection_string_with`].
    pub fn resolve_connection_string(&self, cli_value: Option<&str>) -> Result<Option<String>> {
        self.resolve_connection_string_with(cli_value, |name| std::env::var(name).ok())
    }

    /// Resolves the connection string with precedence:
    /// 1. CLI argument (highest)
    /// 2. `[database] url` from the config file
    /// 3. Environment variables in [`CONNECTION_ENV_VARS`] order
    ///
    /// Absence is not an error here; it surfaces when a query first runs.
    pub fn resolve_connection_string_with<F>(
        &self,
        cli_value: Option<&str>,
        env: F,
    ) -> Result<Option<String>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolved = cli_value
            .map(str::to_string)
            .or_else(|| self.database.url.clone())
            .or_else(|| CONNECTION_ENV_VARS.iter().find_map(|name| env(*name)))
            .filter(|s| !s.trim().is_empty());

        if let Some(conn_str) = &resolved {
            validate_connection_string(conn_str)?;
        }

        Ok(resolved)
    }
}

/// Checks that a connection string is a Postgres URL.
pub fn validate_connection_string(conn_str: &str) -> Result<()> {
    let url = Url::parse(conn_str)
        .map_err(|e| AnalystError::configuration(format!("Invalid connection string: {e}")))?;

    if url.scheme() != "postgres" && url.scheme() != "postgresql" {
        return Err(AnalystError::configuration(format!(
            "Invalid scheme '{}'. Expected 'postgres' or 'postgresql'",
            url.scheme()
        )));
    }

    Ok(())
}

/// Returns a display-safe form of a connection string (no password).
pub fn display_connection_string(conn_str: &str) -> String {
    match Url::parse(conn_str) {
        Ok(url) => {
            let host = url.host_str().unwrap_or("localhost");
            let port = url.port().unwrap_or(5432);
            let database = url.path().strip_prefix('/').unwrap_or("");
            let database = if database.is_empty() { "unknown" } else { database };
            format!("{database} @ {host}:{port}")
        }
        Err(_) => "<invalid connection string>".to_string(),
    }
}
