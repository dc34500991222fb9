//! Configuration module for the LMS server.
//!
//! The server is configured via a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [server]
//! port = 5000
//!
//! [database]
//! type = "sqlite"
//! path = "./data/lms.db"
//!
//! [auth]
//! jwt_secret = "${JWT_SECRET}"
//! ```

mod auth;
mod database;
mod observability;
mod server;
mod storage;

use std::path::Path;

pub use auth::*;
pub use database::*;
pub use observability::*;
use serde::{Deserialize, Serialize};
pub use server::*;
pub use storage::*;

/// Environment variable that overrides `server.port`.
pub const PORT_ENV_VAR: &str = "PORT";

/// Root configuration for the LMS server.
///
/// All sections are optional with defaults suitable for a single-node
/// deployment backed by a local SQLite file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LmsConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Token signing and account seeding.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Upload storage and per-kind upload limits.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl LmsConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing required variables will cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Load configuration from a file if it exists, otherwise fall back to defaults.
    ///
    /// Environment overrides are applied in both cases.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!(path = %path.as_ref().display(), "Config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;

        let mut config: LmsConfig = toml::from_str(&expanded).map_err(ConfigError::Parse)?;

        config.validate()?;

        Ok(config)
    }

    /// Apply `PORT` and `JWT_SECRET` from the process environment.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(port) = std::env::var(PORT_ENV_VAR) {
            self.server.port = port.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("{} must be a valid port, got '{}'", PORT_ENV_VAR, port))
            })?;
        }
        if self.auth.jwt_secret.is_none()
            && let Ok(secret) = std::env::var(JWT_SECRET_ENV_VAR)
        {
            self.auth.jwt_secret = Some(secret);
        }
        Ok(())
    }

    /// Validate the configuration for consistency and completeness.
    fn validate(&mut self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Expand `${VAR}` references, skipping anything after a `#` on the same line.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| ConfigError::Validation(format!("Invalid interpolation pattern: {}", e)))?;
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');
        let mut last_end = 0;

        for cap in re.captures_iter(line) {
            let Some(whole) = cap.get(0) else {
                continue;
            };

            if let Some(pos) = comment_pos
                && whole.start() >= pos
            {
                continue;
            }

            result.push_str(&line[last_end..whole.start()]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            result.push_str(&value);

            last_end = whole.end();
        }

        result.push_str(&line[last_end..]);
        result.push('\n');
    }

    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}
