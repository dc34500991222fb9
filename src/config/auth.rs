use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Environment variable consulted when `auth.jwt_secret` is not set in the file.
pub const JWT_SECRET_ENV_VAR: &str = "JWT_SECRET";

const MIN_SECRET_LEN: usize = 16;

/// Session token and account bootstrap configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens (HS256).
    ///
    /// Required to serve. Usually `"${JWT_SECRET}"`.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Token lifetime in seconds. Tokens are not refreshable.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// Create the default admin and teacher accounts when no admin exists.
    #[serde(default = "default_seed")]
    pub seed_default_accounts: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: default_token_ttl(),
            seed_default_accounts: default_seed(),
        }
    }
}

impl AuthConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secret) = &self.jwt_secret
            && secret.len() < MIN_SECRET_LEN
        {
            return Err(ConfigError::Validation(format!(
                "auth.jwt_secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if self.token_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "auth.token_ttl_secs cannot be 0".into(),
            ));
        }
        Ok(())
    }

    /// The signing secret, or a validation error when none was configured.
    pub fn require_secret(&self) -> Result<&str, ConfigError> {
        self.jwt_secret.as_deref().ok_or_else(|| {
            ConfigError::Validation(format!(
                "auth.jwt_secret is not configured (set it in the config file or via {})",
                JWT_SECRET_ENV_VAR
            ))
        })
    }
}

fn default_token_ttl() -> u64 {
    24 * 60 * 60
}

fn default_seed() -> bool {
    true
}
