//! Session tokens: HS256-signed JWTs carrying the account's identity and role.
//!
//! Tokens are not refreshable and there is no revocation list; a token is valid
//! until its `exp` passes.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::{
    config::{AuthConfig, ConfigError},
    models::{Role, User},
};

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub full_name: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Issues and validates session tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Build an issuer from the `[auth]` section. Fails if no secret is configured.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.require_secret()?, config.token_ttl_secs))
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Sign a token for `user`, valid for the configured lifetime.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            full_name: user.full_name.clone(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry and return the claims.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "JWT validation failed");
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                    _ => AuthError::InvalidToken,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    const SECRET: &str = "test-secret-with-enough-bytes";

    fn sample_user(role: Role) -> User {
        let now = chrono::Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "rina".to_string(),
            email: "rina@example.com".to_string(),
            full_name: "Rina Wati".to_string(),
            role,
            profile_image: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let issuer = TokenIssuer::new(SECRET, 86_400);
        let user = sample_user(Role::Teacher);

        let token = issuer.issue(&user).unwrap();
        let claims = issuer.validate(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.username, "rina");
        assert_eq!(claims.role, Role::Teacher);
        assert_eq!(claims.full_name, "Rina Wati");
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenIssuer::new(SECRET, 3600);
        let other = TokenIssuer::new("a-completely-different-secret", 3600);
        let token = issuer.issue(&sample_user(Role::Student)).unwrap();

        assert!(matches!(
            other.validate(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let issuer = TokenIssuer::new(SECRET, 3600);
        assert!(matches!(
            issuer.validate("not.a.jwt"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token() {
        let issuer = TokenIssuer::new(SECRET, 3600);
        let now = chrono::Utc::now().timestamp() as u64;

        // One second past expiry is already too late.
        for exp in [now - 3_600, now - 1] {
            let claims = Claims {
                sub: Uuid::new_v4().to_string(),
                username: "old".to_string(),
                role: Role::Student,
                full_name: "Old Session".to_string(),
                iat: now - 90_000,
                exp,
            };
            let token = encode(
                &Header::new(Algorithm::HS256),
                &claims,
                &EncodingKey::from_secret(SECRET.as_bytes()),
            )
            .unwrap();

            assert!(
                matches!(issuer.validate(&token), Err(AuthError::ExpiredToken)),
                "exp = now - {}",
                now - exp
            );
        }
    }

    #[test]
    fn test_from_config_requires_secret() {
        let config = AuthConfig::default();
        assert!(TokenIssuer::from_config(&config).is_err());

        let config = AuthConfig {
            jwt_secret: Some(SECRET.to_string()),
            ..Default::default()
        };
        let issuer = TokenIssuer::from_config(&config).unwrap();
        assert_eq!(issuer.ttl_secs(), 86_400);
    }
}
