use std::sync::Arc;

use serde::Serialize;
use validator::Validate;

use super::{ServiceResult, hash_in_background};
use crate::{
    auth::{AuthError, Identity, TokenIssuer, password},
    db::{DbError, DbPool},
    models::{NewUser, RegisterUser, Role, User},
};

/// Accounts created on first start when no admin exists.
const DEFAULT_ACCOUNTS: &[(&str, &str, &str, &str, Role)] = &[
    (
        "admin",
        "admin@lms.local",
        "admin123",
        "Administrator",
        Role::Admin,
    ),
    (
        "teacher1",
        "teacher1@lms.local",
        "teacher123",
        "Teacher One",
        Role::Teacher,
    ),
];

/// A successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Registration, login and token verification.
#[derive(Clone)]
pub struct AuthService {
    db: Arc<DbPool>,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(db: Arc<DbPool>, tokens: TokenIssuer) -> Self {
        Self { db, tokens }
    }

    /// Self-service registration. The account is always a student.
    pub async fn register(&self, input: RegisterUser) -> ServiceResult<User> {
        input.validate()?;

        let password_hash = hash_in_background(input.password).await?;
        let user = self
            .db
            .users()
            .create(NewUser {
                username: input.username,
                email: input.email,
                password_hash,
                full_name: input.full_name,
                role: Role::Student,
            })
            .await?;

        tracing::info!(user_id = %user.id, "Student registered");
        Ok(user)
    }

    /// Exchange a username and password for a session token.
    ///
    /// An unknown username and a wrong password produce the same error.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<LoginOutcome> {
        let credentials = self.db.users().get_credentials(username).await?;

        let candidate = password.to_string();
        let stored = credentials.as_ref().map(|c| c.password_hash.clone());
        let verified = tokio::task::spawn_blocking(move || match stored {
            Some(stored) => password::verify_password(&candidate, &stored),
            None => password::verify_against_dummy(&candidate),
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password check task failed: {}", e)))?;

        let Some(credentials) = credentials else {
            tracing::debug!(username, "Login for unknown username");
            return Err(AuthError::InvalidCredentials.into());
        };
        if !verified {
            tracing::debug!(username, "Login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(&credentials.user)?;
        tracing::info!(user_id = %credentials.user.id, "User logged in");
        Ok(LoginOutcome {
            token,
            user: credentials.user,
        })
    }

    /// Validate a bearer token and return the caller it identifies.
    pub fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.tokens.validate(token)?;
        Identity::try_from(claims)
    }

    /// Fresh account data for a token holder. The account may have been
    /// deleted since the token was issued.
    pub async fn verify(&self, identity: &Identity) -> ServiceResult<User> {
        Ok(self
            .db
            .users()
            .get_by_id(identity.user_id)
            .await?
            .ok_or(DbError::NotFound)?)
    }

    /// Create the default admin and teacher accounts if no admin exists yet.
    ///
    /// Returns the number of accounts created.
    pub async fn seed_default_accounts(&self) -> ServiceResult<usize> {
        let counts = self.db.users().count_by_role().await?;
        if counts.admin > 0 {
            return Ok(0);
        }

        let mut created = 0;
        for (username, email, password, full_name, role) in DEFAULT_ACCOUNTS {
            let password_hash = hash_in_background(password.to_string()).await?;
            let result = self
                .db
                .users()
                .create(NewUser {
                    username: username.to_string(),
                    email: email.to_string(),
                    password_hash,
                    full_name: full_name.to_string(),
                    role: *role,
                })
                .await;

            match result {
                Ok(user) => {
                    created += 1;
                    tracing::warn!(
                        username = %user.username,
                        role = %user.role,
                        "Created default account with a well-known password; change it"
                    );
                }
                Err(DbError::Conflict(_)) => {
                    tracing::info!(username, "Default account already exists, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(created)
    }
}
