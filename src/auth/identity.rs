use uuid::Uuid;

use super::{AuthError, jwt::Claims};
use crate::{authz::Actor, models::Role};

/// The authenticated caller, inserted into request extensions by the auth
/// middleware and read by handlers via `Extension<Identity>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub full_name: String,
}

impl Identity {
    /// The policy-facing view of this caller.
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}

impl TryFrom<Claims> for Identity {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            tracing::debug!(sub = %claims.sub, "Token subject is not a UUID");
            AuthError::InvalidToken
        })?;

        Ok(Self {
            user_id,
            username: claims.username,
            role: claims.role,
            full_name: claims.full_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            username: "admin".to_string(),
            role: Role::Admin,
            full_name: "Administrator".to_string(),
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn test_identity_from_claims() {
        let id = Uuid::new_v4();
        let identity = Identity::try_from(claims(&id.to_string())).unwrap();

        assert_eq!(identity.user_id, id);
        assert_eq!(identity.actor(), Actor::new(id, Role::Admin));
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        assert!(matches!(
            Identity::try_from(claims("42")),
            Err(AuthError::InvalidToken)
        ));
    }
}
