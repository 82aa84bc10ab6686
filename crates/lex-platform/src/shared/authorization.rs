//! Authorization
//!
//! `AuthContext` built from validated JWT claims, plus the role gates the
//! resource APIs call before touching data.

use crate::auth::auth_service::Claims;
use crate::shared::error::{PlatformError, Result};
use crate::user::entity::Role;

/// Authenticated caller identity, derived from token claims
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub verified: bool,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Result<Self> {
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| PlatformError::InvalidToken {
                message: format!("Unknown role in token: {}", claims.role),
            })?;

        Ok(Self {
            user_id: claims.sub.clone(),
            role,
            name: claims.name.clone(),
            email: claims.email.clone(),
            verified: claims.verified,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when the context is the given user or an admin
    pub fn is_self_or_admin(&self, user_id: &str) -> bool {
        self.user_id == user_id || self.is_admin()
    }
}

/// Role gates used by API handlers
pub mod checks {
    use super::*;

    pub fn require_role(ctx: &AuthContext, role: Role) -> Result<()> {
        if ctx.role == role {
            Ok(())
        } else {
            Err(PlatformError::forbidden(format!(
                "Requires {} role",
                role.as_str()
            )))
        }
    }

    pub fn require_admin(ctx: &AuthContext) -> Result<()> {
        require_role(ctx, Role::Admin)
    }

    pub fn require_client(ctx: &AuthContext) -> Result<()> {
        require_role(ctx, Role::Client)
    }

    pub fn require_advocate(ctx: &AuthContext) -> Result<()> {
        require_role(ctx, Role::Advocate)
    }

    pub fn require_intern(ctx: &AuthContext) -> Result<()> {
        require_role(ctx, Role::Intern)
    }

    pub fn require_self_or_admin(ctx: &AuthContext, user_id: &str) -> Result<()> {
        if ctx.is_self_or_admin(user_id) {
            Ok(())
        } else {
            Err(PlatformError::forbidden("Not allowed for this user"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(role: Role) -> AuthContext {
        AuthContext {
            user_id: "0TESTUSER0001".to_string(),
            role,
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            verified: true,
        }
    }

    #[test]
    fn test_role_gates() {
        let admin = context(Role::Admin);
        assert!(checks::require_admin(&admin).is_ok());
        assert!(checks::require_client(&admin).is_err());

        let client = context(Role::Client);
        assert!(checks::require_client(&client).is_ok());
        assert!(matches!(
            checks::require_advocate(&client),
            Err(PlatformError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_self_or_admin() {
        let client = context(Role::Client);
        assert!(checks::require_self_or_admin(&client, "0TESTUSER0001").is_ok());
        assert!(checks::require_self_or_admin(&client, "0OTHERUSER001").is_err());

        let admin = context(Role::Admin);
        assert!(checks::require_self_or_admin(&admin, "0OTHERUSER001").is_ok());
    }

    #[test]
    fn test_from_claims_rejects_unknown_role() {
        let claims = Claims {
            sub: "0TESTUSER0001".to_string(),
            role: "superuser".to_string(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            verified: false,
            iat: 0,
            exp: 0,
        };
        assert!(matches!(
            AuthContext::from_claims(&claims),
            Err(PlatformError::InvalidToken { .. })
        ));
    }
}
