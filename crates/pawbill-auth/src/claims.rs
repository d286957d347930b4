//! JWT Claims structure
//!
//! Defines the claims structure used in JWT tokens for authentication.

use chrono::{Duration, Utc};
use pawbill_core::models::UserRole;
use pawbill_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims
///
/// Standard claims used in JWT tokens for user authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// User email
    pub email: String,

    /// User role
    pub role: UserRole,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create new claims for a user
    ///
    /// # Examples
    ///
    /// ```
    /// use pawbill_auth::Claims;
    /// use pawbill_core::models::UserRole;
    /// use uuid::Uuid;
    ///
    /// let id = Uuid::new_v4();
    /// let claims = Claims::new(id, "admin@example.com", UserRole::Admin);
    /// assert_eq!(claims.sub, id.to_string());
    /// assert_eq!(claims.role, UserRole::Admin);
    /// ```
    pub fn new(user_id: Uuid, email: &str, role: UserRole) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: 0, // Will be set by JwtService
        }
    }

    /// Create new claims with custom expiration duration
    pub fn with_expiration(
        user_id: Uuid,
        email: &str,
        role: UserRole,
        expires_in_secs: i64,
    ) -> Self {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp();
        self.exp <= now
    }

    /// Parse the user id from the subject
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::InvalidToken(format!("Malformed subject: {}", self.sub)))
    }

    /// Get the user role
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Check if user has admin privileges
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_creation() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, "owner@example.com", UserRole::Owner);
        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.email, "owner@example.com");
        assert_eq!(claims.role, UserRole::Owner);
        assert!(claims.iat > 0);
    }

    #[test]
    fn test_claims_with_expiration() {
        let claims =
            Claims::with_expiration(Uuid::new_v4(), "admin@example.com", UserRole::Admin, 3600);
        assert!(!claims.is_expired());

        let now = Utc::now().timestamp();
        assert!(claims.exp > now);
        assert!(claims.exp <= now + 3600);
    }

    #[test]
    fn test_expired_claims() {
        let mut claims = Claims::new(Uuid::new_v4(), "owner@example.com", UserRole::Owner);
        claims.exp = (Utc::now() - Duration::hours(1)).timestamp();
        assert!(claims.is_expired());
    }

    #[test]
    fn test_role_checks() {
        let owner_claims = Claims::new(Uuid::new_v4(), "owner@example.com", UserRole::Owner);
        assert!(!owner_claims.is_admin());

        let admin_claims = Claims::new(Uuid::new_v4(), "admin@example.com", UserRole::Admin);
        assert!(admin_claims.is_admin());
    }

    #[test]
    fn test_user_id_roundtrip() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, "owner@example.com", UserRole::Owner);
        assert_eq!(claims.user_id().unwrap(), id);
    }

    #[test]
    fn test_malformed_subject() {
        let mut claims = Claims::new(Uuid::new_v4(), "owner@example.com", UserRole::Owner);
        claims.sub = "not-a-uuid".to_string();
        assert!(matches!(claims.user_id(), Err(AppError::InvalidToken(_))));
    }
}
