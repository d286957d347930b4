//! Invitation model
//!
//! Registration is gated by single-use, time-limited invitation tokens
//! issued by administrators.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    /// Unique identifier
    pub id: Uuid,

    /// Email the invitation was issued for
    pub email: String,

    /// Opaque single-use token
    pub token: String,

    /// Administrator who issued the invitation
    pub created_by: Uuid,

    /// When the invitation was consumed, if ever
    pub used_at: Option<DateTime<Utc>>,

    /// Expiry instant
    pub expires_at: DateTime<Utc>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    /// Whether the invitation has been consumed
    #[inline]
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Whether the invitation has expired
    #[inline]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Usable: neither consumed nor expired
    pub fn is_valid(&self) -> bool {
        !self.is_used() && !self.is_expired()
    }
}

impl Default for Invitation {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: String::new(),
            token: String::new(),
            created_by: Uuid::new_v4(),
            used_at: None,
            expires_at: now + Duration::days(7),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_invitation_is_valid() {
        let invitation = Invitation::default();
        assert!(invitation.is_valid());
    }

    #[test]
    fn test_used_invitation_is_invalid() {
        let invitation = Invitation {
            used_at: Some(Utc::now()),
            ..Default::default()
        };
        assert!(invitation.is_used());
        assert!(!invitation.is_valid());
    }

    #[test]
    fn test_expired_invitation_is_invalid() {
        let invitation = Invitation {
            expires_at: Utc::now() - Duration::hours(1),
            ..Default::default()
        };
        assert!(invitation.is_expired());
        assert!(!invitation.is_valid());
    }
}
