//! Invitation DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Invitation creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvitationRequest {
    /// Email address to invite
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Public invitation validation response
#[derive(Debug, Clone, Serialize)]
pub struct ValidateInvitationResponse {
    /// Whether the token can still be used
    pub valid: bool,

    /// Invited email, present when valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Rejection reason, present when invalid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidateInvitationResponse {
    /// A usable invitation
    pub fn valid(email: String) -> Self {
        Self {
            valid: true,
            email: Some(email),
            reason: None,
        }
    }

    /// An unusable invitation with a reason
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            email: None,
            reason: Some(reason.into()),
        }
    }
}
