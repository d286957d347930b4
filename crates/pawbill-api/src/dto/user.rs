//! User management DTOs

use serde::Deserialize;
use validator::Validate;

/// Partial user update (name and phone only)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// First name
    #[validate(length(min = 1, max = 100, message = "First name must not be empty"))]
    pub first_name: Option<String>,

    /// Last name
    #[validate(length(min = 1, max = 100, message = "Last name must not be empty"))]
    pub last_name: Option<String>,

    /// Phone number
    #[validate(length(max = 50, message = "Phone number too long"))]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_user_request_validation() {
        let valid = UpdateUserRequest {
            first_name: Some("Anna".to_string()),
            last_name: None,
            phone: Some("+49 151 1234567".to_string()),
        };
        assert!(valid.validate().is_ok());

        let invalid = UpdateUserRequest {
            first_name: Some("".to_string()),
            last_name: None,
            phone: None,
        };
        assert!(invalid.validate().is_err());
    }
}
