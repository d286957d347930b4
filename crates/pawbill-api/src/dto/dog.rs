//! Dog management DTOs

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Dog creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDogRequest {
    /// Dog name
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    /// Breed
    #[validate(length(max = 100, message = "Breed too long"))]
    pub breed: Option<String>,

    /// Age in years
    #[validate(range(min = 0, max = 40, message = "Age out of range"))]
    pub age: Option<i32>,

    /// Weight in kilograms
    pub weight: Option<Decimal>,

    /// Owning user
    pub owner_id: Uuid,

    /// Medical notes
    pub medical_notes: Option<String>,

    /// Emergency contact
    pub emergency_contact: Option<String>,

    /// Photo URL
    #[validate(url(message = "Invalid photo URL"))]
    pub photo_url: Option<String>,
}

/// Partial dog update
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateDogRequest {
    /// Dog name
    #[validate(length(min = 1, max = 100, message = "Name must not be empty"))]
    pub name: Option<String>,

    /// Breed
    #[validate(length(max = 100, message = "Breed too long"))]
    pub breed: Option<String>,

    /// Age in years
    #[validate(range(min = 0, max = 40, message = "Age out of range"))]
    pub age: Option<i32>,

    /// Weight in kilograms
    pub weight: Option<Decimal>,

    /// Owning user
    pub owner_id: Option<Uuid>,

    /// Medical notes
    pub medical_notes: Option<String>,

    /// Emergency contact
    pub emergency_contact: Option<String>,

    /// Photo URL
    #[validate(url(message = "Invalid photo URL"))]
    pub photo_url: Option<String>,
}

/// Dog list query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct DogQuery {
    /// Restrict to one owner (admin only; owners are always scoped)
    pub owner_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dog_request_validation() {
        let valid = CreateDogRequest {
            name: "Rex".to_string(),
            breed: Some("Labrador".to_string()),
            age: Some(4),
            weight: None,
            owner_id: Uuid::new_v4(),
            medical_notes: None,
            emergency_contact: None,
            photo_url: None,
        };
        assert!(valid.validate().is_ok());

        let invalid = CreateDogRequest {
            name: "".to_string(),
            breed: None,
            age: Some(99),
            weight: None,
            owner_id: Uuid::new_v4(),
            medical_notes: None,
            emergency_contact: None,
            photo_url: Some("not a url".to_string()),
        };
        assert!(invalid.validate().is_err());
    }
}
