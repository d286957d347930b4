//! Dog model
//!
//! Represents a dog registered with the walking service, owned by exactly
//! one owner. Deleting a dog cascades its rates and attendances.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dog entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dog {
    /// Unique identifier
    pub id: Uuid,

    /// Dog's name
    pub name: String,

    /// Breed
    pub breed: Option<String>,

    /// Age in years
    pub age: Option<i32>,

    /// Weight in kilograms
    pub weight: Option<Decimal>,

    /// Owning user ID
    pub owner_id: Uuid,

    /// Owner details (populated on joined queries)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerInfo>,

    /// Medical notes for the walker
    pub medical_notes: Option<String>,

    /// Emergency contact
    pub emergency_contact: Option<String>,

    /// Photo URL
    pub photo_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Dog {
    /// Check whether this dog belongs to the given user
    #[inline]
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

impl Default for Dog {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            breed: None,
            age: None,
            weight: None,
            owner_id: Uuid::new_v4(),
            owner: None,
            medical_notes: None,
            emergency_contact: None,
            photo_url: None,
            created_at: Utc::now(),
        }
    }
}

/// Minimal owner details embedded in dog and walk responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerInfo {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl OwnerInfo {
    /// Owner's full name as rendered in reports
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
