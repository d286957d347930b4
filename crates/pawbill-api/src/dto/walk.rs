//! Walk scheduling DTOs

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Walk creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWalkRequest {
    /// Calendar date of the walk
    pub date: NaiveDate,

    /// Dogs on the roster
    #[validate(length(min = 1, message = "At least one dog is required"))]
    pub dog_ids: Vec<Uuid>,

    /// Free-form notes
    pub notes: Option<String>,
}

/// Partial walk update
///
/// Passing `dog_ids` replaces the whole roster; rows for dogs no longer
/// listed are removed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWalkRequest {
    /// Calendar date of the walk
    pub date: Option<NaiveDate>,

    /// Free-form notes
    pub notes: Option<String>,

    /// Replacement roster
    #[validate(length(min = 1, message = "Roster must not be empty"))]
    pub dog_ids: Option<Vec<Uuid>>,
}

/// Walk list query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct WalkQuery {
    /// Earliest walk date (inclusive)
    pub start_date: Option<NaiveDate>,

    /// Latest walk date (inclusive)
    pub end_date: Option<NaiveDate>,

    /// Only walks with this dog on the roster
    pub dog_id: Option<Uuid>,
}

/// Attendance flag update
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceUpdateRequest {
    /// Whether the dog took part in the walk
    pub attended: bool,
}
