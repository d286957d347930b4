//! Common traits for repositories and services
//!
//! Defines abstractions for database access and business logic.

use crate::error::AppError;
use crate::models::{Dog, Invitation, Rate, User, Walk};
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

/// Generic repository trait for CRUD operations
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities
    async fn find_all(&self) -> Result<Vec<T>, AppError>;

    /// Create a new entity
    async fn create(&self, entity: &T) -> Result<T, AppError>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> Result<T, AppError>;

    /// Delete entity by ID
    async fn delete(&self, id: ID) -> Result<bool, AppError>;
}

/// User repository trait with specialized methods
#[async_trait]
pub trait UserRepository: Repository<User, Uuid> {
    /// Find user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
}

/// Dog repository trait with specialized methods
#[async_trait]
pub trait DogRepository: Repository<Dog, Uuid> {
    /// List dogs, optionally scoped to one owner
    async fn list_filtered(&self, owner_id: Option<Uuid>) -> Result<Vec<Dog>, AppError>;

    /// IDs of all dogs belonging to an owner
    async fn ids_for_owner(&self, owner_id: Uuid) -> Result<Vec<Uuid>, AppError>;
}

/// Rate repository trait
///
/// Rates are append-only: create, delete, and read, never update.
#[async_trait]
pub trait RateRepository: Send + Sync {
    /// Find rate by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Rate>, AppError>;

    /// List rates, optionally scoped to one dog, newest effective date first
    async fn list_filtered(&self, dog_id: Option<Uuid>) -> Result<Vec<Rate>, AppError>;

    /// Append a new rate entry
    async fn create(&self, rate: &Rate) -> Result<Rate, AppError>;

    /// Delete a rate entry
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Walk repository trait covering the walk lifecycle
///
/// All multi-row writes (creation with roster, roster replacement,
/// completion) execute as single transactions. Lifecycle transitions are
/// compare-and-swap on status, so concurrent conflicting calls resolve to
/// one winner and one Conflict.
#[async_trait]
pub trait WalkRepository: Send + Sync {
    /// Find a walk with its attendance roster
    async fn find_with_attendances(&self, id: Uuid) -> Result<Option<Walk>, AppError>;

    /// List walks with rosters, filtered by date range and/or participating dogs
    async fn list_filtered(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        dog_ids: Option<&[Uuid]>,
    ) -> Result<Vec<Walk>, AppError>;

    /// Create a walk in Scheduled state with a fresh roster
    async fn create_with_roster(
        &self,
        date: NaiveDate,
        admin_id: Uuid,
        notes: Option<&str>,
        dog_ids: &[Uuid],
    ) -> Result<Walk, AppError>;

    /// Patch scalar fields (date, notes)
    async fn update_details(
        &self,
        id: Uuid,
        date: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> Result<Walk, AppError>;

    /// Destructively replace the attendance roster
    async fn replace_roster(&self, id: Uuid, dog_ids: &[Uuid]) -> Result<Walk, AppError>;

    /// Scheduled -> InProgress, stamping start_time
    async fn start(&self, id: Uuid) -> Result<Walk, AppError>;

    /// InProgress -> Completed, stamping end_time and attended durations
    async fn complete(&self, id: Uuid) -> Result<Walk, AppError>;

    /// Any non-terminal state -> Cancelled
    async fn cancel(&self, id: Uuid) -> Result<Walk, AppError>;

    /// Mark a dog present/absent; rejected on terminal walks
    async fn set_attendance(
        &self,
        walk_id: Uuid,
        dog_id: Uuid,
        attended: bool,
    ) -> Result<Walk, AppError>;

    /// Delete a walk and its attendances
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Invitation repository trait
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// List all invitations, newest first
    async fn find_all(&self) -> Result<Vec<Invitation>, AppError>;

    /// Find invitation by its token
    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, AppError>;

    /// Find a usable (unused, unexpired) invitation for an email
    async fn find_active_for_email(&self, email: &str) -> Result<Option<Invitation>, AppError>;

    /// Create an invitation
    async fn create(&self, invitation: &Invitation) -> Result<Invitation, AppError>;

    /// Mark an invitation consumed
    async fn mark_used(&self, id: Uuid) -> Result<(), AppError>;

    /// Delete an invitation
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Billing query: inclusive date range plus optional dog/owner filters
#[derive(Debug, Clone)]
pub struct BillingQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub dog_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
}

/// One attendance row qualifying for billing, joined with walk and dog data
#[derive(Debug, Clone)]
pub struct BillableRow {
    pub dog_id: Uuid,
    pub dog_name: String,
    pub owner_name: String,
    pub walk_date: NaiveDate,
    pub duration_minutes: i32,
}

/// Billing repository trait
#[async_trait]
pub trait BillingRepository: Send + Sync {
    /// Fetch qualifying attendance rows: completed walk in range,
    /// attended, duration recorded, optional filters applied.
    /// Ordered descending by walk date (stable retrieval order).
    async fn list_billable(&self, query: &BillingQuery) -> Result<Vec<BillableRow>, AppError>;

    /// Rate history for the given dogs, ordered per dog by
    /// effective_from descending then created_at descending.
    async fn rate_history(&self, dog_ids: &[Uuid]) -> Result<Vec<Rate>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_query_range() {
        let query = BillingQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            dog_id: None,
            owner_id: None,
        };
        assert!(query.start_date <= query.end_date);
    }
}
