//! Repository implementations
//!
//! This module contains concrete implementations of all repository traits
//! defined in pawbill-core, using sqlx for PostgreSQL access.

pub mod billing_repo;
pub mod dog_repo;
pub mod invitation_repo;
pub mod rate_repo;
pub mod user_repo;
pub mod walk_repo;

pub use billing_repo::PgBillingRepository;
pub use dog_repo::PgDogRepository;
pub use invitation_repo::PgInvitationRepository;
pub use rate_repo::PgRateRepository;
pub use user_repo::PgUserRepository;
pub use walk_repo::PgWalkRepository;
