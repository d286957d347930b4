//! PawBill Database Layer
//!
//! This crate provides PostgreSQL database access and repository implementations
//! for the PawBill system. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for all domain entities
//! - Transactional walk lifecycle transitions with status guards
//! - Joined billing queries feeding the billing engine

pub mod pool;
pub mod repositories;

pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use pawbill_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};
