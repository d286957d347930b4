//! Business logic services for PawBill
//!
//! This crate contains the billing engine that turns completed walks into
//! billing reports and CSV exports.
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - Each service owns its dependencies (repositories) behind trait bounds
//! - Services are wrapped in Arc for safe sharing across async tasks
//! - All operations are instrumented with tracing
//! - Comprehensive error handling with AppError
//!
//! The arithmetic core (rate resolution, rounding, record computation,
//! CSV rendering) is made of pure functions so it can be tested without
//! a database.

pub mod billing;

pub use billing::{
    BillingRecord, BillingReport, BillingService, BillingSummary, CsvExport,
};
