//! API layer for PawBill
//!
//! HTTP API handlers for authentication, dog and user management, walk
//! scheduling, rates and billing.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

// Re-export DTOs (common types)
pub use dto::ApiResponse;

// Re-export handler configuration functions
pub use handlers::{
    configure_auth, configure_billing, configure_dogs, configure_invitations, configure_rates,
    configure_users, configure_walks,
};
