//! Domain models for PawBill
//!
//! This module contains all the core domain models used throughout the application.

pub mod dog;
pub mod invitation;
pub mod rate;
pub mod user;
pub mod walk;

pub use dog::{Dog, OwnerInfo};
pub use invitation::Invitation;
pub use rate::Rate;
pub use user::{User, UserInfo, UserRole};
pub use walk::{Attendance, Walk, WalkStatus};
