//! Data Transfer Objects (DTOs) for API requests and responses

pub mod auth;
pub mod billing;
pub mod common;
pub mod dog;
pub mod invitation;
pub mod rate;
pub mod user;
pub mod walk;

pub use auth::*;
pub use billing::*;
pub use common::*;
pub use dog::*;
pub use invitation::*;
pub use rate::*;
pub use user::*;
pub use walk::*;
