//! HTTP request handlers

pub mod auth;
pub mod billing;
pub mod dog;
pub mod invitation;
pub mod rate;
pub mod user;
pub mod walk;

pub use auth::configure as configure_auth;
pub use billing::configure as configure_billing;
pub use dog::configure as configure_dogs;
pub use invitation::configure as configure_invitations;
pub use rate::configure as configure_rates;
pub use user::configure as configure_users;
pub use walk::configure as configure_walks;
