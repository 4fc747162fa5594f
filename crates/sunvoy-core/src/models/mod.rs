//! Data models extracted from the site.
//!
//! - `UserRecord`: one user, from either a listing card or the settings form

pub mod user;

pub use user::UserRecord;
