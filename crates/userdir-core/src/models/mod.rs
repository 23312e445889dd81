//! Data models for user directory entities.
//!
//! - `UserRecord`: a user as returned by the remote collection
//! - `NewUser`: form input for a record that has no identifier yet
//! - `UserUpdate`: partial replacement of a record's editable fields

pub mod user;

pub use user::{NewUser, UserId, UserRecord, UserUpdate};
