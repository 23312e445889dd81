//! REST client module for the remote user collection.
//!
//! `ApiClient` talks to a JSONPlaceholder-style `/users` endpoint. The
//! controller never names the client directly; it goes through the
//! `UserSource` trait so the collection can come from anything that can
//! list and delete users.

pub mod client;
pub mod error;

use async_trait::async_trait;

pub use client::ApiClient;
pub use error::ApiError;

use crate::models::{UserId, UserRecord};

/// Remote side of the directory: the source of truth the mirror caches.
#[async_trait]
pub trait UserSource: Send + Sync {
    /// Fetch the full collection, in the order the remote returns it.
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, ApiError>;

    /// Ask the remote to delete a user. Success carries no body.
    async fn delete_user(&self, id: UserId) -> Result<(), ApiError>;
}
