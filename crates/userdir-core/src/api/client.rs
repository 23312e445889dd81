//! API client for the remote user collection.
//!
//! Requests are never retried. A failed fetch or delete is handed back to
//! the caller as an `ApiError` and the caller decides what it means.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{UserId, UserRecord};

use super::{ApiError, UserSource};

// ============================================================================
// Constants
// ============================================================================

/// Default base URL for the mock REST API.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// API client for a JSONPlaceholder-style user collection.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    fn user_url(&self, id: UserId) -> String {
        format!("{}/users/{}", self.base_url, id)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self.client.get(url).send().await?;
        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON from {}: {}", url, e)))
    }

    async fn delete(&self, url: &str) -> Result<(), ApiError> {
        let response = self.client.delete(url).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    /// Fetch every user in the remote collection
    pub async fn fetch_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        let url = self.users_url();
        debug!(url = %url, "Fetching users");

        let users: Vec<UserRecord> = self.get(&url).await.inspect_err(|e| {
            warn!(url = %url, error = %e, "Failed to fetch users");
        })?;

        debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    /// Delete a single user on the remote
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        let url = self.user_url(id);
        debug!(url = %url, id, "Deleting user");

        self.delete(&url).await.inspect_err(|e| {
            warn!(id, error = %e, "Failed to delete user");
        })
    }
}

#[async_trait]
impl UserSource for ApiClient {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        ApiClient::fetch_users(self).await
    }

    async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        ApiClient::delete_user(self, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3000/", Duration::from_secs(5))
            .expect("Failed to build client");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.users_url(), "http://localhost:3000/users");
        assert_eq!(client.user_url(7), "http://localhost:3000/users/7");
    }
}
