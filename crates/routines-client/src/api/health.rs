//! Health API.

use crate::client::{RequestOptions, RoutinesClient};
use crate::error::Result;
use crate::types::{DbHealthResponse, HealthResponse};

/// Health API client.
///
/// Health endpoints live at the root and never carry credentials.
pub struct HealthApi {
    client: RoutinesClient,
}

impl HealthApi {
    pub(crate) fn new(client: RoutinesClient) -> Self {
        Self { client }
    }

    /// Check API liveness.
    pub async fn check(&self) -> Result<HealthResponse> {
        self.client.request("/health", RequestOptions::get()).await
    }

    /// Check the API's database dependency.
    pub async fn database(&self) -> Result<DbHealthResponse> {
        self.client.request("/db-health", RequestOptions::get()).await
    }

    /// Simple connectivity check - returns true if the API answers "ok".
    pub async fn is_healthy(&self) -> bool {
        self.check().await.map(|h| h.is_ok()).unwrap_or(false)
    }
}
