//! Routines API.

use crate::client::{RequestOptions, RoutinesClient};
use crate::error::Result;
use crate::types::{Routine, RoutineCreate, RoutineUpdate};

/// Collection path, with `?limit=N` appended when a non-zero limit is given.
pub fn routines_path(limit: Option<u32>) -> String {
    match limit {
        Some(n) if n != 0 => format!("/api/routines/?limit={}", n),
        _ => "/api/routines/".to_string(),
    }
}

/// Routines API client.
///
/// Reads go out anonymously; writes go through the authenticated path.
pub struct RoutinesApi {
    client: RoutinesClient,
}

impl RoutinesApi {
    pub(crate) fn new(client: RoutinesClient) -> Self {
        Self { client }
    }

    /// List routines, optionally capped at `limit`.
    pub async fn list(&self, limit: Option<u32>) -> Result<Vec<Routine>> {
        self.client
            .request(&routines_path(limit), RequestOptions::get())
            .await
    }

    /// List the signed-in user's routines.
    ///
    /// Same endpoint as [`list`](Self::list), but with credentials so the
    /// server can scope the result.
    pub async fn list_own(&self, limit: Option<u32>) -> Result<Vec<Routine>> {
        self.client
            .authenticated_request(&routines_path(limit), RequestOptions::get())
            .await
    }

    /// Get a routine by ID.
    pub async fn get(&self, id: i64) -> Result<Routine> {
        self.client
            .request(&format!("/api/routines/{}", id), RequestOptions::get())
            .await
    }

    /// Create a new routine.
    pub async fn create(&self, request: &RoutineCreate) -> Result<Routine> {
        self.client
            .authenticated_request("/api/routines/", RequestOptions::post().json(request)?)
            .await
    }

    /// Update some fields of a routine.
    pub async fn update(&self, id: i64, request: &RoutineUpdate) -> Result<Routine> {
        self.client
            .authenticated_request(
                &format!("/api/routines/{}", id),
                RequestOptions::patch().json(request)?,
            )
            .await
    }

    /// Delete a routine, returning the deleted record.
    pub async fn delete(&self, id: i64) -> Result<Routine> {
        self.client
            .authenticated_request(&format!("/api/routines/{}", id), RequestOptions::delete())
            .await
    }
}
