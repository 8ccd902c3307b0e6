//! Request and response types for the routines API.
//!
//! These types mirror the server's API contract.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Routines
// ─────────────────────────────────────────────────────────────────────────────

/// A scheduled activity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    /// Server-assigned ID.
    pub id: i64,
    /// Routine title.
    pub title: String,
    /// Free-form time of day (e.g. "09:00 AM").
    #[serde(default)]
    pub time: Option<String>,
    /// Optional section this routine belongs to.
    #[serde(default)]
    pub section_id: Option<i64>,
    /// Creation time (ISO 8601).
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Request to create a routine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutineCreate {
    /// Routine title.
    pub title: String,
    /// Free-form time of day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Section to file the routine under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<i64>,
}

impl RoutineCreate {
    /// Create a request with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_section(mut self, section_id: i64) -> Self {
        self.section_id = Some(section_id);
        self
    }
}

/// Partial update of a routine. Only fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutineUpdate {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New time of day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// New section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<i64>,
}

impl RoutineUpdate {
    /// True when the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.time.is_none() && self.section_id.is_none()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────────

/// Response from `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` when the API is up.
    pub status: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Database connectivity as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbConnectionStatus {
    Connected,
    Error,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Response from `GET /db-health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbHealthResponse {
    pub status: DbConnectionStatus,
    /// Database name or driver.
    #[serde(default)]
    pub database: String,
    /// Round-trip time of the probe query. Meaningful only when connected.
    #[serde(default)]
    pub latency_ms: Option<f64>,
    /// Rows returned by the probe query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_sampled: Option<u64>,
    /// Extra diagnostic text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
