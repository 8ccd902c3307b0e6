//! Background health monitor.
//!
//! Polls `/health` and `/db-health` on a fixed interval and folds both
//! answers into one [`HealthSnapshot`]. Each poll is a two-step state
//! machine: the API step either short-circuits with a final snapshot or lets
//! the database step run.
//!
//! Errors never escape the monitor; they become display state.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::RoutinesClient;
use crate::error::Result;
use crate::types::{DbConnectionStatus, DbHealthResponse, HealthResponse};

/// Default time between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Shortest interval the monitor accepts.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// State of one monitored component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// No poll has finished yet.
    Loading,
    Ok,
    Warning,
    Error,
}

impl ComponentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Loading => "loading",
            ComponentStatus::Ok => "ok",
            ComponentStatus::Warning => "warning",
            ComponentStatus::Error => "error",
        }
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combined result of one poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSnapshot {
    pub api: ComponentStatus,
    pub db: ComponentStatus,
    /// Database probe latency in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Default for HealthSnapshot {
    fn default() -> Self {
        Self {
            api: ComponentStatus::Loading,
            db: ComponentStatus::Loading,
            latency_ms: None,
            error_message: None,
        }
    }
}

impl HealthSnapshot {
    fn api_down(message: String) -> Self {
        Self {
            api: ComponentStatus::Error,
            db: ComponentStatus::Error,
            latency_ms: None,
            error_message: Some(message),
        }
    }

    /// One-line description of the overall state.
    pub fn summary(&self) -> &'static str {
        summarize(self.api, self.db)
    }
}

/// Composite display text. First matching rule wins.
pub fn summarize(api: ComponentStatus, db: ComponentStatus) -> &'static str {
    use ComponentStatus::*;

    match (api, db) {
        (Loading, _) | (_, Loading) => "Checking...",
        (Ok, Ok) => "All systems operational",
        (Error, _) => "API offline",
        (_, Error) => "Database issue",
        _ => "System degraded",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Poll state machine
// ─────────────────────────────────────────────────────────────────────────────

/// What the monitor needs from the API.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn api_health(&self) -> Result<HealthResponse>;
    async fn db_health(&self) -> Result<DbHealthResponse>;
}

#[async_trait]
impl HealthProbe for RoutinesClient {
    async fn api_health(&self) -> Result<HealthResponse> {
        self.health().check().await
    }

    async fn db_health(&self) -> Result<DbHealthResponse> {
        self.health().database().await
    }
}

/// Outcome of the first poll step.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiStep {
    /// API answered "ok"; the database step runs next.
    Reachable,
    /// API is down. The database is not checked and is reported as failed too.
    Unreachable(HealthSnapshot),
}

impl ApiStep {
    pub fn from_result(result: Result<HealthResponse>) -> Self {
        match result {
            Ok(health) if health.is_ok() => ApiStep::Reachable,
            Ok(health) => {
                tracing::warn!(status = %health.status, "Unexpected API health status");
                ApiStep::Unreachable(HealthSnapshot::api_down("API check failed".to_string()))
            }
            Err(e) => {
                tracing::warn!(error = %e, "API health check failed");
                ApiStep::Unreachable(HealthSnapshot::api_down(e.to_string()))
            }
        }
    }
}

/// Second poll step, only reached when the API is up.
pub fn db_step(result: Result<DbHealthResponse>) -> HealthSnapshot {
    let api = ComponentStatus::Ok;
    match result {
        Ok(db) => match db.status {
            DbConnectionStatus::Connected => HealthSnapshot {
                api,
                db: ComponentStatus::Ok,
                latency_ms: db.latency_ms,
                error_message: db.details,
            },
            DbConnectionStatus::Error => HealthSnapshot {
                api,
                db: ComponentStatus::Error,
                latency_ms: None,
                error_message: db.details,
            },
            DbConnectionStatus::Unknown => HealthSnapshot {
                api,
                db: ComponentStatus::Warning,
                latency_ms: db.latency_ms,
                error_message: db.details,
            },
        },
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            HealthSnapshot {
                api,
                db: ComponentStatus::Error,
                latency_ms: None,
                error_message: Some(e.to_string()),
            }
        }
    }
}

/// Run one full poll cycle.
pub async fn poll_once<P: HealthProbe + ?Sized>(probe: &P) -> HealthSnapshot {
    match ApiStep::from_result(probe.api_health().await) {
        ApiStep::Unreachable(snapshot) => snapshot,
        ApiStep::Reachable => db_step(probe.db_health().await),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Monitor
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to a running monitor.
///
/// Polls run one after another inside a single task, so results are
/// published in order. Dropping the handle stops polling.
pub struct HealthMonitor {
    task: Option<JoinHandle<()>>,
    rx: watch::Receiver<HealthSnapshot>,
}

impl HealthMonitor {
    /// Start polling: once right away, then every `interval`.
    pub fn spawn<P: HealthProbe + 'static>(probe: P, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(HealthSnapshot::default());
        let period = interval.max(MIN_POLL_INTERVAL);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // A slow poll pushes the schedule back instead of bunching ticks.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let snapshot = poll_once(&probe).await;
                tracing::debug!(
                    api = %snapshot.api,
                    db = %snapshot.db,
                    summary = snapshot.summary(),
                    "Health poll finished"
                );
                tx.send_replace(snapshot);
            }
        });

        Self {
            task: Some(task),
            rx,
        }
    }

    /// Receiver notified after every poll.
    pub fn subscribe(&self) -> watch::Receiver<HealthSnapshot> {
        self.rx.clone()
    }

    /// Latest snapshot.
    pub fn current(&self) -> HealthSnapshot {
        self.rx.borrow().clone()
    }

    /// Stop polling and wait for the task to wind down.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
