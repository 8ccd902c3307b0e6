//! HTTP client SDK for the routines API.
//!
//! This crate provides a typed client for the routines service along with a
//! background health monitor.
//!
//! # Example
//!
//! ```no_run
//! use routines_client::{EnvToken, RoutineCreate, RoutinesClient, Result};
//!
//! # async fn example() -> Result<()> {
//! // Tokens are fetched right before every authenticated call
//! let client = RoutinesClient::builder()
//!     .base_url("http://127.0.0.1:8000")
//!     .token_provider(EnvToken::new("ROUTINES_TOKEN"))
//!     .build()?;
//!
//! // Check server health
//! if client.health().is_healthy().await {
//!     println!("API is up");
//! }
//!
//! // Create and list routines
//! let created = client
//!     .routines()
//!     .create(&RoutineCreate::new("Morning run").with_time("06:30"))
//!     .await?;
//! println!("Created routine {}", created.id);
//!
//! for routine in client.routines().list(Some(10)).await? {
//!     println!("{}: {}", routine.id, routine.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Routines**: list, get, create, update, delete
//! - **Health**: API liveness and database connectivity
//! - **Monitor**: periodic health polling with a composite status

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod monitor;
pub mod store;
pub mod types;

pub use auth::{Anonymous, EnvToken, FileToken, StaticToken, TokenProvider};
pub use client::{ClientBuilder, DEFAULT_BASE_URL, RequestOptions, RoutinesClient};
pub use error::{Error, Result, TokenError};
pub use monitor::{ComponentStatus, HealthMonitor, HealthProbe, HealthSnapshot};
pub use store::RoutineList;
pub use types::*;
