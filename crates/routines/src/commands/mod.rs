//! CLI command handlers.

pub mod routines;
pub mod status;
pub mod watch;

use std::time::Duration;

use routines_client::RoutinesClient;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Configured API client.
    pub client: RoutinesClient,
    /// Time between health polls.
    pub poll_interval: Duration,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}
