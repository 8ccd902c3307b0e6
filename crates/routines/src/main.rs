//! Routines - manage scheduled activities from the terminal.
//!
//! Main entry point for the routines CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use routines_client::{EnvToken, FileToken, RoutinesClient, StaticToken, TokenProvider};
use routines_config::{LoadedConfig, RoutinesConfig, TokenSource};

mod commands;

use commands::{routines, status, watch};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Routines - manage your scheduled activities
#[derive(Parser)]
#[command(name = "routines")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// API base URL (default: http://127.0.0.1:8000)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Bearer token to use instead of the configured token source
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Read configuration from this file only
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check API and database health once
    Status(status::StatusArgs),

    /// Keep polling health until interrupted
    Watch(watch::WatchArgs),

    /// List routines
    List(routines::ListArgs),

    /// Show a single routine
    Show(routines::ShowArgs),

    /// Add a routine (requires sign-in)
    Add(routines::AddArgs),

    /// Change fields of a routine (requires sign-in)
    Update(routines::UpdateArgs),

    /// Delete a routine (requires sign-in)
    Delete(routines::DeleteArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "routines=debug,routines_client=debug,routines_config=debug,info"
    } else {
        "routines=info,routines_client=info,warn"
    };

    let log_dir = routines_config::config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "routines.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "routines=trace,routines_client=trace,routines_config=trace,info",
                )),
        )
        .init();

    let loaded = load_settings(cli.config.as_deref())?;
    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }
    for path in loaded.loaded_from() {
        tracing::debug!(path = %path.display(), "Loaded config layer");
    }

    let mut config = loaded.config;
    if let Some(server) = cli.server {
        config.server.base_url = Some(server);
    }

    let client = RoutinesClient::builder()
        .base_url(config.base_url())
        .timeout(config.timeout())
        .shared_token_provider(token_provider(cli.token, &config))
        .build()
        .with_context(|| format!("invalid API URL '{}'", config.base_url()))?;
    tracing::debug!(base_url = %client.base_url(), "Client configured");

    let ctx = commands::Context {
        client,
        poll_interval: config.poll_interval(),
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Status(args) => status::run(args, &ctx).await,
        Commands::Watch(args) => watch::run(args, &ctx).await,
        Commands::List(args) => routines::list(args, &ctx).await,
        Commands::Show(args) => routines::show(args, &ctx).await,
        Commands::Add(args) => routines::add(args, &ctx).await,
        Commands::Update(args) => routines::update(args, &ctx).await,
        Commands::Delete(args) => routines::delete(args, &ctx).await,
    }
}

/// Load config from an explicit file, or discover the usual layers.
fn load_settings(path: Option<&std::path::Path>) -> Result<LoadedConfig> {
    match path {
        Some(path) => {
            let mut config: RoutinesConfig = routines_config::load_config_file(path)?;
            config.apply_env();
            Ok(LoadedConfig {
                config,
                sources: vec![routines_config::ConfigSource {
                    path: path.to_path_buf(),
                    loaded: true,
                }],
                warnings: Vec::new(),
            })
        }
        None => Ok(routines_config::load_config(None)?),
    }
}

fn token_provider(flag: Option<String>, config: &RoutinesConfig) -> Arc<dyn TokenProvider> {
    if let Some(token) = flag {
        return Arc::new(StaticToken::new(token));
    }
    match config.token_source() {
        TokenSource::File(path) => Arc::new(FileToken::new(path)),
        TokenSource::Env(var) => Arc::new(EnvToken::new(var)),
    }
}
