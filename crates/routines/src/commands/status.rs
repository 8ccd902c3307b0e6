//! Status command - one-shot API and database health check.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use routines_client::monitor::poll_once;
use routines_client::{ComponentStatus, HealthSnapshot};
use serde::Serialize;

use super::Context;

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Exit with an error unless all systems are operational
    #[arg(long)]
    pub strict: bool,
}

/// Status response for JSON output.
#[derive(Debug, Serialize)]
pub(crate) struct StatusOutput<'a> {
    summary: &'static str,
    server_url: &'a str,
    #[serde(flatten)]
    snapshot: &'a HealthSnapshot,
}

/// Run the status command.
pub async fn run(args: StatusArgs, ctx: &Context) -> Result<()> {
    let snapshot = poll_once(&ctx.client).await;
    print_snapshot(&snapshot, ctx)?;

    if args.strict
        && !(snapshot.api == ComponentStatus::Ok && snapshot.db == ComponentStatus::Ok)
    {
        anyhow::bail!("{}", snapshot.summary());
    }
    Ok(())
}

/// Print a snapshot in the format selected by the context.
pub(crate) fn print_snapshot(snapshot: &HealthSnapshot, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        let output = StatusOutput {
            summary: snapshot.summary(),
            server_url: ctx.client.base_url().as_str(),
            snapshot,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();

    println!();
    println!(
        "{} {}",
        status_dot(snapshot.api),
        style(snapshot.summary()).bold()
    );
    println!("{}", dim.apply_to("─".repeat(40)));
    println!(
        "  {} {}",
        dim.apply_to("API Status:     "),
        status_label(snapshot.api)
    );
    println!(
        "  {} {}",
        dim.apply_to("Database Status:"),
        status_label(snapshot.db)
    );
    if let Some(latency) = snapshot.latency_ms {
        println!("  {} {:.2} ms", dim.apply_to("DB Latency:     "), latency);
    }
    if let Some(message) = &snapshot.error_message {
        println!("  {} {}", dim.apply_to("Details:        "), Style::new().red().apply_to(message));
    }
    if ctx.verbose {
        println!("  {} {}", dim.apply_to("Server:         "), ctx.client.base_url());
    }

    Ok(())
}

fn status_style(status: ComponentStatus) -> Style {
    match status {
        ComponentStatus::Ok => Style::new().green(),
        ComponentStatus::Warning => Style::new().yellow(),
        ComponentStatus::Error => Style::new().red(),
        ComponentStatus::Loading => Style::new().dim(),
    }
}

fn status_dot(status: ComponentStatus) -> console::StyledObject<&'static str> {
    status_style(status).apply_to("●")
}

fn status_label(status: ComponentStatus) -> console::StyledObject<&'static str> {
    status_style(status).apply_to(status.as_str())
}
