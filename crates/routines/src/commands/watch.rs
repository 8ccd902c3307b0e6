//! Watch command - live health polling.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use console::Style;
use routines_client::HealthMonitor;
use routines_client::monitor::MIN_POLL_INTERVAL;

use super::Context;
use super::status::print_snapshot;

/// Arguments for the watch command.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between polls (overrides config)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

/// Run the watch command.
pub async fn run(args: WatchArgs, ctx: &Context) -> Result<()> {
    let interval = args
        .interval
        .map(Duration::from_secs)
        .unwrap_or(ctx.poll_interval)
        .max(MIN_POLL_INTERVAL);

    // Listen before the first poll so an early Ctrl-C is not lost.
    #[cfg(unix)]
    let mut sigint =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;
    let interrupted = async {
        #[cfg(unix)]
        {
            sigint.recv().await;
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
    };
    tokio::pin!(interrupted);

    if !ctx.json_output {
        println!(
            "{}",
            Style::new().dim().apply_to(format!(
                "Polling {} every {}s, Ctrl-C to stop",
                ctx.client.base_url(),
                interval.as_secs()
            ))
        );
    }

    let monitor = HealthMonitor::spawn(ctx.client.clone(), interval);
    let mut rx = monitor.subscribe();

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                print_snapshot(&snapshot, ctx)?;
            }
            _ = &mut interrupted => {
                tracing::debug!("Interrupted, stopping health monitor");
                break;
            }
        }
    }

    monitor.shutdown().await;
    Ok(())
}
