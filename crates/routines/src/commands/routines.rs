//! Routine commands - list, show, add, update, delete.

use anyhow::{Result, bail};
use clap::Args;
use console::{Style, style};
use routines_client::{Routine, RoutineCreate, RoutineList, RoutineUpdate};

use super::Context;

/// Arguments for the list command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Maximum routines to fetch
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Only your own routines (sends your token)
    #[arg(long)]
    pub mine: bool,
}

/// Arguments for the show command.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Routine ID
    pub id: i64,
}

/// Arguments for the add command.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Routine title (e.g. "Morning Workout")
    pub title: String,

    /// Time of day (e.g. "09:00 AM")
    #[arg(short, long)]
    pub time: Option<String>,

    /// Section ID
    #[arg(short, long)]
    pub section: Option<i64>,
}

/// Arguments for the update command.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Routine ID
    pub id: i64,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New time of day
    #[arg(short, long)]
    pub time: Option<String>,

    /// New section ID
    #[arg(short, long)]
    pub section: Option<i64>,
}

/// Arguments for the delete command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Routine ID
    pub id: i64,
}

/// Run the list command.
pub async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let api = ctx.client.routines();
    let routines = if args.mine {
        api.list_own(args.limit).await?
    } else {
        api.list(args.limit).await?
    };
    let list = RoutineList::from(routines);

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(list.as_slice())?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", style("Routines").bold());
    println!("{}", dim.apply_to("─".repeat(50)));

    if list.is_empty() {
        println!("{}", dim.apply_to("No routines yet"));
        println!(
            "{}",
            dim.apply_to("Add your first routine with: routines add \"Morning Workout\"")
        );
        return Ok(());
    }

    for routine in list.iter() {
        print_routine_line(routine);
    }
    Ok(())
}

/// Run the show command.
pub async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let routine = ctx.client.routines().get(args.id).await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&routine)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", style(&routine.title).bold());
    println!("{}", dim.apply_to("─".repeat(50)));
    println!("  {} {}", dim.apply_to("ID:     "), routine.id);
    if let Some(time) = &routine.time {
        println!("  {} {}", dim.apply_to("Time:   "), time);
    }
    if let Some(section) = routine.section_id {
        println!("  {} {}", dim.apply_to("Section:"), section);
    }
    if let Some(created) = &routine.created_at {
        println!("  {} {}", dim.apply_to("Added:  "), format_date(created));
    }
    Ok(())
}

/// Run the add command.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let title = args.title.trim();
    if title.is_empty() {
        bail!("Routine title is required");
    }

    let request = RoutineCreate {
        title: title.to_string(),
        time: args.time.filter(|t| !t.trim().is_empty()),
        section_id: args.section,
    };
    let created = ctx.client.routines().create(&request).await?;
    tracing::info!(id = created.id, "Routine created");

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!(
            "{} Routine created: {}",
            Style::new().green().apply_to("✓"),
            Style::new().dim().apply_to(created.id)
        );
    }
    Ok(())
}

/// Run the update command.
pub async fn update(args: UpdateArgs, ctx: &Context) -> Result<()> {
    if let Some(title) = &args.title
        && title.trim().is_empty()
    {
        bail!("Routine title cannot be empty");
    }

    let request = RoutineUpdate {
        title: args.title.map(|t| t.trim().to_string()),
        time: args.time,
        section_id: args.section,
    };
    if request.is_empty() {
        bail!("Nothing to update: pass --title, --time or --section");
    }

    let updated = ctx.client.routines().update(args.id, &request).await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        print!("{} ", Style::new().green().apply_to("✓"));
        print_routine_line(&updated);
    }
    Ok(())
}

/// Run the delete command.
pub async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let deleted = ctx.client.routines().delete(args.id).await?;
    tracing::info!(id = deleted.id, "Routine deleted");

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&deleted)?);
    } else {
        println!(
            "{} Deleted: {}",
            Style::new().green().apply_to("✓"),
            deleted.title
        );
    }
    Ok(())
}

fn print_routine_line(routine: &Routine) {
    let dim = Style::new().dim();
    let mut line = format!(
        "{} {}",
        dim.apply_to(format!("[{}]", routine.id)),
        routine.title
    );
    if let Some(time) = &routine.time {
        line.push_str(&format!("  {}", Style::new().cyan().apply_to(time)));
    }
    if let Some(created) = &routine.created_at {
        line.push_str(&format!(
            "  {}",
            dim.apply_to(format!("Added {}", format_date(created)))
        ));
    }
    println!("{}", line);
}

/// Render a server timestamp as a calendar date, or as-is if unparseable.
fn format_date(raw: &str) -> String {
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return ts.format("%Y-%m-%d").to_string();
    }
    if let Ok(ts) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return ts.format("%Y-%m-%d").to_string();
    }
    if let Ok(ts) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return ts.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}
