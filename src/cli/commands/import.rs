//! takt import - Load a project snapshot into the store

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot};
use crate::error::Result;
use crate::storage::ProjectSnapshot;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Snapshot JSON file with `project`, `locations` and `trades`
    pub snapshot: PathBuf,
}

pub fn run(ctx: &AppContext, args: &ImportArgs) -> Result<()> {
    let snapshot = ProjectSnapshot::from_path(&args.snapshot)?;
    let db = ctx.open_db()?;
    let summary = db.import_snapshot(&snapshot)?;
    info!(
        project_id = %summary.project_id,
        locations = summary.locations,
        trades = summary.trades,
        source = %args.snapshot.display(),
        "imported project snapshot"
    );

    if ctx.robot_mode {
        return emit_robot(&summary);
    }

    let mut layout = HumanLayout::new();
    layout
        .push_line(format!(
            "{} imported {}",
            style("✓").green().bold(),
            summary.project_id
        ))
        .kv("Locations", &summary.locations.to_string())
        .kv("Trades", &summary.trades.to_string())
        .kv("Database", &ctx.db_path.display().to_string());
    emit_human(layout);
    Ok(())
}
