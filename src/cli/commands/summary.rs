//! takt summary - Period, date and progress totals for a plan

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot};
use crate::error::Result;
use crate::scheduling::plan_summary;

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Plan ID
    pub plan_id: String,
}

pub fn run(ctx: &AppContext, args: &SummaryArgs) -> Result<()> {
    let db = ctx.open_db()?;
    let summary = plan_summary(&super::load_plan(&db, &args.plan_id)?);

    if ctx.robot_mode {
        return emit_robot(&summary);
    }

    let counts = &summary.status_counts;
    let mut layout = HumanLayout::new();
    layout
        .title(&format!("Summary of {}", summary.plan_id))
        .kv("Status", summary.status.as_str())
        .kv("Takt time", &format!("{} working days", summary.takt_time))
        .kv(
            "Duration",
            &format!("{} periods / {} days", summary.total_periods, summary.total_days),
        )
        .kv("Dates", &format!("{} .. {}", summary.start_date, summary.end_date))
        .kv("Zones", &summary.num_zones.to_string())
        .kv("Trades", &summary.num_trades.to_string())
        .kv("Assignments", &summary.total_assignments.to_string())
        .kv(
            "By status",
            &format!(
                "{} planned, {} in progress, {} completed, {} delayed",
                counts.planned, counts.in_progress, counts.completed, counts.delayed
            ),
        )
        .kv("Progress", &format!("{:.1}%", summary.overall_progress_pct))
        .kv("Issues", &summary.total_issues.to_string());
    emit_human(layout);
    Ok(())
}
