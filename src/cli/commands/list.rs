//! takt list - List a project's takt plans

use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot};
use crate::error::Result;
use crate::scheduling::{PlanStatus, PlanStore};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project ID
    pub project_id: String,

    /// Only plans with this status (draft, active, superseded)
    #[arg(long)]
    pub status: Option<PlanStatus>,
}

pub fn run(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let db = ctx.open_db()?;
    let plans: Vec<_> = db
        .list_plans(&args.project_id)?
        .into_iter()
        .filter(|plan| args.status.is_none_or(|status| plan.status == status))
        .collect();

    if ctx.robot_mode {
        return emit_robot(&plans);
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("Takt plans for {}", args.project_id));
    if plans.is_empty() {
        layout.push_line(style("No plans").dim().to_string());
    }
    for plan in &plans {
        let status = match plan.status {
            PlanStatus::Active => style(plan.status.as_str()).green().bold(),
            PlanStatus::Draft => style(plan.status.as_str()).yellow(),
            PlanStatus::Superseded => style(plan.status.as_str()).dim(),
        };
        layout.bullet(&format!(
            "v{:<3} {:<10} {} .. {}  {} periods  {}",
            plan.version, status, plan.start_date, plan.end_date, plan.total_periods, plan.id
        ));
    }
    emit_human(layout);
    Ok(())
}
