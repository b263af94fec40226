//! takt activate - Make a draft plan the active plan

use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot};
use crate::error::Result;
use crate::scheduling::PlanStore;

#[derive(Args, Debug)]
pub struct ActivateArgs {
    /// Plan ID
    pub plan_id: String,
}

pub fn run(ctx: &AppContext, args: &ActivateArgs) -> Result<()> {
    let db = ctx.open_db()?;
    let header = db.activate_plan(&args.plan_id)?;

    if ctx.robot_mode {
        return emit_robot(&header);
    }

    let mut layout = HumanLayout::new();
    layout.push_line(format!(
        "{} {} is now active for {}",
        style("✓").green().bold(),
        header.name,
        header.project_id
    ));
    super::show::render_header(&mut layout, &header);
    emit_human(layout);
    Ok(())
}
