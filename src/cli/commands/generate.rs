//! takt generate - Generate the next takt plan for a project

use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Project ID
    pub project_id: String,

    /// List every assignment in human output
    #[arg(long)]
    pub assignments: bool,
}

pub fn run(ctx: &AppContext, args: &GenerateArgs) -> Result<()> {
    let db = ctx.open_db()?;
    let plan = ctx
        .assembler()
        .generate(&db, &args.project_id, ctx.today())?;

    if ctx.robot_mode {
        return emit_robot(&plan);
    }

    let mut layout = HumanLayout::new();
    layout.push_line(format!(
        "{} generated version {} for {}",
        style("✓").green().bold(),
        plan.header.version,
        plan.header.project_id
    ));
    layout.blank();
    super::show::render_plan(&mut layout, &plan, args.assignments);
    emit_human(layout);
    Ok(())
}
