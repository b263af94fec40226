//! takt flowline - Flowline chart data for a plan

use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot};
use crate::error::Result;
use crate::scheduling::plan_flowline;
use crate::scheduling::views::FlowlineWagon;

#[derive(Args, Debug)]
pub struct FlowlineArgs {
    /// Plan ID
    pub plan_id: String,
}

pub fn run(ctx: &AppContext, args: &FlowlineArgs) -> Result<()> {
    let db = ctx.open_db()?;
    let plan = super::load_plan(&db, &args.plan_id)?;
    let flowline = plan_flowline(&plan, ctx.today());

    if ctx.robot_mode {
        return emit_robot(&flowline);
    }

    let mut layout = HumanLayout::new();
    layout
        .title(&format!("Flowline of {}", flowline.plan_id))
        .kv("Start", &flowline.start_date.to_string())
        .kv("Total days", &flowline.total_days.to_string())
        .kv("Today", &format!("day {}", flowline.today_x));

    for group in &flowline.groups {
        layout.blank().section(group.phase_group.as_str());
        for wagon in &group.wagons {
            layout.push_line(wagon_row(wagon, group.zones.len(), flowline.total_days));
        }
    }
    emit_human(layout);
    Ok(())
}

/// One text bar per wagon: each character is a calendar day, digits mark
/// the zone index occupied on that day.
fn wagon_row(wagon: &FlowlineWagon, zone_count: usize, total_days: i64) -> String {
    let width = usize::try_from(total_days).unwrap_or(0);
    let mut bar = vec!['.'; width];
    for segment in &wagon.segments {
        let start = usize::try_from(segment.x_start).unwrap_or(0).min(width);
        let end = usize::try_from(segment.x_end).unwrap_or(0).min(width);
        let mark = char::from_digit(u32::try_from(segment.zone_index % 36).unwrap_or(0), 36)
            .unwrap_or('#');
        for cell in bar.iter_mut().take(end).skip(start) {
            *cell = mark;
        }
    }
    format!(
        "{:<8} {} {}",
        wagon.trade_code,
        bar.into_iter().collect::<String>(),
        style(format!("{zone_count} zones")).dim()
    )
}
