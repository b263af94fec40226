//! takt show - Show a takt plan

use clap::Args;
use console::style;
use itertools::Itertools;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot};
use crate::error::Result;
use crate::scheduling::model::{BufferSeverity, PhaseGroup, PlanHeader, TaktPlan};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Plan ID
    pub plan_id: String,

    /// Also list every assignment
    #[arg(long)]
    pub assignments: bool,
}

pub fn run(ctx: &AppContext, args: &ShowArgs) -> Result<()> {
    let db = ctx.open_db()?;
    let plan = super::load_plan(&db, &args.plan_id)?;

    if ctx.robot_mode {
        return emit_robot(&plan);
    }

    let mut layout = HumanLayout::new();
    render_plan(&mut layout, &plan, args.assignments);
    emit_human(layout);
    Ok(())
}

/// Header, per-group layout and warnings of a plan.
pub(crate) fn render_plan(layout: &mut HumanLayout, plan: &TaktPlan, with_assignments: bool) {
    layout.title(&plan.header.name);
    render_header(layout, &plan.header);

    for group in PhaseGroup::ALL {
        let zones = plan.zones.iter().filter(|z| z.phase_group == group).collect_vec();
        if zones.is_empty() {
            continue;
        }
        let wagons = plan
            .wagons
            .iter()
            .filter(|w| w.phase_group == group)
            .sorted_by_key(|w| w.sequence)
            .collect_vec();

        layout.blank().section(&format!("Phase: {group}"));
        layout.kv(
            "Zones",
            &zones.iter().map(|z| format!("{} {}", z.code, z.name)).join(", "),
        );
        layout.kv(
            "Trains",
            &wagons
                .iter()
                .map(|w| format!("{} (+{})", w.trade_code, w.buffer_after))
                .join(" -> "),
        );

        if with_assignments {
            let assignments = plan
                .assignments
                .iter()
                .filter(|a| a.phase_group == group)
                .sorted_by_key(|a| (a.period_number, a.planned_start));
            for assignment in assignments {
                let zone = zones.iter().find(|z| z.id == assignment.zone_id);
                let wagon = wagons.iter().find(|w| w.id == assignment.wagon_id);
                layout.bullet(&format!(
                    "P{:<3} {:<8} {:<8} {} .. {}  {}",
                    assignment.period_number,
                    zone.map_or("?", |z| z.code.as_str()),
                    wagon.map_or("?", |w| w.trade_code.as_str()),
                    assignment.planned_start,
                    assignment.planned_end,
                    assignment.status.as_str()
                ));
            }
        }
    }

    render_warnings(layout, plan);
}

pub(crate) fn render_header(layout: &mut HumanLayout, header: &PlanHeader) {
    layout
        .kv("ID", &header.id)
        .kv("Project", &header.project_id)
        .kv("Version", &header.version.to_string())
        .kv("Status", &header.status.to_string())
        .kv("Takt time", &format!("{} working days", header.takt_time))
        .kv("Buffer", &format!("{} period(s)", header.buffer_size))
        .kv("Zones", &header.num_zones.to_string())
        .kv("Trades", &header.num_trades.to_string())
        .kv("Periods", &header.total_periods.to_string())
        .kv("Dates", &format!("{} .. {}", header.start_date, header.end_date));
}

fn render_warnings(layout: &mut HumanLayout, plan: &TaktPlan) {
    let warnings = &plan.warnings;
    layout.blank();
    if warnings.is_empty() {
        layout.push_line(style("No validation issues").green().to_string());
        return;
    }

    layout.section(&format!("Warnings ({})", warnings.total_issues));
    let zone_code = |zone_id: &str| {
        plan.zones
            .iter()
            .find(|z| z.id == zone_id)
            .map_or_else(|| zone_id.to_string(), |z| z.code.clone())
    };

    for conflict in &warnings.stacking_conflicts {
        layout.bullet(&format!(
            "{} stacking in {} from {} to {}",
            style("conflict").red(),
            zone_code(&conflict.zone_id),
            conflict.overlap_start,
            conflict.overlap_end
        ));
    }
    for violation in &warnings.predecessor_violations {
        layout.bullet(&format!(
            "{} {} starts {} before {} finishes {} in {}",
            style("sequence").red(),
            violation.successor_trade_id,
            violation.successor_start,
            violation.predecessor_trade_id,
            violation.predecessor_finish,
            zone_code(&violation.zone_id)
        ));
    }
    for buffer in &warnings.buffer_warnings {
        let label = match buffer.severity {
            BufferSeverity::High => style("buffer").red(),
            BufferSeverity::Medium => style("buffer").yellow(),
            BufferSeverity::Low => style("buffer").dim(),
        };
        layout.bullet(&format!(
            "{label} {} gap {}d of {}d required in {}",
            buffer.severity.as_str(),
            buffer.gap_days,
            buffer.required_days,
            zone_code(&buffer.zone_id)
        ));
    }
}
