//! Read-side views of a stored plan: summary statistics and flowline data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::model::{AssignmentStatus, PhaseGroup, PlanStatus, TaktPlan};

/// Assignment counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub planned: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub delayed: usize,
}

impl StatusCounts {
    fn record(&mut self, status: AssignmentStatus) {
        match status {
            AssignmentStatus::Planned => self.planned += 1,
            AssignmentStatus::InProgress => self.in_progress += 1,
            AssignmentStatus::Completed => self.completed += 1,
            AssignmentStatus::Delayed => self.delayed += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub plan_id: String,
    pub status: PlanStatus,
    pub total_periods: i64,
    pub total_days: i64,
    pub takt_time: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub num_zones: i64,
    pub num_trades: i64,
    pub total_assignments: usize,
    pub status_counts: StatusCounts,
    pub overall_progress_pct: f64,
    pub total_issues: usize,
}

/// Summarize a plan's size and progress.
#[must_use]
pub fn plan_summary(plan: &TaktPlan) -> PlanSummary {
    let mut counts = StatusCounts::default();
    for assignment in &plan.assignments {
        counts.record(assignment.status);
    }
    let total = plan.assignments.len();
    let overall_progress_pct = if total == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let pct = counts.completed as f64 / total as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    };

    PlanSummary {
        plan_id: plan.header.id.clone(),
        status: plan.header.status,
        total_periods: plan.header.total_periods,
        total_days: plan.header.total_periods * plan.header.takt_time,
        takt_time: plan.header.takt_time,
        start_date: plan.header.start_date,
        end_date: plan.header.end_date,
        num_zones: plan.header.num_zones,
        num_trades: plan.header.num_trades,
        total_assignments: total,
        status_counts: counts,
        overall_progress_pct,
        total_issues: plan.warnings.total_issues,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowlineZone {
    pub id: String,
    pub name: String,
    pub code: String,
    pub y_index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowlineSegment {
    pub zone_index: i64,
    pub x_start: i64,
    pub x_end: i64,
    pub status: AssignmentStatus,
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowlineWagon {
    pub wagon_id: String,
    pub trade_id: String,
    pub trade_name: String,
    pub trade_code: String,
    pub color: Option<String>,
    pub segments: Vec<FlowlineSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowlineGroup {
    pub phase_group: PhaseGroup,
    pub zones: Vec<FlowlineZone>,
    pub wagons: Vec<FlowlineWagon>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flowline {
    pub plan_id: String,
    pub takt_time: i64,
    pub total_days: i64,
    pub start_date: NaiveDate,
    /// Calendar days from the plan start to `today`, never negative.
    pub today_x: i64,
    pub groups: Vec<FlowlineGroup>,
}

/// Chart data: one line per wagon across the zones of its phase group.
///
/// The x axis is in takt days from the plan start (`period * taktTime`).
#[must_use]
pub fn plan_flowline(plan: &TaktPlan, today: NaiveDate) -> Flowline {
    let takt_time = plan.header.takt_time;
    let mut groups = Vec::new();

    for group in PhaseGroup::ALL {
        let mut zones: Vec<_> = plan.zones.iter().filter(|z| z.phase_group == group).collect();
        if zones.is_empty() {
            continue;
        }
        zones.sort_by_key(|z| z.sequence);
        let mut wagons: Vec<_> = plan.wagons.iter().filter(|w| w.phase_group == group).collect();
        wagons.sort_by_key(|w| w.sequence);

        let flow_zones: Vec<FlowlineZone> = zones
            .iter()
            .map(|z| FlowlineZone {
                id: z.id.clone(),
                name: z.name.clone(),
                code: z.code.clone(),
                y_index: z.sequence - 1,
            })
            .collect();

        let flow_wagons = wagons
            .iter()
            .map(|wagon| {
                let mut own: Vec<_> = plan
                    .assignments
                    .iter()
                    .filter(|a| a.wagon_id == wagon.id)
                    .collect();
                own.sort_by_key(|a| a.period_number);
                let segments = own
                    .iter()
                    .map(|a| {
                        let zone_index = zones
                            .iter()
                            .find(|z| z.id == a.zone_id)
                            .map_or(0, |z| z.sequence - 1);
                        let x_start = a.period_number * takt_time;
                        FlowlineSegment {
                            zone_index,
                            x_start,
                            x_end: x_start + wagon.duration_days,
                            status: a.status,
                            progress: a.progress_pct,
                        }
                    })
                    .collect();
                FlowlineWagon {
                    wagon_id: wagon.id.clone(),
                    trade_id: wagon.trade_id.clone(),
                    trade_name: wagon.trade_name.clone(),
                    trade_code: wagon.trade_code.clone(),
                    color: wagon.trade_color.clone(),
                    segments,
                }
            })
            .collect();

        groups.push(FlowlineGroup {
            phase_group: group,
            zones: flow_zones,
            wagons: flow_wagons,
        });
    }

    Flowline {
        plan_id: plan.header.id.clone(),
        takt_time,
        total_days: plan.header.total_periods * takt_time,
        start_date: plan.header.start_date,
        today_x: (today - plan.header.start_date).num_days().max(0),
        groups,
    }
}
