//! Conflict detection over the assignments of one phase group.
//!
//! Three kinds of findings are reported, none of which fails plan creation:
//! stacking conflicts, predecessor violations and buffer warnings.

use std::collections::{HashMap, HashSet};

use super::calendar::WorkWeek;
use super::model::{
    BufferSeverity, BufferWarning, PlanWarnings, PredecessorViolation, StackingConflict,
    TaktAssignment, TaktWagon, TaktZone, Trade,
};

/// Everything the validator needs to know about a laid-out group.
#[derive(Debug, Clone, Copy)]
pub struct GroupLayout<'a> {
    pub zones: &'a [TaktZone],
    pub wagons: &'a [TaktWagon],
    pub assignments: &'a [TaktAssignment],
    /// Source trades, used for predecessor lookups.
    pub trades: &'a [Trade],
}

/// Buffer rules in force for a plan.
#[derive(Debug, Clone, Copy)]
pub struct BufferPolicy {
    pub buffer_size: i64,
    pub takt_time: i64,
    pub work_week: WorkWeek,
}

impl BufferPolicy {
    /// Required gap between consecutive wagons in a zone, in working days.
    ///
    /// `buffer_size` counts takt periods, so one period of buffer at takt
    /// time 5 asks for 5 working days. Weekends and other non-working days
    /// never count toward the gap.
    #[must_use]
    pub const fn required_days(&self) -> i64 {
        self.buffer_size.saturating_mul(self.takt_time)
    }
}

/// Validate one group. Lists come back ordered by zone sequence, then period.
#[must_use]
pub fn validate_group(layout: &GroupLayout<'_>, policy: &BufferPolicy) -> PlanWarnings {
    let wagons: HashMap<&str, &TaktWagon> =
        layout.wagons.iter().map(|w| (w.id.as_str(), w)).collect();
    let predecessors: HashMap<&str, &[String]> = layout
        .trades
        .iter()
        .map(|t| (t.id.as_str(), t.predecessor_trade_ids.as_slice()))
        .collect();

    let mut zones: Vec<&TaktZone> = layout.zones.iter().collect();
    zones.sort_by_key(|z| z.sequence);

    let mut warnings = PlanWarnings::default();
    for zone in zones {
        let mut in_zone: Vec<&TaktAssignment> = layout
            .assignments
            .iter()
            .filter(|a| a.zone_id == zone.id)
            .collect();
        in_zone.sort_by_key(|a| a.period_number);

        detect_stacking(&in_zone, &mut warnings.stacking_conflicts);
        detect_predecessor_violations(
            &in_zone,
            &wagons,
            &predecessors,
            &mut warnings.predecessor_violations,
        );
        detect_buffer_erosion(&in_zone, &wagons, policy, &mut warnings.buffer_warnings);
    }
    warnings.recount();
    warnings
}

fn detect_stacking(in_zone: &[&TaktAssignment], out: &mut Vec<StackingConflict>) {
    for (i, first) in in_zone.iter().enumerate() {
        for second in &in_zone[i + 1..] {
            if first.wagon_id == second.wagon_id {
                continue;
            }
            // Half-open [start, end) ranges.
            if first.planned_start < second.planned_end && second.planned_start < first.planned_end
            {
                out.push(StackingConflict {
                    phase_group: first.phase_group,
                    zone_id: first.zone_id.clone(),
                    first_assignment_id: first.id.clone(),
                    second_assignment_id: second.id.clone(),
                    first_wagon_id: first.wagon_id.clone(),
                    second_wagon_id: second.wagon_id.clone(),
                    overlap_start: first.planned_start.max(second.planned_start),
                    overlap_end: first.planned_end.min(second.planned_end),
                });
            }
        }
    }
}

fn detect_predecessor_violations(
    in_zone: &[&TaktAssignment],
    wagons: &HashMap<&str, &TaktWagon>,
    predecessors: &HashMap<&str, &[String]>,
    out: &mut Vec<PredecessorViolation>,
) {
    let by_trade: HashMap<&str, &TaktAssignment> = in_zone
        .iter()
        .filter_map(|a| wagons.get(a.wagon_id.as_str()).map(|w| (w.trade_id.as_str(), *a)))
        .collect();
    let mut reported: HashSet<(&str, &str)> = HashSet::new();

    for successor in in_zone {
        let Some(wagon) = wagons.get(successor.wagon_id.as_str()) else {
            continue;
        };
        let Some(preds) = predecessors.get(wagon.trade_id.as_str()) else {
            continue;
        };
        for pred_trade in preds.iter() {
            // Unknown or out-of-group predecessors are ignored.
            let Some(predecessor) = by_trade.get(pred_trade.as_str()) else {
                continue;
            };
            if predecessor.finish_date() <= successor.planned_start {
                continue;
            }
            if !reported.insert((pred_trade.as_str(), wagon.trade_id.as_str())) {
                continue;
            }
            out.push(PredecessorViolation {
                phase_group: successor.phase_group,
                zone_id: successor.zone_id.clone(),
                predecessor_trade_id: pred_trade.clone(),
                successor_trade_id: wagon.trade_id.clone(),
                predecessor_assignment_id: predecessor.id.clone(),
                successor_assignment_id: successor.id.clone(),
                predecessor_finish: predecessor.finish_date(),
                successor_start: successor.planned_start,
            });
        }
    }
}

fn detect_buffer_erosion(
    in_zone: &[&TaktAssignment],
    wagons: &HashMap<&str, &TaktWagon>,
    policy: &BufferPolicy,
    out: &mut Vec<BufferWarning>,
) {
    let required = policy.required_days();
    if required <= 0 {
        return;
    }

    let mut by_wagon: Vec<(i64, &TaktAssignment)> = in_zone
        .iter()
        .filter_map(|a| wagons.get(a.wagon_id.as_str()).map(|w| (w.sequence, *a)))
        .collect();
    by_wagon.sort_by_key(|(seq, a)| (*seq, a.period_number));

    for pair in by_wagon.windows(2) {
        let (previous, next) = (pair[0].1, pair[1].1);
        let gap = policy
            .work_week
            .working_days_between(previous.planned_end, next.planned_start);
        if gap >= required {
            continue;
        }
        let missing = required - gap;
        out.push(BufferWarning {
            phase_group: next.phase_group,
            zone_id: next.zone_id.clone(),
            previous_assignment_id: previous.id.clone(),
            next_assignment_id: next.id.clone(),
            gap_days: gap,
            required_days: required,
            missing_days: missing,
            severity: buffer_severity(gap, missing, required),
        });
    }
}

/// High when nothing is left or at least two thirds are missing, medium from
/// one third, low below that.
#[must_use]
pub const fn buffer_severity(gap: i64, missing: i64, required: i64) -> BufferSeverity {
    let missing_thirds = missing.saturating_mul(3);
    if gap <= 0 || missing_thirds >= required.saturating_mul(2) {
        BufferSeverity::High
    } else if missing_thirds >= required {
        BufferSeverity::Medium
    } else {
        BufferSeverity::Low
    }
}
