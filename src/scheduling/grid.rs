//! Takt grid generation for one phase group.
//!
//! Zones are laid against wagons in a pipeline: zone `z` of wagon `w` runs
//! in period `(z - 1) + sum over earlier wagons of (1 + bufferAfter)`, so a
//! wagon moves one zone per period and the next wagon follows after its
//! buffer.

use chrono::NaiveDate;
use uuid::Uuid;

use super::calendar::WorkWeek;
use super::model::{AssignmentStatus, TaktAssignment, TaktWagon, TaktZone};
use crate::error::{Result, TaktError};

/// Calendar inputs shared by every group of a plan.
#[derive(Debug, Clone, Copy)]
pub struct GridParams {
    pub takt_time: i64,
    pub start_date: NaiveDate,
    pub work_week: WorkWeek,
}

/// Result of laying out one phase group.
#[derive(Debug, Clone)]
pub struct GroupGrid {
    /// Ordered by zone sequence, then period.
    pub assignments: Vec<TaktAssignment>,
    pub total_periods: i64,
}

/// Period offset of each wagon (in sequence order) relative to zone 1.
#[must_use]
pub fn wagon_offsets(wagons: &[&TaktWagon]) -> Vec<i64> {
    let mut offsets = Vec::with_capacity(wagons.len());
    let mut acc = 0;
    for wagon in wagons {
        offsets.push(acc);
        acc = step(acc, wagon);
    }
    offsets
}

/// Periods needed to run every wagon through every zone, at least 1.
#[must_use]
pub fn total_periods(num_zones: usize, wagons: &[&TaktWagon]) -> i64 {
    let zones = i64::try_from(num_zones).unwrap_or(i64::MAX);
    let wagon_span = wagons.iter().fold(0, |acc, w| step(acc, w));
    (zones - 1).saturating_add(wagon_span).max(1)
}

fn step(acc: i64, wagon: &TaktWagon) -> i64 {
    acc.saturating_add(1).saturating_add(wagon.buffer_after.max(0))
}

/// Generate one assignment per (zone, wagon) pair of a phase group.
///
/// Zones and wagons may be passed in any order; they are laid out by
/// `sequence`.
pub fn generate_group(
    zones: &[TaktZone],
    wagons: &[TaktWagon],
    params: &GridParams,
) -> Result<GroupGrid> {
    if params.takt_time <= 0 {
        return Err(TaktError::InvalidTaktTime(params.takt_time));
    }
    if zones.is_empty() || wagons.is_empty() {
        return Err(TaktError::Config(format!(
            "cannot lay out a group with {} zones and {} wagons",
            zones.len(),
            wagons.len()
        )));
    }

    let mut zones: Vec<&TaktZone> = zones.iter().collect();
    zones.sort_by_key(|z| z.sequence);
    let mut wagons: Vec<&TaktWagon> = wagons.iter().collect();
    wagons.sort_by_key(|w| w.sequence);

    let offsets = wagon_offsets(&wagons);
    let mut assignments = Vec::with_capacity(zones.len() * wagons.len());

    for (zone_idx, zone) in zones.iter().enumerate() {
        let zone_offset = i64::try_from(zone_idx).unwrap_or(i64::MAX);
        for (wagon, wagon_offset) in wagons.iter().zip(&offsets) {
            let period = zone_offset.saturating_add(*wagon_offset);
            let (planned_start, planned_end) = period_dates(period, params).ok_or_else(|| {
                TaktError::Config(format!(
                    "period {period} of wagon {} overruns the calendar at takt time {}",
                    wagon.trade_code, params.takt_time
                ))
            })?;

            assignments.push(TaktAssignment {
                id: Uuid::new_v4().to_string(),
                plan_id: zone.plan_id.clone(),
                zone_id: zone.id.clone(),
                wagon_id: wagon.id.clone(),
                phase_group: zone.phase_group,
                period_number: period,
                planned_start,
                planned_end,
                actual_start: None,
                actual_end: None,
                status: AssignmentStatus::Planned,
                progress_pct: 0.0,
            });
        }
    }

    Ok(GroupGrid {
        assignments,
        total_periods: total_periods(zones.len(), &wagons),
    })
}

/// Start and end dates of `period`, or `None` on overflow.
fn period_dates(period: i64, params: &GridParams) -> Option<(NaiveDate, NaiveDate)> {
    let start_offset = period.checked_mul(params.takt_time)?;
    let end_offset = start_offset.checked_add(params.takt_time)?;
    let week = params.work_week;
    Some((
        week.checked_add_working_days(params.start_date, start_offset)?,
        week.checked_add_working_days(params.start_date, end_offset)?,
    ))
}
