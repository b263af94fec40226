//! Plan assembly: preconditions, per-group generation and validation,
//! merging, and persistence through [`PlanStore`].

use chrono::{NaiveDate, Utc};
use itertools::Itertools;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::calendar::WorkWeek;
use super::grid::{GridParams, generate_group};
use super::model::{
    GeneratedBy, Location, PhaseGroup, PlanHeader, PlanStatus, PlanWarnings, Project, TaktPlan,
    TaktWagon, TaktZone, Trade,
};
use super::phase::{classify_location, classify_trade};
use super::validator::{BufferPolicy, GroupLayout, validate_group};
use crate::error::{Result, TaktError};

/// Read side of the project collaborator.
pub trait ProjectSource {
    fn project(&self, project_id: &str) -> Result<Option<Project>>;
    fn locations(&self, project_id: &str) -> Result<Vec<Location>>;
    fn trades(&self, project_id: &str) -> Result<Vec<Trade>>;
}

/// Persistence of takt plans.
pub trait PlanStore {
    /// Version the project's next plan would get right now.
    fn next_version(&self, project_id: &str) -> Result<i64>;
    /// Write the plan and all of its children atomically.
    ///
    /// The version is claimed inside the write, so concurrent writers never
    /// share one. The header is renumbered when another writer took the
    /// version the plan was assembled with.
    fn insert_plan(&self, plan: &mut TaktPlan) -> Result<()>;
    fn get_plan(&self, plan_id: &str) -> Result<Option<TaktPlan>>;
    fn list_plans(&self, project_id: &str) -> Result<Vec<PlanHeader>>;
    /// Make a draft plan active, superseding the project's current one.
    fn activate_plan(&self, plan_id: &str) -> Result<PlanHeader>;
}

/// Largest accepted takt time, in working days.
pub const MAX_TAKT_TIME: i64 = u16::MAX as i64;

/// Largest accepted buffer, in takt periods, for `bufferSize` and a trade's
/// `bufferAfter`.
pub const MAX_BUFFER_PERIODS: i64 = u16::MAX as i64;

/// Fallbacks for values a project record leaves unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerDefaults {
    pub takt_time: i64,
    pub buffer_size: i64,
    pub working_days: Vec<String>,
}

impl Default for SchedulerDefaults {
    fn default() -> Self {
        Self {
            takt_time: 5,
            buffer_size: 1,
            working_days: ["monday", "tuesday", "wednesday", "thursday", "friday"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Scheduling settings after merging the project record with defaults.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSettings {
    pub takt_time: i64,
    pub buffer_size: i64,
    pub work_week: WorkWeek,
    pub start_date: NaiveDate,
}

impl ResolvedSettings {
    /// Resolve and validate the project's scheduling settings.
    pub fn resolve(
        project: &Project,
        defaults: &SchedulerDefaults,
        today: NaiveDate,
    ) -> Result<Self> {
        let takt_time = project.default_takt_time.unwrap_or(defaults.takt_time);
        check_takt_time(takt_time)?;
        let buffer_size = project
            .takt_config
            .as_ref()
            .and_then(|c| c.buffer_size)
            .unwrap_or(defaults.buffer_size);
        check_buffer("bufferSize", buffer_size)?;
        let work_week = match &project.working_days {
            Some(days) => WorkWeek::from_names(days.as_slice())?,
            None => WorkWeek::from_names(defaults.working_days.as_slice())?,
        };
        Ok(Self {
            takt_time,
            buffer_size,
            work_week,
            start_date: project.planned_start.unwrap_or(today),
        })
    }
}

/// Generates takt plans from project snapshots.
#[derive(Debug, Clone, Default)]
pub struct PlanAssembler {
    defaults: SchedulerDefaults,
}

impl PlanAssembler {
    #[must_use]
    pub const fn new(defaults: SchedulerDefaults) -> Self {
        Self { defaults }
    }

    /// Load the project, build the next plan version and persist it.
    ///
    /// Nothing is written when any precondition fails.
    pub fn generate<S>(&self, store: &S, project_id: &str, today: NaiveDate) -> Result<TaktPlan>
    where
        S: ProjectSource + PlanStore,
    {
        let project = store
            .project(project_id)?
            .ok_or_else(|| TaktError::ProjectNotFound(project_id.to_string()))?;
        let locations = store.locations(project_id)?;
        let trades = store.trades(project_id)?;
        let version = store.next_version(project_id)?;

        let mut plan = self.assemble(&project, &locations, &trades, version, today)?;
        store.insert_plan(&mut plan)?;

        info!(
            plan_id = %plan.header.id,
            project_id = %project_id,
            version = plan.header.version,
            zones = plan.zones.len(),
            wagons = plan.wagons.len(),
            assignments = plan.assignments.len(),
            total_periods = plan.header.total_periods,
            "generated takt plan"
        );
        if !plan.warnings.is_empty() {
            warn!(
                plan_id = %plan.header.id,
                stacking = plan.warnings.stacking_conflicts.len(),
                predecessors = plan.warnings.predecessor_violations.len(),
                buffers = plan.warnings.buffer_warnings.len(),
                "takt plan has validation issues"
            );
        }
        Ok(plan)
    }

    /// Build a plan in memory from a project snapshot.
    pub fn assemble(
        &self,
        project: &Project,
        locations: &[Location],
        trades: &[Trade],
        version: i64,
        today: NaiveDate,
    ) -> Result<TaktPlan> {
        let schedulable: Vec<&Location> = locations.iter().filter(|l| l.is_schedulable()).collect();
        if schedulable.is_empty() {
            return Err(TaktError::NoZones {
                project_id: project.id.clone(),
            });
        }
        let active: Vec<&Trade> = trades.iter().filter(|t| t.is_active).collect();
        if active.is_empty() {
            return Err(TaktError::NoTrades {
                project_id: project.id.clone(),
            });
        }

        let settings = ResolvedSettings::resolve(project, &self.defaults, today)?;
        for trade in &active {
            if let Some(buffer_after) = trade.buffer_after {
                check_buffer(&format!("bufferAfter of trade {}", trade.code), buffer_after)?;
            }
        }

        let plan_id = Uuid::new_v4().to_string();
        let grid_params = GridParams {
            takt_time: settings.takt_time,
            start_date: settings.start_date,
            work_week: settings.work_week,
        };
        let policy = BufferPolicy {
            buffer_size: settings.buffer_size,
            takt_time: settings.takt_time,
            work_week: settings.work_week,
        };

        let mut zones = Vec::new();
        let mut wagons = Vec::new();
        let mut assignments = Vec::new();
        let mut warnings = PlanWarnings::default();
        let mut total_periods = 0;

        for group in PhaseGroup::ALL {
            let group_locations: Vec<&Location> = schedulable
                .iter()
                .copied()
                .filter(|l| classify_location(&l.location_type, l.phase_hint) == group)
                .sorted_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)))
                .collect();
            let group_trades: Vec<&Trade> = active
                .iter()
                .copied()
                .filter(|t| classify_trade(t.discipline.as_deref(), &t.name) == group)
                .sorted_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.code.cmp(&b.code)))
                .collect();

            if group_locations.is_empty() || group_trades.is_empty() {
                debug!(
                    group = %group,
                    zones = group_locations.len(),
                    trades = group_trades.len(),
                    "skipping phase group"
                );
                continue;
            }

            let group_zones = build_zones(&plan_id, group, &group_locations);
            let group_wagons = build_wagons(&plan_id, group, &group_trades, &settings);
            let grid = generate_group(&group_zones, &group_wagons, &grid_params)?;

            let source_trades: Vec<Trade> = group_trades.iter().map(|t| (*t).clone()).collect();
            let group_warnings = validate_group(
                &GroupLayout {
                    zones: &group_zones,
                    wagons: &group_wagons,
                    assignments: &grid.assignments,
                    trades: &source_trades,
                },
                &policy,
            );

            debug!(
                group = %group,
                zones = group_zones.len(),
                wagons = group_wagons.len(),
                periods = grid.total_periods,
                issues = group_warnings.total_issues,
                "laid out phase group"
            );

            total_periods = total_periods.max(grid.total_periods);
            zones.extend(group_zones);
            wagons.extend(group_wagons);
            assignments.extend(grid.assignments);
            warnings.merge(group_warnings);
        }

        if zones.is_empty() {
            return Err(TaktError::NoMatches {
                project_id: project.id.clone(),
            });
        }

        let end_date = assignments
            .iter()
            .map(|a| a.planned_end)
            .max()
            .unwrap_or(settings.start_date);

        let header = PlanHeader {
            id: plan_id,
            project_id: project.id.clone(),
            name: PlanHeader::name_for(version),
            version,
            status: PlanStatus::Draft,
            takt_time: settings.takt_time,
            num_zones: count(zones.len()),
            num_trades: count(wagons.len()),
            total_periods,
            start_date: settings.start_date,
            end_date,
            buffer_type: "time".to_string(),
            buffer_size: settings.buffer_size,
            generated_by: GeneratedBy::Template,
            created_at: Utc::now().to_rfc3339(),
        };

        Ok(TaktPlan {
            header,
            zones,
            wagons,
            assignments,
            warnings,
        })
    }
}

/// Takt time must lie in `1..=MAX_TAKT_TIME`.
pub fn check_takt_time(takt_time: i64) -> Result<()> {
    if (1..=MAX_TAKT_TIME).contains(&takt_time) {
        Ok(())
    } else {
        Err(TaktError::InvalidTaktTime(takt_time))
    }
}

/// Buffers must lie in `0..=MAX_BUFFER_PERIODS`.
pub fn check_buffer(what: &str, periods: i64) -> Result<()> {
    if periods < 0 {
        return Err(TaktError::Config(format!(
            "{what} must not be negative, got {periods}"
        )));
    }
    if periods > MAX_BUFFER_PERIODS {
        return Err(TaktError::Config(format!(
            "{what} must be at most {MAX_BUFFER_PERIODS} periods, got {periods}"
        )));
    }
    Ok(())
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn build_zones(plan_id: &str, group: PhaseGroup, locations: &[&Location]) -> Vec<TaktZone> {
    locations
        .iter()
        .zip(1_i64..)
        .map(|(loc, sequence)| TaktZone {
            id: Uuid::new_v4().to_string(),
            plan_id: plan_id.to_string(),
            location_id: loc.id.clone(),
            phase_group: group,
            name: loc.name.clone(),
            code: format!("{}-Z{sequence:02}", group.code_prefix()),
            sequence,
        })
        .collect()
}

fn build_wagons(
    plan_id: &str,
    group: PhaseGroup,
    trades: &[&Trade],
    settings: &ResolvedSettings,
) -> Vec<TaktWagon> {
    let last = trades.len().saturating_sub(1);
    trades
        .iter()
        .enumerate()
        .map(|(idx, trade)| TaktWagon {
            id: Uuid::new_v4().to_string(),
            plan_id: plan_id.to_string(),
            trade_id: trade.id.clone(),
            phase_group: group,
            trade_name: trade.name.clone(),
            trade_code: trade.code.clone(),
            trade_color: trade.color.clone(),
            sequence: count(idx) + 1,
            duration_days: settings.takt_time,
            buffer_after: if idx == last {
                0
            } else {
                trade.buffer_after.unwrap_or(settings.buffer_size)
            },
        })
        .collect()
}

/// Check that a plan in `from` may become active.
pub fn check_activation(plan_id: &str, from: PlanStatus) -> Result<()> {
    match from {
        PlanStatus::Draft => Ok(()),
        PlanStatus::Active | PlanStatus::Superseded => Err(TaktError::InvalidStatusTransition {
            plan_id: plan_id.to_string(),
            from: from.to_string(),
            to: PlanStatus::Active.to_string(),
        }),
    }
}
