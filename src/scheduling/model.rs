//! Domain types shared by the scheduling pipeline, storage and surfaces.
//!
//! All records serialize as camelCase JSON with `YYYY-MM-DD` dates.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TaktError};

// =============================================================================
// Phase groups
// =============================================================================

/// Construction phase a zone or wagon belongs to.
///
/// Groups are scheduled independently and always appear in the order
/// substructure, shell, fitout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseGroup {
    Substructure,
    Shell,
    Fitout,
}

impl PhaseGroup {
    pub const ALL: [Self; 3] = [Self::Substructure, Self::Shell, Self::Fitout];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Substructure => "substructure",
            Self::Shell => "shell",
            Self::Fitout => "fitout",
        }
    }

    /// Prefix used in generated zone codes (`SB-Z01`).
    #[must_use]
    pub const fn code_prefix(self) -> &'static str {
        match self {
            Self::Substructure => "SB",
            Self::Shell => "SH",
            Self::Fitout => "FO",
        }
    }
}

impl fmt::Display for PhaseGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseGroup {
    type Err = TaktError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "substructure" => Ok(Self::Substructure),
            "shell" => Ok(Self::Shell),
            "fitout" => Ok(Self::Fitout),
            other => Err(TaktError::Serialization(format!("unknown phase group: {other}"))),
        }
    }
}

/// Phase hint carried by a location's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseHint {
    Shell,
    Fitout,
    #[default]
    Unspecified,
}

impl PhaseHint {
    /// Read `metadata.phase`; anything unrecognized is `Unspecified`.
    #[must_use]
    pub fn from_metadata(metadata: Option<&Value>) -> Self {
        let phase = metadata
            .and_then(|m| m.get("phase"))
            .and_then(Value::as_str)
            .map(|s| s.trim().to_ascii_lowercase());
        match phase.as_deref() {
            Some("shell") => Self::Shell,
            Some("fitout" | "fit-out" | "fit_out" | "fit out") => Self::Fitout,
            _ => Self::Unspecified,
        }
    }
}

// =============================================================================
// Collaborator snapshot (project, locations, trades)
// =============================================================================

/// Takt settings stored on the project record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaktConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Takt time in working days. Falls back to the configured default.
    #[serde(default)]
    pub default_takt_time: Option<i64>,
    #[serde(default)]
    pub planned_start: Option<NaiveDate>,
    /// Weekday names (`monday` ..). `None` means the configured default.
    #[serde(default)]
    pub working_days: Option<Vec<String>>,
    #[serde(default)]
    pub takt_config: Option<TaktConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub location_type: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub phase_hint: PhaseHint,
}

impl Location {
    /// Location types that become takt zones.
    pub const SCHEDULABLE_TYPES: [&'static str; 4] = ["sector", "grid", "floor", "zone"];

    #[must_use]
    pub fn is_schedulable(&self) -> bool {
        Self::SCHEDULABLE_TYPES.contains(&self.location_type.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub discipline: Option<String>,
    #[serde(default)]
    pub predecessor_trade_ids: Vec<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Buffer periods after this trade, overriding the plan buffer size.
    #[serde(default)]
    pub buffer_after: Option<i64>,
}

const fn default_true() -> bool {
    true
}

// =============================================================================
// Takt plan
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Draft,
    Active,
    Superseded,
}

impl PlanStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Superseded => "superseded",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanStatus {
    type Err = TaktError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "superseded" => Ok(Self::Superseded),
            other => Err(TaktError::Serialization(format!("unknown plan status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratedBy {
    Template,
    Ai,
}

impl GeneratedBy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Ai => "ai",
        }
    }
}

impl FromStr for GeneratedBy {
    type Err = TaktError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "template" => Ok(Self::Template),
            "ai" => Ok(Self::Ai),
            other => Err(TaktError::Serialization(format!("unknown generator: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Planned,
    InProgress,
    Completed,
    Delayed,
}

impl AssignmentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Delayed => "delayed",
        }
    }
}

impl FromStr for AssignmentStatus {
    type Err = TaktError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "planned" => Ok(Self::Planned),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "delayed" => Ok(Self::Delayed),
            other => Err(TaktError::Serialization(format!(
                "unknown assignment status: {other}"
            ))),
        }
    }
}

/// Plan header without children, as returned by plan listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanHeader {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub version: i64,
    pub status: PlanStatus,
    pub takt_time: i64,
    pub num_zones: i64,
    pub num_trades: i64,
    pub total_periods: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub buffer_type: String,
    pub buffer_size: i64,
    pub generated_by: GeneratedBy,
    pub created_at: String,
}

impl PlanHeader {
    #[must_use]
    pub fn name_for(version: i64) -> String {
        format!("Takt Plan v{version}")
    }

    /// Renumber the plan, keeping the name in step with the version.
    pub fn set_version(&mut self, version: i64) {
        self.version = version;
        self.name = Self::name_for(version);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaktZone {
    pub id: String,
    pub plan_id: String,
    pub location_id: String,
    pub phase_group: PhaseGroup,
    pub name: String,
    pub code: String,
    pub sequence: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaktWagon {
    pub id: String,
    pub plan_id: String,
    pub trade_id: String,
    pub phase_group: PhaseGroup,
    pub trade_name: String,
    pub trade_code: String,
    pub trade_color: Option<String>,
    pub sequence: i64,
    pub duration_days: i64,
    pub buffer_after: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaktAssignment {
    pub id: String,
    pub plan_id: String,
    pub zone_id: String,
    pub wagon_id: String,
    pub phase_group: PhaseGroup,
    pub period_number: i64,
    pub planned_start: NaiveDate,
    pub planned_end: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end: Option<NaiveDate>,
    pub status: AssignmentStatus,
    pub progress_pct: f64,
}

impl TaktAssignment {
    /// Date the assignment frees its zone: actual end when recorded.
    #[must_use]
    pub fn finish_date(&self) -> NaiveDate {
        self.actual_end.unwrap_or(self.planned_end)
    }
}

/// A complete plan with its zones, wagons, assignments and warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaktPlan {
    #[serde(flatten)]
    pub header: PlanHeader,
    pub zones: Vec<TaktZone>,
    pub wagons: Vec<TaktWagon>,
    pub assignments: Vec<TaktAssignment>,
    pub warnings: PlanWarnings,
}

// =============================================================================
// Warnings
// =============================================================================

/// Two wagons occupying the same zone over overlapping dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackingConflict {
    pub phase_group: PhaseGroup,
    pub zone_id: String,
    pub first_assignment_id: String,
    pub second_assignment_id: String,
    pub first_wagon_id: String,
    pub second_wagon_id: String,
    pub overlap_start: NaiveDate,
    pub overlap_end: NaiveDate,
}

/// A trade starting in a zone before its predecessor has finished there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredecessorViolation {
    pub phase_group: PhaseGroup,
    pub zone_id: String,
    pub predecessor_trade_id: String,
    pub successor_trade_id: String,
    pub predecessor_assignment_id: String,
    pub successor_assignment_id: String,
    pub predecessor_finish: NaiveDate,
    pub successor_start: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferSeverity {
    Low,
    Medium,
    High,
}

impl BufferSeverity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Gap between consecutive wagons in a zone smaller than the plan buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferWarning {
    pub phase_group: PhaseGroup,
    pub zone_id: String,
    pub previous_assignment_id: String,
    pub next_assignment_id: String,
    pub gap_days: i64,
    pub required_days: i64,
    pub missing_days: i64,
    pub severity: BufferSeverity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanWarnings {
    pub stacking_conflicts: Vec<StackingConflict>,
    pub predecessor_violations: Vec<PredecessorViolation>,
    pub buffer_warnings: Vec<BufferWarning>,
    pub total_issues: usize,
}

impl PlanWarnings {
    /// Append another group's findings and refresh the total.
    pub fn merge(&mut self, other: Self) {
        self.stacking_conflicts.extend(other.stacking_conflicts);
        self.predecessor_violations
            .extend(other.predecessor_violations);
        self.buffer_warnings.extend(other.buffer_warnings);
        self.recount();
    }

    pub fn recount(&mut self) {
        self.total_issues = self.stacking_conflicts.len()
            + self.predecessor_violations.len()
            + self.buffer_warnings.len();
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_issues == 0
    }
}
