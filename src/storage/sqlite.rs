//! SQLite database layer

use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};
use tracing::debug;

use crate::error::{Result, TaktError};
use crate::scheduling::assembler::{PlanStore, ProjectSource, check_activation};
use crate::scheduling::model::{
    Location, PhaseHint, PlanHeader, PlanStatus, PlanWarnings, Project, TaktAssignment, TaktConfig,
    TaktPlan, TaktWagon, TaktZone, Trade,
};
use crate::storage::migrations;
use crate::storage::snapshot::{ImportSummary, ProjectSnapshot};

/// SQLite database holding project snapshots and takt plans
pub struct Database {
    conn: Connection,
    schema_version: u32,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("schema_version", &self.schema_version)
            .finish_non_exhaustive()
    }
}

const PLAN_COLUMNS: &str = "id, project_id, name, version, status, takt_time, num_zones, \
     num_trades, total_periods, start_date, end_date, buffer_type, buffer_size, generated_by, \
     created_at";

impl Database {
    /// Open database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::configure_pragmas(&conn)?;
        let schema_version = migrations::run_migrations(&conn)?;
        debug!(path = %path.display(), schema_version, "opened database");

        Ok(Self {
            conn,
            schema_version,
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let schema_version = migrations::run_migrations(&conn)?;
        Ok(Self {
            conn,
            schema_version,
        })
    }

    /// Get a reference to the connection
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Current schema version after migrations.
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Replace a project's snapshot (project row, locations and trades).
    ///
    /// Existing plans of the project are kept.
    pub fn import_snapshot(&self, snapshot: &ProjectSnapshot) -> Result<ImportSummary> {
        let project = &snapshot.project;
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO projects (
                id, name, default_takt_time, planned_start, working_days_json,
                takt_config_json, imported_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name=excluded.name,
                default_takt_time=excluded.default_takt_time,
                planned_start=excluded.planned_start,
                working_days_json=excluded.working_days_json,
                takt_config_json=excluded.takt_config_json,
                imported_at=excluded.imported_at",
            params![
                project.id,
                project.name,
                project.default_takt_time,
                project.planned_start.map(|d| d.to_string()),
                project
                    .working_days
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                project
                    .takt_config
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                Utc::now().to_rfc3339(),
            ],
        )?;

        tx.execute("DELETE FROM locations WHERE project_id = ?", [&project.id])?;
        tx.execute("DELETE FROM trades WHERE project_id = ?", [&project.id])?;

        let locations = snapshot.locations();
        for loc in &locations {
            tx.execute(
                "INSERT INTO locations (
                    id, project_id, name, code, location_type, parent_id, sort_order, phase_hint
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    loc.id,
                    loc.project_id,
                    loc.name,
                    loc.code,
                    loc.location_type,
                    loc.parent_id,
                    loc.sort_order,
                    phase_hint_str(loc.phase_hint),
                ],
            )?;
        }

        let trades = snapshot.trades();
        for trade in &trades {
            tx.execute(
                "INSERT INTO trades (
                    id, project_id, code, name, discipline, predecessor_ids_json,
                    sort_order, color, is_active, buffer_after
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    trade.id,
                    trade.project_id,
                    trade.code,
                    trade.name,
                    trade.discipline,
                    serde_json::to_string(&trade.predecessor_trade_ids)?,
                    trade.sort_order,
                    trade.color,
                    trade.is_active,
                    trade.buffer_after,
                ],
            )?;
        }

        tx.commit()?;
        Ok(ImportSummary {
            project_id: project.id.clone(),
            locations: locations.len(),
            trades: trades.len(),
        })
    }

    fn insert_plan_rows(tx: &Transaction<'_>, plan: &TaktPlan) -> Result<()> {
        let h = &plan.header;
        tx.execute(
            "INSERT INTO takt_plans (
                id, project_id, name, version, status, takt_time, num_zones, num_trades,
                total_periods, start_date, end_date, buffer_type, buffer_size, generated_by,
                warnings_json, created_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                h.id,
                h.project_id,
                h.name,
                h.version,
                h.status.as_str(),
                h.takt_time,
                h.num_zones,
                h.num_trades,
                h.total_periods,
                h.start_date.to_string(),
                h.end_date.to_string(),
                h.buffer_type,
                h.buffer_size,
                h.generated_by.as_str(),
                serde_json::to_string(&plan.warnings)?,
                h.created_at,
            ],
        )?;

        let mut zone_stmt = tx.prepare(
            "INSERT INTO takt_zones (id, plan_id, location_id, phase_group, name, code, sequence)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )?;
        for z in &plan.zones {
            zone_stmt.execute(params![
                z.id,
                z.plan_id,
                z.location_id,
                z.phase_group.as_str(),
                z.name,
                z.code,
                z.sequence,
            ])?;
        }

        let mut wagon_stmt = tx.prepare(
            "INSERT INTO takt_wagons (
                id, plan_id, trade_id, phase_group, trade_name, trade_code, trade_color,
                sequence, duration_days, buffer_after
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )?;
        for w in &plan.wagons {
            wagon_stmt.execute(params![
                w.id,
                w.plan_id,
                w.trade_id,
                w.phase_group.as_str(),
                w.trade_name,
                w.trade_code,
                w.trade_color,
                w.sequence,
                w.duration_days,
                w.buffer_after,
            ])?;
        }

        let mut assignment_stmt = tx.prepare(
            "INSERT INTO takt_assignments (
                id, plan_id, zone_id, wagon_id, phase_group, period_number, planned_start,
                planned_end, actual_start, actual_end, status, progress_pct
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )?;
        for a in &plan.assignments {
            assignment_stmt.execute(params![
                a.id,
                a.plan_id,
                a.zone_id,
                a.wagon_id,
                a.phase_group.as_str(),
                a.period_number,
                a.planned_start.to_string(),
                a.planned_end.to_string(),
                a.actual_start.map(|d| d.to_string()),
                a.actual_end.map(|d| d.to_string()),
                a.status.as_str(),
                a.progress_pct,
            ])?;
        }
        Ok(())
    }

    /// `BEGIN IMMEDIATE`: takes the write lock up front, waiting out other
    /// writers for up to `busy_timeout`.
    fn write_transaction(&self) -> Result<Transaction<'_>> {
        Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)
            .map_err(|err| TaktError::TransactionFailed(err.to_string()))
    }

    fn next_version_in(conn: &Connection, project_id: &str) -> Result<i64> {
        let version: i64 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM takt_plans WHERE project_id = ?",
            [project_id],
            |row| row.get(0),
        )?;
        Ok(version)
    }

    fn plan_header(&self, plan_id: &str) -> Result<Option<(PlanHeader, String)>> {
        let sql = format!("SELECT {PLAN_COLUMNS}, warnings_json FROM takt_plans WHERE id = ?");
        let row = self
            .conn
            .query_row(&sql, [plan_id], |row| {
                Ok((plan_header_from_row(row)?, row.get::<_, String>(15)?))
            })
            .optional()?;
        Ok(row)
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA busy_timeout = 5000;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }
}

impl ProjectSource for Database {
    fn project(&self, project_id: &str) -> Result<Option<Project>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, default_takt_time, planned_start, working_days_json,
                        takt_config_json
                 FROM projects WHERE id = ?",
                [project_id],
                project_from_row,
            )
            .optional()?;
        Ok(row)
    }

    fn locations(&self, project_id: &str) -> Result<Vec<Location>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, name, code, location_type, parent_id, sort_order, phase_hint
             FROM locations WHERE project_id = ? ORDER BY sort_order, name",
        )?;
        let rows = stmt.query_map([project_id], location_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn trades(&self, project_id: &str) -> Result<Vec<Trade>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, code, name, discipline, predecessor_ids_json, sort_order,
                    color, is_active, buffer_after
             FROM trades WHERE project_id = ? ORDER BY sort_order, code",
        )?;
        let rows = stmt.query_map([project_id], trade_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl PlanStore for Database {
    fn next_version(&self, project_id: &str) -> Result<i64> {
        Self::next_version_in(&self.conn, project_id)
    }

    fn insert_plan(&self, plan: &mut TaktPlan) -> Result<()> {
        let tx = self.write_transaction()?;
        // Dropping `tx` on error rolls back every row written so far.
        let version = Self::next_version_in(&tx, &plan.header.project_id)
            .map_err(|err| TaktError::TransactionFailed(err.to_string()))?;
        if version != plan.header.version {
            debug!(
                plan_id = %plan.header.id,
                assembled = plan.header.version,
                stored = version,
                "renumbering plan claimed by a concurrent writer"
            );
            plan.header.set_version(version);
        }
        Self::insert_plan_rows(&tx, plan).map_err(|err| {
            TaktError::TransactionFailed(format!("writing plan {}: {err}", plan.header.id))
        })?;
        tx.commit()
            .map_err(|err| TaktError::TransactionFailed(err.to_string()))?;
        Ok(())
    }

    fn get_plan(&self, plan_id: &str) -> Result<Option<TaktPlan>> {
        let Some((header, warnings_json)) = self.plan_header(plan_id)? else {
            return Ok(None);
        };
        let warnings: PlanWarnings = serde_json::from_str(&warnings_json)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, plan_id, location_id, phase_group, name, code, sequence
             FROM takt_zones WHERE plan_id = ?
             ORDER BY CASE phase_group WHEN 'substructure' THEN 0 WHEN 'shell' THEN 1 ELSE 2 END,
                      sequence",
        )?;
        let zones = stmt
            .query_map([plan_id], zone_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT id, plan_id, trade_id, phase_group, trade_name, trade_code, trade_color,
                    sequence, duration_days, buffer_after
             FROM takt_wagons WHERE plan_id = ?
             ORDER BY CASE phase_group WHEN 'substructure' THEN 0 WHEN 'shell' THEN 1 ELSE 2 END,
                      sequence",
        )?;
        let wagons = stmt
            .query_map([plan_id], wagon_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.plan_id, a.zone_id, a.wagon_id, a.phase_group, a.period_number,
                    a.planned_start, a.planned_end, a.actual_start, a.actual_end, a.status,
                    a.progress_pct
             FROM takt_assignments a
             JOIN takt_zones z ON z.id = a.zone_id
             WHERE a.plan_id = ?
             ORDER BY CASE a.phase_group WHEN 'substructure' THEN 0 WHEN 'shell' THEN 1 ELSE 2 END,
                      z.sequence, a.period_number",
        )?;
        let assignments = stmt
            .query_map([plan_id], assignment_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(TaktPlan {
            header,
            zones,
            wagons,
            assignments,
            warnings,
        }))
    }

    fn list_plans(&self, project_id: &str) -> Result<Vec<PlanHeader>> {
        let sql = format!(
            "SELECT {PLAN_COLUMNS} FROM takt_plans WHERE project_id = ? ORDER BY version DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([project_id], plan_header_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn activate_plan(&self, plan_id: &str) -> Result<PlanHeader> {
        // Status is read under the write lock so a concurrent activation
        // cannot slip in between the check and the update.
        let tx = self.write_transaction()?;
        let Some((header, _)) = self.plan_header(plan_id)? else {
            return Err(TaktError::PlanNotFound(plan_id.to_string()));
        };
        check_activation(plan_id, header.status)?;

        tx.execute(
            "UPDATE takt_plans SET status = 'superseded'
             WHERE project_id = ? AND status = 'active' AND id <> ?",
            params![header.project_id, plan_id],
        )?;
        let updated = tx.execute(
            "UPDATE takt_plans SET status = 'active' WHERE id = ? AND status = 'draft'",
            [plan_id],
        )?;
        if updated != 1 {
            return Err(TaktError::InvalidStatusTransition {
                plan_id: plan_id.to_string(),
                from: header.status.to_string(),
                to: PlanStatus::Active.to_string(),
            });
        }
        tx.commit()
            .map_err(|err| TaktError::TransactionFailed(err.to_string()))?;

        Ok(PlanHeader {
            status: PlanStatus::Active,
            ..header
        })
    }
}

fn phase_hint_str(hint: PhaseHint) -> &'static str {
    match hint {
        PhaseHint::Shell => "shell",
        PhaseHint::Fitout => "fitout",
        PhaseHint::Unspecified => "unspecified",
    }
}

fn conversion_error(idx: usize, err: TaktError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parsed_column<T: FromStr<Err = TaktError>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|err| conversion_error(idx, err))
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    parse_date(idx, &raw)
}

fn optional_date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| parse_date(idx, &s)).transpose()
}

fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| conversion_error(idx, TaktError::Serialization(format!("bad date {raw}: {err}"))))
}

fn json_column<T: serde::de::DeserializeOwned>(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| serde_json::from_str(&s).map_err(|err| conversion_error(idx, err.into())))
        .transpose()
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        default_takt_time: row.get(2)?,
        planned_start: optional_date_column(row, 3)?,
        working_days: json_column::<Vec<String>>(row, 4)?,
        takt_config: json_column::<TaktConfig>(row, 5)?,
    })
}

fn location_from_row(row: &Row<'_>) -> rusqlite::Result<Location> {
    let hint: String = row.get(7)?;
    Ok(Location {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        code: row.get(3)?,
        location_type: row.get(4)?,
        parent_id: row.get(5)?,
        sort_order: row.get(6)?,
        phase_hint: match hint.as_str() {
            "shell" => PhaseHint::Shell,
            "fitout" => PhaseHint::Fitout,
            _ => PhaseHint::Unspecified,
        },
    })
}

fn trade_from_row(row: &Row<'_>) -> rusqlite::Result<Trade> {
    Ok(Trade {
        id: row.get(0)?,
        project_id: row.get(1)?,
        code: row.get(2)?,
        name: row.get(3)?,
        discipline: row.get(4)?,
        predecessor_trade_ids: json_column(row, 5)?.unwrap_or_default(),
        sort_order: row.get(6)?,
        color: row.get(7)?,
        is_active: row.get(8)?,
        buffer_after: row.get(9)?,
    })
}

fn plan_header_from_row(row: &Row<'_>) -> rusqlite::Result<PlanHeader> {
    Ok(PlanHeader {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        version: row.get(3)?,
        status: parsed_column(row, 4)?,
        takt_time: row.get(5)?,
        num_zones: row.get(6)?,
        num_trades: row.get(7)?,
        total_periods: row.get(8)?,
        start_date: date_column(row, 9)?,
        end_date: date_column(row, 10)?,
        buffer_type: row.get(11)?,
        buffer_size: row.get(12)?,
        generated_by: parsed_column(row, 13)?,
        created_at: row.get(14)?,
    })
}

fn zone_from_row(row: &Row<'_>) -> rusqlite::Result<TaktZone> {
    Ok(TaktZone {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        location_id: row.get(2)?,
        phase_group: parsed_column(row, 3)?,
        name: row.get(4)?,
        code: row.get(5)?,
        sequence: row.get(6)?,
    })
}

fn wagon_from_row(row: &Row<'_>) -> rusqlite::Result<TaktWagon> {
    Ok(TaktWagon {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        trade_id: row.get(2)?,
        phase_group: parsed_column(row, 3)?,
        trade_name: row.get(4)?,
        trade_code: row.get(5)?,
        trade_color: row.get(6)?,
        sequence: row.get(7)?,
        duration_days: row.get(8)?,
        buffer_after: row.get(9)?,
    })
}

fn assignment_from_row(row: &Row<'_>) -> rusqlite::Result<TaktAssignment> {
    Ok(TaktAssignment {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        zone_id: row.get(2)?,
        wagon_id: row.get(3)?,
        phase_group: parsed_column(row, 4)?,
        period_number: row.get(5)?,
        planned_start: date_column(row, 6)?,
        planned_end: date_column(row, 7)?,
        actual_start: optional_date_column(row, 8)?,
        actual_end: optional_date_column(row, 9)?,
        status: parsed_column(row, 10)?,
        progress_pct: row.get(11)?,
    })
}
