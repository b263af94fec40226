//! Database migrations

use rusqlite::Connection;

use crate::error::{Result, TaktError};

const MIGRATIONS: [&str; 2] = [
    include_str!("../../migrations/001_initial_schema.sql"),
    include_str!("../../migrations/002_takt_plans.sql"),
];

#[allow(clippy::cast_possible_truncation)]
pub const SCHEMA_VERSION: u32 = MIGRATIONS.len() as u32;

/// Run all migrations on the database
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    let current_version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(|err| TaktError::TransactionFailed(err.to_string()))?;

    for (target_version, sql) in (1..).zip(MIGRATIONS.iter()) {
        if current_version >= target_version {
            continue;
        }

        conn.execute_batch(sql).map_err(|err| {
            TaktError::TransactionFailed(format!("migration {target_version} failed: {err}"))
        })?;
        conn.pragma_update(None, "user_version", target_version)
            .map_err(|err| {
                TaktError::TransactionFailed(format!(
                    "failed to set user_version {target_version}: {err}"
                ))
            })?;
    }

    Ok(SCHEMA_VERSION)
}
