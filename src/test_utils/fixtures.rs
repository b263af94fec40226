use std::path::PathBuf;

use chrono::NaiveDate;
use serde_json::json;
use tempfile::TempDir;

use crate::scheduling::model::{Location, PhaseHint, Project, TaktConfig, Trade};
use crate::storage::{Database, ProjectSnapshot};

/// Test fixture providing an isolated database on disk.
pub struct TestDb {
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
    pub db: Database,
}

impl TestDb {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("takt.db");
        let db = Database::open(&db_path).expect("Failed to open database");

        println!("[FIXTURE] Created database: {}", db_path.display());

        Self {
            temp_dir,
            db_path,
            db,
        }
    }

    /// Fresh database with [`sample_snapshot`] imported.
    pub fn seeded() -> Self {
        let fixture = Self::new();
        fixture
            .db
            .import_snapshot(&sample_snapshot())
            .expect("Failed to import sample snapshot");
        fixture
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}

pub fn project(id: &str, planned_start: Option<NaiveDate>) -> Project {
    Project {
        id: id.to_string(),
        name: format!("Project {id}"),
        default_takt_time: Some(5),
        planned_start,
        working_days: None,
        takt_config: Some(TaktConfig {
            buffer_size: Some(1),
        }),
    }
}

pub fn location(
    id: &str,
    project_id: &str,
    name: &str,
    location_type: &str,
    sort_order: i64,
    phase_hint: PhaseHint,
) -> Location {
    Location {
        id: id.to_string(),
        project_id: project_id.to_string(),
        name: name.to_string(),
        code: None,
        location_type: location_type.to_string(),
        parent_id: None,
        sort_order,
        phase_hint,
    }
}

pub fn trade(
    id: &str,
    project_id: &str,
    code: &str,
    name: &str,
    sort_order: i64,
    predecessors: &[&str],
) -> Trade {
    Trade {
        id: id.to_string(),
        project_id: project_id.to_string(),
        code: code.to_string(),
        name: name.to_string(),
        discipline: None,
        predecessor_trade_ids: predecessors.iter().map(ToString::to_string).collect(),
        sort_order,
        color: None,
        is_active: true,
        buffer_after: None,
    }
}

/// A small two-phase project: a sector for excavation and two shell floors
/// with structure followed by roofing. Project id `tower-a`, start Monday
/// 2024-01-01.
pub fn sample_snapshot_json() -> serde_json::Value {
    json!({
        "project": {
            "id": "tower-a",
            "name": "Tower A",
            "defaultTaktTime": 5,
            "plannedStart": "2024-01-01",
            "workingDays": ["monday", "tuesday", "wednesday", "thursday", "friday"],
            "taktConfig": { "bufferSize": 1 }
        },
        "locations": [
            { "id": "site", "name": "Site", "locationType": "site" },
            { "id": "tower", "name": "Tower", "locationType": "building", "parentId": "site" },
            { "id": "sector-a", "name": "Sector A", "locationType": "sector", "sortOrder": 1 },
            { "id": "level-1", "name": "Level 1", "locationType": "floor", "sortOrder": 1,
              "parentId": "tower", "metadata": { "phase": "shell" } },
            { "id": "level-2", "name": "Level 2", "locationType": "floor", "sortOrder": 2,
              "parentId": "tower", "metadata": { "phase": "shell" } },
            { "id": "level-2-fit", "name": "Level 2 Interiors", "locationType": "zone",
              "sortOrder": 3, "metadata": { "phase": "fitout" } }
        ],
        "trades": [
            { "id": "trade-exc", "code": "EXC", "name": "Excavation", "sortOrder": 1,
              "color": "#8d6e63" },
            { "id": "trade-str", "code": "STR", "name": "Structure", "sortOrder": 2,
              "color": "#546e7a" },
            { "id": "trade-roof", "code": "ROOF", "name": "Roofing", "sortOrder": 3,
              "predecessorTradeIds": ["trade-str"], "color": "#ef6c00" },
            { "id": "trade-old", "code": "OLD", "name": "Retired Crew", "sortOrder": 9,
              "isActive": false }
        ]
    })
}

pub fn sample_snapshot() -> ProjectSnapshot {
    serde_json::from_value(sample_snapshot_json()).expect("sample snapshot is valid")
}
