use chrono::NaiveDate;
use serde_json::{Value, json};

use takt::TaktError;
use takt::error::ErrorCode;
use takt::scheduling::model::{BufferSeverity, PhaseGroup};
use takt::scheduling::{PlanAssembler, PlanStatus, PlanStore, ProjectSource, plan_summary};
use takt::storage::{Database, ProjectSnapshot};
use takt::test_utils::fixtures::TestDb;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2024, 3, 4)
}

fn snapshot(locations: Value, trades: Value) -> Value {
    json!({
        "project": {
            "id": "p1",
            "name": "Scenario",
            "defaultTaktTime": 5,
            "plannedStart": "2024-01-01",
            "workingDays": ["mon", "tue", "wed", "thu", "fri"],
            "taktConfig": { "bufferSize": 1 }
        },
        "locations": locations,
        "trades": trades
    })
}

fn two_floors(phase: &str) -> Value {
    json!([
        { "id": "f1", "name": "Floor 1", "locationType": "floor", "sortOrder": 1,
          "metadata": { "phase": phase } },
        { "id": "f2", "name": "Floor 2", "locationType": "floor", "sortOrder": 2,
          "metadata": { "phase": phase } }
    ])
}

fn seeded(value: &Value) -> TestDb {
    let fixture = TestDb::new();
    let snapshot = ProjectSnapshot::from_json(&value.to_string()).unwrap();
    fixture.db.import_snapshot(&snapshot).unwrap();
    fixture
}

fn plan_rows(db: &Database) -> i64 {
    db.conn()
        .query_row("SELECT COUNT(*) FROM takt_plans", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn two_zones_two_trades_scenario() {
    let fixture = seeded(&snapshot(
        two_floors("shell"),
        json!([
            { "id": "t-str", "code": "STR", "name": "Structure", "sortOrder": 1 },
            { "id": "t-fac", "code": "FAC", "name": "Facade", "sortOrder": 2 }
        ]),
    ));

    let plan = PlanAssembler::default()
        .generate(&fixture.db, "p1", today())
        .unwrap();

    assert_eq!(plan.header.total_periods, 4);
    assert_eq!(plan.header.num_zones, 2);
    assert_eq!(plan.header.num_trades, 2);
    assert_eq!(plan.header.start_date, date(2024, 1, 1));
    assert_eq!(plan.header.end_date, date(2024, 1, 29));
    assert!(plan.warnings.is_empty());

    let codes: Vec<&str> = plan.zones.iter().map(|z| z.code.as_str()).collect();
    assert_eq!(codes, vec!["SH-Z01", "SH-Z02"]);

    let mut periods: Vec<(String, String, i64, NaiveDate, NaiveDate)> = plan
        .assignments
        .iter()
        .map(|a| {
            let zone = plan.zones.iter().find(|z| z.id == a.zone_id).unwrap();
            let wagon = plan.wagons.iter().find(|w| w.id == a.wagon_id).unwrap();
            (
                wagon.trade_code.clone(),
                zone.code.clone(),
                a.period_number,
                a.planned_start,
                a.planned_end,
            )
        })
        .collect();
    periods.sort_by_key(|row| row.2);

    assert_eq!(
        periods,
        vec![
            ("STR".into(), "SH-Z01".into(), 0, date(2024, 1, 1), date(2024, 1, 8)),
            ("STR".into(), "SH-Z02".into(), 1, date(2024, 1, 8), date(2024, 1, 15)),
            ("FAC".into(), "SH-Z01".into(), 2, date(2024, 1, 15), date(2024, 1, 22)),
            ("FAC".into(), "SH-Z02".into(), 3, date(2024, 1, 22), date(2024, 1, 29)),
        ]
    );
}

#[test]
fn sample_project_spans_two_groups() {
    let fixture = TestDb::seeded();
    let plan = PlanAssembler::default()
        .generate(&fixture.db, "tower-a", today())
        .unwrap();

    assert_eq!(plan.header.num_zones, 3);
    assert_eq!(plan.header.num_trades, 3);
    assert_eq!(plan.header.total_periods, 4);
    assert_eq!(plan.header.name, "Takt Plan v1");
    assert_eq!(plan.header.status, PlanStatus::Draft);

    let groups: Vec<PhaseGroup> = plan.zones.iter().map(|z| z.phase_group).collect();
    assert_eq!(
        groups,
        vec![PhaseGroup::Substructure, PhaseGroup::Shell, PhaseGroup::Shell]
    );
    // Fitout has a zone but no trade, so it is left out.
    assert!(plan.wagons.iter().all(|w| w.phase_group != PhaseGroup::Fitout));
    assert!(plan.wagons.iter().all(|w| w.trade_code != "OLD"));

    let summary = plan_summary(&plan);
    assert_eq!(summary.total_days, 20);
    assert_eq!(summary.total_assignments, plan.assignments.len());
}

#[test]
fn reversed_predecessor_reported_once_per_zone() {
    let fixture = seeded(&snapshot(
        two_floors("fitout"),
        json!([
            { "id": "t-dry", "code": "DRY", "name": "Drywall", "sortOrder": 1,
              "predecessorTradeIds": ["t-ceil"] },
            { "id": "t-ceil", "code": "CEIL", "name": "Ceilings", "sortOrder": 2 }
        ]),
    ));

    let plan = PlanAssembler::default()
        .generate(&fixture.db, "p1", today())
        .unwrap();

    let violations = &plan.warnings.predecessor_violations;
    assert_eq!(violations.len(), 2);
    for violation in violations {
        assert_eq!(violation.predecessor_trade_id, "t-ceil");
        assert_eq!(violation.successor_trade_id, "t-dry");
        assert!(violation.predecessor_finish > violation.successor_start);
    }
    assert_ne!(violations[0].zone_id, violations[1].zone_id);
    assert_eq!(plan.warnings.total_issues, 2);

    let stored = fixture.db.get_plan(&plan.header.id).unwrap().unwrap();
    assert_eq!(stored.warnings, plan.warnings);
}

#[test]
fn zero_trade_buffer_raises_buffer_warnings() {
    let fixture = seeded(&snapshot(
        two_floors("shell"),
        json!([
            { "id": "t-str", "code": "STR", "name": "Structure", "sortOrder": 1,
              "bufferAfter": 0 },
            { "id": "t-roof", "code": "ROOF", "name": "Roofing", "sortOrder": 2 }
        ]),
    ));

    let plan = PlanAssembler::default()
        .generate(&fixture.db, "p1", today())
        .unwrap();

    assert_eq!(plan.header.total_periods, 3);
    let buffers = &plan.warnings.buffer_warnings;
    assert_eq!(buffers.len(), 2);
    for warning in buffers {
        assert_eq!(warning.gap_days, 0);
        assert_eq!(warning.required_days, 5);
        assert_eq!(warning.missing_days, 5);
        assert_eq!(warning.severity, BufferSeverity::High);
    }
    assert!(plan.warnings.stacking_conflicts.is_empty());
}

#[test]
fn no_schedulable_locations_persists_nothing() {
    let fixture = seeded(&snapshot(
        json!([
            { "id": "site", "name": "Site", "locationType": "site" },
            { "id": "b1", "name": "Block", "locationType": "building" }
        ]),
        json!([{ "id": "t-str", "code": "STR", "name": "Structure" }]),
    ));

    let err = PlanAssembler::default()
        .generate(&fixture.db, "p1", today())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoZones);
    assert_eq!(err.code().http_status(), 400);
    assert_eq!(plan_rows(&fixture.db), 0);
}

#[test]
fn inactive_trades_only_is_no_trades() {
    let fixture = seeded(&snapshot(
        two_floors("shell"),
        json!([{ "id": "t-str", "code": "STR", "name": "Structure", "isActive": false }]),
    ));

    let err = PlanAssembler::default()
        .generate(&fixture.db, "p1", today())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoTrades);
    assert_eq!(plan_rows(&fixture.db), 0);
}

#[test]
fn substructure_zones_with_fitout_trades_is_no_matches() {
    let fixture = seeded(&snapshot(
        json!([
            { "id": "s1", "name": "Sector 1", "locationType": "sector" },
            { "id": "g1", "name": "Grid A", "locationType": "grid" }
        ]),
        json!([{ "id": "t-pnt", "code": "PNT", "name": "Painting" }]),
    ));

    let err = PlanAssembler::default()
        .generate(&fixture.db, "p1", today())
        .unwrap_err();
    assert!(matches!(err, TaktError::NoMatches { .. }));
    assert_eq!(plan_rows(&fixture.db), 0);
}

#[test]
fn configuration_errors_are_rejected_before_writing() {
    let mut value = snapshot(two_floors("shell"), json!([{ "id": "t", "code": "T", "name": "Structure" }]));
    value["project"]["workingDays"] = json!([]);
    let fixture = seeded(&value);
    let err = PlanAssembler::default()
        .generate(&fixture.db, "p1", today())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::EmptyWorkWeek);

    let mut value = snapshot(two_floors("shell"), json!([{ "id": "t", "code": "T", "name": "Structure" }]));
    value["project"]["defaultTaktTime"] = json!(0);
    let fixture = seeded(&value);
    let err = PlanAssembler::default()
        .generate(&fixture.db, "p1", today())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidTaktTime);
    assert_eq!(plan_rows(&fixture.db), 0);
}

#[test]
fn unknown_project_is_not_found() {
    let fixture = TestDb::new();
    let err = PlanAssembler::default()
        .generate(&fixture.db, "ghost", today())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.code().http_status(), 404);
}

#[test]
fn missing_start_date_falls_back_to_today() {
    let mut value = snapshot(two_floors("shell"), json!([{ "id": "t", "code": "T", "name": "Structure" }]));
    value["project"]["plannedStart"] = Value::Null;
    let fixture = seeded(&value);

    let project = fixture.db.project("p1").unwrap().unwrap();
    assert!(project.planned_start.is_none());

    let plan = PlanAssembler::default()
        .generate(&fixture.db, "p1", today())
        .unwrap();
    assert_eq!(plan.header.start_date, today());
}

#[test]
fn storage_failure_leaves_no_plan_rows() {
    let fixture = TestDb::seeded();
    fixture
        .db
        .conn()
        .execute_batch(
            "CREATE TRIGGER fail_wagons BEFORE INSERT ON takt_wagons
             BEGIN SELECT RAISE(ABORT, 'no space'); END;",
        )
        .unwrap();

    let err = PlanAssembler::default()
        .generate(&fixture.db, "tower-a", today())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::TransactionFailed);
    assert_eq!(plan_rows(&fixture.db), 0);
    assert!(fixture.db.list_plans("tower-a").unwrap().is_empty());
}

#[test]
fn activation_lifecycle_survives_reopen() {
    let fixture = TestDb::seeded();
    let assembler = PlanAssembler::default();
    let v1 = assembler.generate(&fixture.db, "tower-a", today()).unwrap();
    let v2 = assembler.generate(&fixture.db, "tower-a", today()).unwrap();
    fixture.db.activate_plan(&v1.header.id).unwrap();
    fixture.db.activate_plan(&v2.header.id).unwrap();

    let reopened = Database::open(&fixture.db_path).unwrap();
    let plans = reopened.list_plans("tower-a").unwrap();
    let status_of = |id: &str| plans.iter().find(|p| p.id == id).unwrap().status;
    assert_eq!(status_of(&v1.header.id), PlanStatus::Superseded);
    assert_eq!(status_of(&v2.header.id), PlanStatus::Active);

    let err = reopened.activate_plan(&v2.header.id).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidStatusTransition);
    assert_eq!(err.code().http_status(), 409);
}
