use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use takt::scheduling::PlanAssembler;
use takt::server::{AppState, router};
use takt::storage::{Database, ProjectSnapshot};
use takt::test_utils::fixtures::sample_snapshot;

fn app() -> Router {
    let db = Database::open_in_memory().unwrap();
    db.import_snapshot(&sample_snapshot()).unwrap();
    router(AppState::new(db, PlanAssembler::default()))
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    println!("[HTTP] {uri} -> {status}: {body}");
    (status, body)
}

#[tokio::test]
async fn health_reports_service() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "takt");
    assert_eq!(body["version"], takt::VERSION);
}

#[tokio::test]
async fn generate_returns_created_plan() {
    let app = app();
    let (status, plan) = send(&app, Method::POST, "/projects/tower-a/plan/generate").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(plan["projectId"], "tower-a");
    assert_eq!(plan["version"], 1);
    assert_eq!(plan["status"], "draft");
    assert_eq!(plan["totalPeriods"], 4);
    assert_eq!(plan["startDate"], "2024-01-01");
    assert_eq!(plan["zones"].as_array().unwrap().len(), 3);
    assert_eq!(plan["warnings"]["totalIssues"], 0);
    assert!(plan["warnings"]["stackingConflicts"].is_array());
    assert!(plan["warnings"]["predecessorViolations"].is_array());
    assert!(plan["warnings"]["bufferWarnings"].is_array());
}

#[tokio::test]
async fn plan_read_endpoints() {
    let app = app();
    let (_, plan) = send(&app, Method::POST, "/projects/tower-a/plan/generate").await;
    let plan_id = plan["id"].as_str().unwrap().to_string();

    let (status, fetched) = send(&app, Method::GET, &format!("/plans/{plan_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, plan);

    let (status, list) = send(&app, Method::GET, "/projects/tower-a/plans").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], plan_id.as_str());

    let (status, summary) = send(&app, Method::GET, &format!("/plans/{plan_id}/summary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalDays"], 20);
    assert_eq!(summary["overallProgressPct"], json!(0.0));

    let (status, flowline) = send(&app, Method::GET, &format!("/plans/{plan_id}/flowline")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flowline["taktTime"], 5);
    assert_eq!(flowline["groups"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn activation_and_transition_errors() {
    let app = app();
    let (_, first) = send(&app, Method::POST, "/projects/tower-a/plan/generate").await;
    let (_, second) = send(&app, Method::POST, "/projects/tower-a/plan/generate").await;
    let first_id = first["id"].as_str().unwrap();
    let second_id = second["id"].as_str().unwrap();
    assert_eq!(second["version"], 2);

    let (status, header) = send(&app, Method::POST, &format!("/plans/{first_id}/activate")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(header["status"], "active");

    send(&app, Method::POST, &format!("/plans/{second_id}/activate")).await;
    let (_, old) = send(&app, Method::GET, &format!("/plans/{first_id}")).await;
    assert_eq!(old["status"], "superseded");

    let (status, body) = send(&app, Method::POST, &format!("/plans/{first_id}/activate")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_STATUS_TRANSITION");
}

#[tokio::test]
async fn errors_use_code_status_and_shape() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/projects/ghost/plan/generate").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error = &body["error"];
    assert_eq!(error["code"], "NOT_FOUND");
    assert_eq!(error["numericCode"], 101);
    assert_eq!(error["httpStatus"], 404);
    assert_eq!(error["category"], "precondition");
    assert!(error["message"].as_str().unwrap().contains("ghost"));
    assert!(!error["suggestion"].as_str().unwrap().is_empty());

    let (status, body) = send(&app, Method::GET, "/plans/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "PLAN_NOT_FOUND");
}

#[tokio::test]
async fn no_zones_is_bad_request() {
    let db = Database::open_in_memory().unwrap();
    let snapshot = ProjectSnapshot::from_json(
        &json!({
            "project": { "id": "empty", "name": "Empty" },
            "locations": [{ "id": "site", "name": "Site", "locationType": "site" }],
            "trades": [{ "id": "t", "code": "STR", "name": "Structure" }]
        })
        .to_string(),
    )
    .unwrap();
    db.import_snapshot(&snapshot).unwrap();
    let app = router(AppState::new(db, PlanAssembler::default()));

    let (status, body) = send(&app, Method::POST, "/projects/empty/plan/generate").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "NO_ZONES");

    let (_, list) = send(&app, Method::GET, "/projects/empty/plans").await;
    assert_eq!(list, json!([]));
}

fn app_with(snapshot: &ProjectSnapshot) -> Router {
    let db = Database::open_in_memory().unwrap();
    db.import_snapshot(snapshot).unwrap();
    router(AppState::new(db, PlanAssembler::default()))
}

#[tokio::test]
async fn oversized_settings_are_rejected_without_crashing() {
    let mut slow = sample_snapshot();
    slow.project.default_takt_time = Some(1_000_000_000);
    let app = app_with(&slow);
    let (status, body) = send(&app, Method::POST, "/projects/tower-a/plan/generate").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_TAKT_TIME");

    let mut wide = sample_snapshot();
    let structure = wide.trades.iter_mut().find(|t| t.code == "STR").unwrap();
    structure.buffer_after = Some(i64::MAX / 2);
    let app = app_with(&wide);
    let (status, body) = send(&app, Method::POST, "/projects/tower-a/plan/generate").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "CONFIG_INVALID");

    let (status, _) = send(&app, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = send(&app, Method::GET, "/projects/tower-a/plans").await;
    assert_eq!(list, json!([]));
}
