//! HTTP API over the plan store.
//!
//! Handlers move all database work onto the blocking pool; the connection
//! is shared behind a mutex.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::{ErrorCode, Result, StructuredError, TaktError};
use crate::scheduling::{
    Flowline, PlanAssembler, PlanHeader, PlanStore, PlanSummary, TaktPlan, plan_flowline,
    plan_summary,
};
use crate::storage::Database;

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Database>>,
    assembler: Arc<PlanAssembler>,
}

impl AppState {
    #[must_use]
    pub fn new(db: Database, assembler: PlanAssembler) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            assembler: Arc::new(assembler),
        }
    }

    /// Run `f` against the database on the blocking pool.
    async fn with_db<T, F>(&self, f: F) -> std::result::Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Database, &PlanAssembler) -> Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let assembler = Arc::clone(&self.assembler);
        tokio::task::spawn_blocking(move || {
            let guard = db.lock();
            f(&guard, &assembler)
        })
        .await
        .map_err(|err| ApiError(TaktError::Internal(format!("blocking task failed: {err}"))))?
        .map_err(ApiError)
    }
}

/// A [`TaktError`] rendered as `{"error": {...}}` with the code's status.
#[derive(Debug)]
pub struct ApiError(pub TaktError);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    code: ErrorCode,
    numeric_code: u16,
    message: String,
    http_status: u16,
    suggestion: String,
    category: String,
}

impl From<StructuredError> for ErrorBody {
    fn from(err: StructuredError) -> Self {
        Self {
            code: err.code,
            numeric_code: err.numeric_code,
            message: err.message,
            http_status: err.http_status,
            suggestion: err.suggestion,
            category: err.category,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let structured = self.0.to_structured();
        let status = StatusCode::from_u16(structured.http_status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(code = %structured.code, error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": ErrorBody::from(structured) }))).into_response()
    }
}

impl From<TaktError> for ApiError {
    fn from(err: TaktError) -> Self {
        Self(err)
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/projects/{project_id}/plan/generate", post(generate_plan))
        .route("/projects/{project_id}/plans", get(list_plans))
        .route("/plans/{plan_id}", get(get_plan))
        .route("/plans/{plan_id}/activate", post(activate_plan))
        .route("/plans/{plan_id}/summary", get(plan_summary_handler))
        .route("/plans/{plan_id}/flowline", get(plan_flowline_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .map_err(|err| TaktError::Config(format!("invalid bind address {bind}: {err}")))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "takt API listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("takt API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for ctrl-c");
    }
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "takt",
        "version": crate::VERSION,
    }))
}

/// POST /projects/{project_id}/plan/generate
async fn generate_plan(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<(StatusCode, Json<TaktPlan>)> {
    let today = Local::now().date_naive();
    let plan = state
        .with_db(move |db, assembler| assembler.generate(db, &project_id, today))
        .await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// GET /projects/{project_id}/plans
async fn list_plans(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<PlanHeader>>> {
    let plans = state
        .with_db(move |db, _| db.list_plans(&project_id))
        .await?;
    Ok(Json(plans))
}

/// GET /plans/{plan_id}
async fn get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> ApiResult<Json<TaktPlan>> {
    let plan = state.with_db(move |db, _| require_plan(db, &plan_id)).await?;
    Ok(Json(plan))
}

/// POST /plans/{plan_id}/activate
async fn activate_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> ApiResult<Json<PlanHeader>> {
    let header = state
        .with_db(move |db, _| db.activate_plan(&plan_id))
        .await?;
    Ok(Json(header))
}

/// GET /plans/{plan_id}/summary
async fn plan_summary_handler(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> ApiResult<Json<PlanSummary>> {
    let plan = state.with_db(move |db, _| require_plan(db, &plan_id)).await?;
    Ok(Json(plan_summary(&plan)))
}

/// GET /plans/{plan_id}/flowline
async fn plan_flowline_handler(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> ApiResult<Json<Flowline>> {
    let plan = state.with_db(move |db, _| require_plan(db, &plan_id)).await?;
    Ok(Json(plan_flowline(&plan, Local::now().date_naive())))
}

fn require_plan(db: &Database, plan_id: &str) -> Result<TaktPlan> {
    db.get_plan(plan_id)?
        .ok_or_else(|| TaktError::PlanNotFound(plan_id.to_string()))
}
