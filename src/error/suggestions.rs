//! Context-aware error suggestions.
//!
//! Complements the static suggestions in the `codes` module with hints that
//! mention the offending project, plan or value.

use serde_json::Value;

use super::codes::ErrorCode;

/// Generate a context-aware suggestion for an error.
///
/// Falls back to [`ErrorCode::suggestion`] when the context carries nothing
/// useful for the given code.
#[must_use]
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    match code {
        ErrorCode::NotFound => suggest_project_not_found(context),
        ErrorCode::NoZones | ErrorCode::NoTrades | ErrorCode::NoMatches => {
            suggest_incomplete_project(code, context)
        }
        ErrorCode::PlanNotFound => suggest_plan_not_found(context),
        ErrorCode::InvalidStatusTransition => suggest_status_transition(context),
        ErrorCode::InvalidTaktTime => suggest_takt_time(context),
        ErrorCode::ConfigNotFound => suggest_config_not_found(context),
        _ => code.suggestion().to_string(),
    }
}

fn context_str<'a>(context: Option<&'a Value>, key: &str) -> Option<&'a str> {
    context.and_then(|c| c.get(key)).and_then(Value::as_str)
}

fn suggest_project_not_found(context: Option<&Value>) -> String {
    match context_str(context, "project_id") {
        Some(id) => format!(
            "Project '{id}' not found. Import its snapshot with `takt import <snapshot.json>` first"
        ),
        None => ErrorCode::NotFound.suggestion().to_string(),
    }
}

fn suggest_incomplete_project(code: ErrorCode, context: Option<&Value>) -> String {
    let Some(id) = context_str(context, "project_id") else {
        return code.suggestion().to_string();
    };
    format!("{} (project '{id}')", code.suggestion())
}

fn suggest_plan_not_found(context: Option<&Value>) -> String {
    match context_str(context, "plan_id") {
        Some(id) => format!(
            "Plan '{id}' not found. Run `takt list <project-id>` to see existing plans"
        ),
        None => ErrorCode::PlanNotFound.suggestion().to_string(),
    }
}

fn suggest_status_transition(context: Option<&Value>) -> String {
    match context_str(context, "from") {
        Some("superseded") => {
            "Superseded plans cannot be re-activated. Run `takt generate <project-id>` for a new version"
                .to_string()
        }
        Some("active") => "Plan is already active".to_string(),
        _ => ErrorCode::InvalidStatusTransition.suggestion().to_string(),
    }
}

fn suggest_takt_time(context: Option<&Value>) -> String {
    match context.and_then(|c| c.get("takt_time")).and_then(Value::as_i64) {
        Some(value) => format!(
            "Takt time {value} is not allowed. Use 1 to 65535 working days, e.g. 5"
        ),
        None => ErrorCode::InvalidTaktTime.suggestion().to_string(),
    }
}

fn suggest_config_not_found(context: Option<&Value>) -> String {
    match context_str(context, "path") {
        Some(path) => format!("Config file '{path}' does not exist. Create it or drop --config"),
        None => ErrorCode::ConfigNotFound.suggestion().to_string(),
    }
}
