//! Error handling for takt.
//!
//! This module provides:
//! - [`TaktError`]: The main error enum for all takt operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestions and context
//! - Suggestion helpers for context-aware error recovery hints

mod codes;
mod suggestions;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;
pub use suggestions::suggest_for_error;

/// Main error type for takt operations.
#[derive(Error, Debug)]
pub enum TaktError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Project {project_id} has no schedulable locations (sector, grid, floor or zone)")]
    NoZones { project_id: String },

    #[error("Project {project_id} has no active trades")]
    NoTrades { project_id: String },

    #[error("No phase group of project {project_id} has both zones and trades")]
    NoMatches { project_id: String },

    #[error("Takt plan not found: {0}")]
    PlanNotFound(String),

    #[error("Cannot move plan {plan_id} from {from} to {to}")]
    InvalidStatusTransition {
        plan_id: String,
        from: String,
        to: String,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Takt time must be between 1 and 65535 working days, got {0}")]
    InvalidTaktTime(i64),

    #[error("Working-day set is empty")]
    EmptyWorkWeek,

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaktError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::Serialization(_) => ErrorCode::SerializationError,
            Self::ProjectNotFound(_) => ErrorCode::NotFound,
            Self::NoZones { .. } => ErrorCode::NoZones,
            Self::NoTrades { .. } => ErrorCode::NoTrades,
            Self::NoMatches { .. } => ErrorCode::NoMatches,
            Self::PlanNotFound(_) => ErrorCode::PlanNotFound,
            Self::InvalidStatusTransition { .. } => ErrorCode::InvalidStatusTransition,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::InvalidTaktTime(_) => ErrorCode::InvalidTaktTime,
            Self::EmptyWorkWeek => ErrorCode::EmptyWorkWeek,
            Self::ConfigNotFound(_) => ErrorCode::ConfigNotFound,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::TransactionFailed(_) => ErrorCode::TransactionFailed,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::ProjectNotFound(id) => Some(serde_json::json!({ "project_id": id })),
            Self::NoZones { project_id }
            | Self::NoTrades { project_id }
            | Self::NoMatches { project_id } => {
                Some(serde_json::json!({ "project_id": project_id }))
            }
            Self::PlanNotFound(id) => Some(serde_json::json!({ "plan_id": id })),
            Self::InvalidStatusTransition { plan_id, from, to } => {
                Some(serde_json::json!({ "plan_id": plan_id, "from": from, "to": to }))
            }
            Self::InvalidTaktTime(value) => Some(serde_json::json!({ "takt_time": value })),
            Self::ConfigNotFound(path) => Some(serde_json::json!({ "path": path })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_takt_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
///
/// Used for robot mode output and as the body of HTTP error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "NO_ZONES")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 102)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// HTTP status the API server answers with
    pub http_status: u16,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "precondition", "config", "storage")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            http_status: code.http_status(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from a TaktError.
    #[must_use]
    pub fn from_takt_error(err: &TaktError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            http_status: code.http_status(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }

    /// Add context to this error.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        // Regenerate suggestion with new context
        self.suggestion = suggest_for_error(self.code, self.context.as_ref());
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<TaktError> for StructuredError {
    fn from(err: TaktError) -> Self {
        Self::from_takt_error(&err)
    }
}

impl From<&TaktError> for StructuredError {
    fn from(err: &TaktError) -> Self {
        Self::from_takt_error(err)
    }
}

/// Result type alias using TaktError.
pub type Result<T> = std::result::Result<T, TaktError>;
