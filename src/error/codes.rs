//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Project and plan preconditions
//! - 3xx: Scheduling configuration errors
//! - 4xx: Input errors
//! - 6xx: Storage errors
//! - 9xx: Internal errors
//!
//! Every code also carries the HTTP status returned by the API server, so the
//! `(message, code, httpStatus)` triple is stable across CLI and HTTP surfaces.

use serde::{Deserialize, Serialize};

/// Standardized error codes.
///
/// The serialized form (e.g. `"NO_ZONES"`) is the stable code consumed by
/// clients; the numeric form (e.g. E102) is used in human output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Precondition errors (1xx)
    // ========================================
    /// E101: Project does not exist
    NotFound,
    /// E102: Project has no location of a schedulable type
    NoZones,
    /// E103: Project has no active trade
    NoTrades,
    /// E104: No phase group has both zones and trades
    NoMatches,
    /// E105: Takt plan does not exist
    PlanNotFound,
    /// E106: Requested plan status change is not allowed
    InvalidStatusTransition,

    // ========================================
    // Configuration errors (3xx)
    // ========================================
    /// E301: Configuration has invalid syntax or values
    ConfigInvalid,
    /// E302: Takt time is not positive or exceeds the supported maximum
    InvalidTaktTime,
    /// E303: Working-day set resolved to no days at all
    EmptyWorkWeek,
    /// E304: Config file or directory not found
    ConfigNotFound,

    // ========================================
    // Input errors (4xx)
    // ========================================
    /// E401: Malformed input document or argument
    InvalidInput,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E601: Database operation failed
    DatabaseError,
    /// E602: Transaction was rolled back
    TransactionFailed,
    /// E603: Serialization/deserialization failed
    SerializationError,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: Unexpected internal error
    InternalError,
    /// E902: IO operation failed
    IoError,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `NoZones` -> 102).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::NotFound => 101,
            Self::NoZones => 102,
            Self::NoTrades => 103,
            Self::NoMatches => 104,
            Self::PlanNotFound => 105,
            Self::InvalidStatusTransition => 106,

            Self::ConfigInvalid => 301,
            Self::InvalidTaktTime => 302,
            Self::EmptyWorkWeek => 303,
            Self::ConfigNotFound => 304,

            Self::InvalidInput => 401,

            Self::DatabaseError => 601,
            Self::TransactionFailed => 602,
            Self::SerializationError => 603,

            Self::InternalError => 901,
            Self::IoError => 902,
        }
    }

    /// Get the error code as a formatted string (e.g., "E102").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// HTTP status code reported by the API server for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::NotFound | Self::PlanNotFound => 404,
            Self::NoZones | Self::NoTrades | Self::NoMatches | Self::InvalidInput => 400,
            Self::InvalidStatusTransition => 409,
            Self::ConfigInvalid
            | Self::InvalidTaktTime
            | Self::EmptyWorkWeek
            | Self::ConfigNotFound => 422,
            Self::DatabaseError
            | Self::TransactionFailed
            | Self::SerializationError
            | Self::InternalError
            | Self::IoError => 500,
        }
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::NotFound => "Check the project id. Run `takt import <snapshot.json>` to load a project",
            Self::NoZones => "Add at least one location of type sector, grid, floor or zone to the project",
            Self::NoTrades => "Add at least one active trade to the project",
            Self::NoMatches => "Make sure at least one phase group (substructure, shell, fitout) has both locations and trades",
            Self::PlanNotFound => "Run `takt list <project-id>` to see the plans of a project",
            Self::InvalidStatusTransition => "Only draft plans can be activated. Generate a new plan instead",

            Self::ConfigInvalid => "Run `takt config` to see current values. Check TOML syntax in config file",
            Self::InvalidTaktTime => "Set the project's default takt time to a positive number of days",
            Self::EmptyWorkWeek => "Configure at least one working weekday (e.g. monday..friday)",
            Self::ConfigNotFound => "Create the config file or pass --config <path>",

            Self::InvalidInput => "Check the input document against the expected format",

            Self::DatabaseError => "Check the database path and file permissions",
            Self::TransactionFailed => "The operation was rolled back. Check error details and retry",
            Self::SerializationError => "The stored data may be corrupted. Check input data for validity",

            Self::InternalError => "An unexpected error occurred. Please report this issue with full error output",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::NotFound
            | Self::NoZones
            | Self::NoTrades
            | Self::NoMatches
            | Self::PlanNotFound
            | Self::InvalidStatusTransition
            | Self::ConfigInvalid
            | Self::InvalidTaktTime
            | Self::EmptyWorkWeek
            | Self::ConfigNotFound
            | Self::InvalidInput
            | Self::TransactionFailed
            | Self::IoError => true,

            Self::DatabaseError | Self::SerializationError | Self::InternalError => false,
        }
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "precondition",
            3 => "config",
            4 => "input",
            6 => "storage",
            9 => "internal",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::NotFound,
            Self::NoZones,
            Self::NoTrades,
            Self::NoMatches,
            Self::PlanNotFound,
            Self::InvalidStatusTransition,
            Self::ConfigInvalid,
            Self::InvalidTaktTime,
            Self::EmptyWorkWeek,
            Self::ConfigNotFound,
            Self::InvalidInput,
            Self::DatabaseError,
            Self::TransactionFailed,
            Self::SerializationError,
            Self::InternalError,
            Self::IoError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
