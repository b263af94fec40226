//! Project snapshot import format.
//!
//! A snapshot is the JSON document `takt import` loads: one project with its
//! locations and trades. Child records may omit `projectId`; it is filled in
//! from the enclosing project.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TaktError};
use crate::scheduling::model::{Location, PhaseHint, Project, Trade};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotLocation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub location_type: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    /// Free-form metadata; only `phase` is read.
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub project: Project,
    #[serde(default)]
    pub locations: Vec<SnapshotLocation>,
    #[serde(default)]
    pub trades: Vec<Trade>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub project_id: String,
    pub locations: usize,
    pub trades: usize,
}

impl ProjectSnapshot {
    /// Read and check a snapshot file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(raw)
            .map_err(|err| TaktError::InvalidInput(format!("snapshot is not valid: {err}")))?;
        snapshot.check()?;
        Ok(snapshot)
    }

    fn check(&self) -> Result<()> {
        if self.project.id.trim().is_empty() {
            return Err(TaktError::InvalidInput("project id is empty".to_string()));
        }
        let foreign = self
            .trades
            .iter()
            .find(|t| !t.project_id.is_empty() && t.project_id != self.project.id);
        if let Some(trade) = foreign {
            return Err(TaktError::InvalidInput(format!(
                "trade {} belongs to project {}, not {}",
                trade.id, trade.project_id, self.project.id
            )));
        }
        Ok(())
    }

    /// Locations with project id and typed phase hint filled in.
    #[must_use]
    pub fn locations(&self) -> Vec<Location> {
        self.locations
            .iter()
            .map(|loc| Location {
                id: loc.id.clone(),
                project_id: self.project.id.clone(),
                name: loc.name.clone(),
                code: loc.code.clone(),
                location_type: loc.location_type.trim().to_ascii_lowercase(),
                parent_id: loc.parent_id.clone(),
                sort_order: loc.sort_order,
                phase_hint: PhaseHint::from_metadata(loc.metadata.as_ref()),
            })
            .collect()
    }

    /// Trades with project id filled in.
    #[must_use]
    pub fn trades(&self) -> Vec<Trade> {
        self.trades
            .iter()
            .map(|trade| Trade {
                project_id: self.project.id.clone(),
                ..trade.clone()
            })
            .collect()
    }
}
