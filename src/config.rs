use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaktError};
use crate::scheduling::assembler::{check_buffer, check_takt_time};
use crate::scheduling::{SchedulerDefaults, WorkWeek};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Layer defaults, the global file, the project file (or an explicit
    /// path) and `TAKT_*` environment overrides, then validate.
    pub fn load(explicit_path: Option<&Path>, takt_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("TAKT_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                TaktError::ConfigNotFound(path.display().to_string())
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(takt_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match dirs::config_dir() {
            Some(dir) => Self::load_patch(&dir.join("takt/config.toml")),
            None => Ok(None),
        }
    }

    fn load_project(takt_root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&takt_root.join("config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| TaktError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| TaktError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.scheduler {
            self.scheduler.merge(patch);
        }
        if let Some(patch) = patch.storage {
            self.storage.merge(patch);
        }
        if let Some(patch) = patch.server {
            self.server.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_i64("TAKT_DEFAULT_TAKT_TIME")? {
            self.scheduler.default_takt_time = value;
        }
        if let Some(value) = env_i64("TAKT_BUFFER_SIZE")? {
            self.scheduler.buffer_size = value;
        }
        if let Some(values) = env_list("TAKT_WORKING_DAYS") {
            self.scheduler.working_days = values;
        }
        if let Some(value) = env_string("TAKT_DB_PATH") {
            self.storage.db_path = Some(PathBuf::from(value));
        }
        if let Some(value) = env_string("TAKT_BIND") {
            self.server.bind = value;
        }
        Ok(())
    }

    /// Reject values the scheduler could never run with.
    pub fn validate(&self) -> Result<()> {
        check_takt_time(self.scheduler.default_takt_time)?;
        check_buffer("scheduler.buffer_size", self.scheduler.buffer_size)?;
        WorkWeek::from_names(self.scheduler.working_days.as_slice())?;
        if self.server.bind.trim().is_empty() {
            return Err(TaktError::Config("server.bind must not be empty".to_string()));
        }
        Ok(())
    }

    /// Database location: the configured path, else `<root>/takt.db`.
    #[must_use]
    pub fn db_path(&self, takt_root: &Path) -> PathBuf {
        self.storage
            .db_path
            .clone()
            .unwrap_or_else(|| takt_root.join("takt.db"))
    }

    #[must_use]
    pub fn scheduler_defaults(&self) -> SchedulerDefaults {
        SchedulerDefaults {
            takt_time: self.scheduler.default_takt_time,
            buffer_size: self.scheduler.buffer_size,
            working_days: self.scheduler.working_days.clone(),
        }
    }
}

/// Fallbacks for projects that leave scheduling settings unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_takt_time")]
    pub default_takt_time: i64,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: i64,
    #[serde(default = "default_working_days")]
    pub working_days: Vec<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let defaults = SchedulerDefaults::default();
        Self {
            default_takt_time: defaults.takt_time,
            buffer_size: defaults.buffer_size,
            working_days: defaults.working_days,
        }
    }
}

impl SchedulerConfig {
    fn merge(&mut self, patch: SchedulerPatch) {
        if let Some(value) = patch.default_takt_time {
            self.default_takt_time = value;
        }
        if let Some(value) = patch.buffer_size {
            self.buffer_size = value;
        }
        if let Some(values) = patch.working_days {
            self.working_days = values;
        }
    }
}

fn default_takt_time() -> i64 {
    SchedulerDefaults::default().takt_time
}

fn default_buffer_size() -> i64 {
    SchedulerDefaults::default().buffer_size
}

fn default_working_days() -> Vec<String> {
    SchedulerDefaults::default().working_days
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

impl StorageConfig {
    fn merge(&mut self, patch: StoragePatch) {
        if let Some(value) = patch.db_path {
            self.db_path = Some(value);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl ServerConfig {
    fn merge(&mut self, patch: ServerPatch) {
        if let Some(value) = patch.bind {
            self.bind = value;
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub scheduler: Option<SchedulerPatch>,
    pub storage: Option<StoragePatch>,
    pub server: Option<ServerPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SchedulerPatch {
    pub default_takt_time: Option<i64>,
    pub buffer_size: Option<i64>,
    pub working_days: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StoragePatch {
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ServerPatch {
    pub bind: Option<String>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_i64(key: &str) -> Result<Option<i64>> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|err| TaktError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}

fn env_list(key: &str) -> Option<Vec<String>> {
    std::env::var(key).ok().map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}
