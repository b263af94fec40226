use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::scheduling::PlanAssembler;
use crate::storage::Database;

/// Everything a command needs: effective config, resolved paths and
/// output settings.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub takt_root: PathBuf,
    pub config: Config,
    pub db_path: PathBuf,
    pub robot_mode: bool,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let takt_root = resolve_root()?;
        let config = Config::load(cli.config.as_deref(), &takt_root)?;
        let db_path = cli
            .db
            .clone()
            .unwrap_or_else(|| config.db_path(&takt_root));
        let output_format = cli.output_format();

        Ok(Self {
            takt_root,
            config,
            db_path,
            robot_mode: output_format.is_machine_readable(),
            output_format,
            verbosity: cli.verbose,
        })
    }

    pub fn open_db(&self) -> Result<Database> {
        Database::open(&self.db_path)
    }

    #[must_use]
    pub fn assembler(&self) -> PlanAssembler {
        PlanAssembler::new(self.config.scheduler_defaults())
    }

    /// Local calendar date, used as the start fallback and the flowline
    /// "today" marker.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.takt_root
    }
}

/// `TAKT_ROOT` when set, else `.takt` under the working directory.
fn resolve_root() -> Result<PathBuf> {
    if let Some(root) = std::env::var_os("TAKT_ROOT").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(root));
    }
    Ok(std::env::current_dir()?.join(".takt"))
}
