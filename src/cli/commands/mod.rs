//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::{Result, TaktError};
use crate::scheduling::{PlanStore, TaktPlan};
use crate::storage::Database;

pub mod activate;
pub mod config;
pub mod flowline;
pub mod generate;
pub mod import;
pub mod list;
pub mod serve;
pub mod show;
pub mod summary;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Import(args) => import::run(ctx, args),
        Commands::Generate(args) => generate::run(ctx, args),
        Commands::List(args) => list::run(ctx, args),
        Commands::Show(args) => show::run(ctx, args),
        Commands::Activate(args) => activate::run(ctx, args),
        Commands::Summary(args) => summary::run(ctx, args),
        Commands::Flowline(args) => flowline::run(ctx, args),
        Commands::Serve(args) => serve::run(ctx, args),
        Commands::Config(args) => config::run(ctx, args),
    }
}

/// Load a stored plan or fail with `PLAN_NOT_FOUND`.
pub(crate) fn load_plan(db: &Database, plan_id: &str) -> Result<TaktPlan> {
    db.get_plan(plan_id)?
        .ok_or_else(|| TaktError::PlanNotFound(plan_id.to_string()))
}
