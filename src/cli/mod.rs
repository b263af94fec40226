//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod output;

/// Takt - generate and validate takt production plans
#[derive(Parser, Debug)]
#[command(name = "takt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit JSON for machine consumption (same as --output-format=json)
    #[arg(long, global = true)]
    pub robot: bool,

    /// Output format (human, json)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/takt/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path (default: <root>/takt.db)
    #[arg(long, global = true, env = "TAKT_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_args(self.robot, self.output_format)
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a project snapshot (project, locations, trades)
    Import(commands::import::ImportArgs),

    /// Generate and store the next takt plan for a project
    Generate(commands::generate::GenerateArgs),

    /// List a project's takt plans
    List(commands::list::ListArgs),

    /// Show a takt plan
    Show(commands::show::ShowArgs),

    /// Make a draft plan the project's active plan
    Activate(commands::activate::ActivateArgs),

    /// Show period, date and progress totals for a plan
    Summary(commands::summary::SummaryArgs),

    /// Show flowline chart data for a plan
    Flowline(commands::flowline::FlowlineArgs),

    /// Run the HTTP API
    Serve(commands::serve::ServeArgs),

    /// Print the effective configuration
    Config(commands::config::ConfigArgs),
}
