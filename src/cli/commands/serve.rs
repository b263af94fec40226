//! takt serve - Run the HTTP API

use clap::Args;

use crate::app::AppContext;
use crate::error::{Result, TaktError};
use crate::server::{self, AppState};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (default: server.bind from config)
    #[arg(long)]
    pub bind: Option<String>,

    /// Worker threads for the runtime (default: one per core)
    #[arg(long)]
    pub workers: Option<usize>,
}

pub fn run(ctx: &AppContext, args: &ServeArgs) -> Result<()> {
    let bind = args
        .bind
        .clone()
        .unwrap_or_else(|| ctx.config.server.bind.clone());
    let state = AppState::new(ctx.open_db()?, ctx.assembler());

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(workers) = args.workers {
        if workers == 0 {
            return Err(TaktError::InvalidInput("--workers must be at least 1".to_string()));
        }
        builder.worker_threads(workers);
    }
    let runtime = builder.build()?;

    if !ctx.robot_mode {
        eprintln!("takt API on http://{bind}");
    }
    runtime.block_on(server::serve(state, &bind))
}
