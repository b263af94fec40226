//! takt config - Print the effective configuration

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::emit_robot;
use crate::config::Config;
use crate::error::{Result, TaktError};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print a single key (e.g. scheduler.default_takt_time)
    pub key: Option<String>,
}

#[derive(Serialize)]
struct EffectiveConfig<'a> {
    root: String,
    db_path: String,
    config: &'a Config,
}

pub fn run(ctx: &AppContext, args: &ConfigArgs) -> Result<()> {
    if let Some(key) = &args.key {
        let value = config_value_at(&ctx.config, key)?;
        if ctx.robot_mode {
            return emit_robot(&value);
        }
        println!("{}", format_value(&value));
        return Ok(());
    }

    if ctx.robot_mode {
        return emit_robot(&EffectiveConfig {
            root: ctx.root().display().to_string(),
            db_path: ctx.db_path.display().to_string(),
            config: &ctx.config,
        });
    }

    let rendered = toml::to_string_pretty(&ctx.config)
        .map_err(|err| TaktError::Serialization(format!("render config: {err}")))?;
    println!("# root: {}", ctx.root().display());
    println!("# database: {}", ctx.db_path.display());
    println!("{rendered}");
    Ok(())
}

fn config_value_at(config: &Config, key: &str) -> Result<toml::Value> {
    let doc = toml::Value::try_from(config)
        .map_err(|err| TaktError::Serialization(format!("serialize config: {err}")))?;
    let mut current = &doc;
    for part in key.split('.') {
        current = current
            .get(part)
            .ok_or_else(|| TaktError::InvalidInput(format!("unknown config key: {key}")))?;
    }
    Ok(current.clone())
}

fn format_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}
