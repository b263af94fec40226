pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod scheduling;
pub mod server;
pub mod storage;
pub mod test_utils;

pub use error::{Result, TaktError};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
