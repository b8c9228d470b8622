//! Command line interface for the bundler.
//!
//! Parses arguments, loads `pyproject.toml` and dispatches to the command
//! implementations. Artifact paths go to stdout, progress goes to the log.

mod args;
pub mod commands;

pub use args::{Args, BuildArgs, Command, DispatcherArgs};

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    match &args.command {
        Command::Build(build) => commands::execute_build(build).await,
        Command::Dispatcher(dispatcher) => commands::execute_dispatcher(dispatcher).await,
    }
}
