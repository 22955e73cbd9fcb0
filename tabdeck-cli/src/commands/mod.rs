//! Command handler modules for the CLI.

mod completions;
mod config;
mod simulate;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(config_path: Option<&Path>, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Config(subcmd) => config::cmd_config(config_path, subcmd),
        Commands::Simulate { script, format } => {
            simulate::cmd_simulate(config_path, &script, format)
        }
        Commands::Completions { shell } => completions::cmd_completions(shell),
    }
}
