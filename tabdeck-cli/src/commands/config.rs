//! Settings commands.

use std::path::Path;

use tabdeck_core::config::{AppSettings, ConfigManager};

use crate::cli::ConfigCommands;
use crate::error::CliError;
use crate::util::create_config_manager;

/// Config command handler
pub fn cmd_config(config_path: Option<&Path>, subcmd: ConfigCommands) -> Result<(), CliError> {
    let manager = create_config_manager(config_path);
    match subcmd {
        ConfigCommands::Show => {
            print!("{}", show(&manager)?);
            Ok(())
        }
        ConfigCommands::Init { force } => {
            init(&manager, force)?;
            println!("Wrote default settings to {}", manager.path().display());
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", manager.path().display());
            Ok(())
        }
    }
}

/// Effective settings rendered as TOML.
fn show(manager: &ConfigManager) -> Result<String, CliError> {
    let settings = manager.load()?;
    Ok(ConfigManager::to_toml(&settings)?)
}

fn init(manager: &ConfigManager, force: bool) -> Result<(), CliError> {
    if manager.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists (use --force to overwrite)",
            manager.path().display()
        )));
    }
    manager.save(&AppSettings::default())?;
    tracing::info!(path = %manager.path().display(), "Default settings written");
    Ok(())
}
