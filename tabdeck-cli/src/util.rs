//! Shared utility functions used across command modules.

use std::path::Path;

use tabdeck_core::config::{AppSettings, ConfigManager};

use crate::error::CliError;

/// Creates a `ConfigManager` for the settings file given on the command
/// line, or the default location.
pub fn create_config_manager(config_path: Option<&Path>) -> ConfigManager {
    match config_path {
        Some(path) => ConfigManager::new(path),
        None => ConfigManager::with_default_path(),
    }
}

/// Loads the effective settings (defaults when no file exists).
pub fn load_settings(config_path: Option<&Path>) -> Result<AppSettings, CliError> {
    create_config_manager(config_path)
        .load()
        .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))
}
