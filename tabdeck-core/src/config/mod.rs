//! Configuration management for `TabDeck`
//!
//! This module provides the `ConfigManager` for loading and saving
//! settings files in TOML format.

mod manager;
pub mod settings;

pub use manager::{ConfigManager, SETTINGS_FILE_NAME, default_config_dir};
pub use settings::{AppSettings, LoggingSettings, SplitSettings, SurfaceSettings};
