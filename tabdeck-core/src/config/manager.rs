//! Loading and saving of the settings file

use std::fs;
use std::path::{Path, PathBuf};

use super::settings::AppSettings;
use crate::error::{ConfigError, ConfigResult};
use crate::tracing::span_names;

/// File name of the settings file inside the configuration directory
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// `$XDG_CONFIG_HOME/tabdeck` (or the platform equivalent).
///
/// Falls back to `./tabdeck` when the platform reports no config directory.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tabdeck")
}

/// Reads and writes [`AppSettings`] as TOML.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Manager for the settings file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Manager for `settings.toml` in the default configuration directory.
    #[must_use]
    pub fn with_default_path() -> Self {
        Self::new(default_config_dir().join(SETTINGS_FILE_NAME))
    }

    /// Path of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the settings file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads and validates the settings.
    ///
    /// A missing or empty file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// holds an out-of-range value.
    pub fn load(&self) -> ConfigResult<AppSettings> {
        let _span = tracing::debug_span!(span_names::CONFIG_LOAD, path = %self.path.display())
            .entered();

        if !self.path.exists() {
            tracing::debug!("No settings file, using defaults");
            return Ok(AppSettings::default());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| ConfigError::Read {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        if contents.trim().is_empty() {
            return Ok(AppSettings::default());
        }

        let settings: AppSettings =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        tracing::info!(
            unload_timeout_secs = settings.surfaces.unload_timeout_secs,
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Validates and writes the settings, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the file cannot be written.
    pub fn save(&self, settings: &AppSettings) -> ConfigResult<()> {
        let _span = tracing::debug_span!(span_names::CONFIG_SAVE, path = %self.path.display())
            .entered();

        settings.validate()?;
        let contents = Self::to_toml(settings)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Write(e.to_string()))?;
        }
        fs::write(&self.path, contents).map_err(|e| ConfigError::Write(e.to_string()))?;
        tracing::info!("Settings saved");
        Ok(())
    }

    /// Renders settings as TOML.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Serialize` if serialization fails.
    pub fn to_toml(settings: &AppSettings) -> ConfigResult<String> {
        toml::to_string_pretty(settings).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}
