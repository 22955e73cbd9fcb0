//! Application settings
//!
//! Every section and field falls back to its default when absent, so a
//! settings file only needs to name what it changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::eviction::{DEFAULT_UNLOAD_TIMEOUT_SECS, MIN_UNLOAD_TIMEOUT};
use crate::split::{DEFAULT_MAX_FRACTION, DEFAULT_MIN_FRACTION, FractionBounds};
use crate::tracing::{TracingConfig, TracingLevel};

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    /// Surface lifecycle settings
    pub surfaces: SurfaceSettings,
    /// Split view settings
    pub split: SplitSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Surface lifecycle settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceSettings {
    /// Seconds of inactivity before a hidden tab's surface is released
    pub unload_timeout_secs: u64,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            unload_timeout_secs: DEFAULT_UNLOAD_TIMEOUT_SECS,
        }
    }
}

/// Split view settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitSettings {
    /// Lower divider bound
    pub min_fraction: f64,
    /// Upper divider bound
    pub max_fraction: f64,
    /// Divider animation length in milliseconds (0 disables it)
    pub animation_ms: u64,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            min_fraction: DEFAULT_MIN_FRACTION,
            max_fraction: DEFAULT_MAX_FRACTION,
            animation_ms: 250,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level name (error, warn, info, debug, trace)
    pub level: String,
    /// Custom `EnvFilter` directive, overrides `level`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: TracingLevel::default().to_string(),
            filter: None,
        }
    }
}

impl AppSettings {
    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        if Duration::from_secs(self.surfaces.unload_timeout_secs) < MIN_UNLOAD_TIMEOUT {
            return Err(ConfigError::Validation {
                field: "surfaces.unload_timeout_secs".to_string(),
                reason: format!("must be at least {}", MIN_UNLOAD_TIMEOUT.as_secs()),
            });
        }
        self.fraction_bounds()?;
        self.tracing_level()?;
        Ok(())
    }

    /// Idle timeout for hidden surfaces.
    #[must_use]
    pub fn unload_timeout(&self) -> Duration {
        Duration::from_secs(self.surfaces.unload_timeout_secs)
    }

    /// Divider bounds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` unless `0.0 <= min < max <= 1.0`.
    pub fn fraction_bounds(&self) -> ConfigResult<FractionBounds> {
        FractionBounds::new(self.split.min_fraction, self.split.max_fraction).map_err(|e| {
            ConfigError::Validation {
                field: "split.min_fraction".to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Divider animation length.
    #[must_use]
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.split.animation_ms)
    }

    /// Parsed log level.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for an unknown level name.
    pub fn tracing_level(&self) -> ConfigResult<TracingLevel> {
        self.logging
            .level
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "logging.level".to_string(),
                reason: format!("unknown level '{}'", self.logging.level),
            })
    }

    /// Tracing configuration derived from the logging section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for an unknown level name.
    pub fn tracing_config(&self) -> ConfigResult<TracingConfig> {
        let mut config = TracingConfig::new().with_level(self.tracing_level()?);
        if let Some(filter) = &self.logging.filter {
            config = config.with_filter(filter.clone());
        }
        Ok(config)
    }
}
