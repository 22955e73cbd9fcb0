//! Structured logging setup
//!
//! Library code only emits `tracing` events and spans with structured
//! fields (`tab_id`, `reason`, `side`, ...). A binary installs the
//! subscriber exactly once with [`init_tracing`].

use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum TracingError {
    /// A subscriber was already installed by this process
    #[error("Tracing has already been initialized")]
    AlreadyInitialized,

    /// Level name not recognised
    #[error("Unknown log level '{0}'")]
    UnknownLevel(String),

    /// The custom filter directive does not parse
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    /// The log file could not be opened
    #[error("Cannot open log file {path}: {source}")]
    LogFile {
        /// Requested path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The global default subscriber could not be set
    #[error("Failed to install subscriber: {0}")]
    Install(String),
}

/// Result type for tracing setup
pub type TracingResult<T> = Result<T, TracingError>;

/// Verbosity of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Warnings, e.g. stale split panes being healed
    Warn,
    /// Evictions, split transitions, settings I/O
    #[default]
    Info,
    /// Reconciliation passes and eviction deferrals
    Debug,
    /// Every timer (re)schedule and surface creation
    Trace,
}

impl TracingLevel {
    /// Lowercase name as used in filter directives and settings files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Level for a repeated `-v` flag: none is warn, then info, debug, trace.
    #[must_use]
    pub const fn from_verbosity(count: u8) -> Self {
        match count {
            0 => Self::Warn,
            1 => Self::Info,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }
}

impl From<TracingLevel> for Level {
    fn from(level: TracingLevel) -> Self {
        match level {
            TracingLevel::Error => Self::ERROR,
            TracingLevel::Warn => Self::WARN,
            TracingLevel::Info => Self::INFO,
            TracingLevel::Debug => Self::DEBUG,
            TracingLevel::Trace => Self::TRACE,
        }
    }
}

impl FromStr for TracingLevel {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.trim().to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "info" => Self::Info,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => return Err(TracingError::UnknownLevel(s.to_string())),
        };
        Ok(level)
    }
}

impl fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where formatted events are written
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Standard output
    Stdout,
    /// Standard error, keeping stdout free for command output
    #[default]
    Stderr,
    /// A file, truncated when the subscriber is installed
    File(PathBuf),
}

impl TracingOutput {
    /// Builds the writer and whether ANSI colours make sense for it.
    fn make_writer(&self) -> TracingResult<(BoxMakeWriter, bool)> {
        match self {
            Self::Stdout => Ok((BoxMakeWriter::new(std::io::stdout), true)),
            Self::Stderr => Ok((BoxMakeWriter::new(std::io::stderr), true)),
            Self::File(path) => {
                let file = File::create(path).map_err(|source| TracingError::LogFile {
                    path: path.clone(),
                    source,
                })?;
                Ok((BoxMakeWriter::new(Mutex::new(file)), false))
            }
        }
    }
}

/// Subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TracingConfig {
    /// Level applied to the `TabDeck` crates when no filter is given
    pub level: TracingLevel,
    /// Destination
    pub output: TracingOutput,
    /// Include thread ids in each line
    pub thread_ids: bool,
    /// Full `EnvFilter` directive, replacing the level
    pub filter: Option<String>,
}

impl TracingConfig {
    /// Info level on stderr.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level.
    #[must_use]
    pub const fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the destination.
    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Toggles thread ids.
    #[must_use]
    pub const fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.thread_ids = enabled;
        self
    }

    /// Uses a custom filter directive.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Directive used when no custom filter is set: the level for the core
    /// library and the `tabdeck` binary, everything else off.
    #[must_use]
    pub fn default_directive(&self) -> String {
        let level = self.level.as_str();
        format!("tabdeck_core={level},tabdeck={level}")
    }

    /// Builds the event filter.
    ///
    /// # Errors
    ///
    /// Returns `TracingError::InvalidFilter` if the directive does not parse.
    pub fn env_filter(&self) -> TracingResult<EnvFilter> {
        let directive = self
            .filter
            .clone()
            .unwrap_or_else(|| self.default_directive());
        EnvFilter::try_new(&directive).map_err(|e| TracingError::InvalidFilter(e.to_string()))
    }
}

/// Installs the global subscriber.
///
/// Only the first successful call installs anything.
///
/// # Errors
///
/// Returns `AlreadyInitialized` on a second call, `InvalidFilter` or
/// `LogFile` for a bad configuration, and `Install` if another subscriber
/// was set outside this function.
pub fn init_tracing(config: &TracingConfig) -> TracingResult<()> {
    if INSTALLED.get().is_some() {
        return Err(TracingError::AlreadyInitialized);
    }

    let filter = config.env_filter()?;
    let (writer, ansi) = config.output.make_writer()?;

    let format = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_thread_ids(config.thread_ids);

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init()
        .map_err(|e| TracingError::Install(e.to_string()))?;

    INSTALLED
        .set(())
        .map_err(|()| TracingError::AlreadyInitialized)?;
    tracing::debug!(level = %config.level, output = ?config.output, "Tracing installed");
    Ok(())
}

/// Span names used across the crates
pub mod span_names {
    /// One compositor reconciliation pass
    pub const RECONCILE: &str = "compositor.reconcile";
    /// Firing due eviction timeouts
    pub const EVICTION_TICK: &str = "eviction.tick";
    /// One step of a scripted scenario
    pub const SIMULATE_STEP: &str = "simulate.step";
    /// Reading the settings file
    pub const CONFIG_LOAD: &str = "config.load";
    /// Writing the settings file
    pub const CONFIG_SAVE: &str = "config.save";
}

/// Field names recorded on spans after they are entered
pub mod field_names {
    /// Number of surfaces shown by a reconciliation pass
    pub const SHOWN: &str = "shown";
    /// Number of tabs released by an eviction tick
    pub const EVICTED: &str = "evicted";
}
