//! CLI error types and exit codes.

use tabdeck_core::error::ConfigError;

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, I/O or other non-script errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Script error - the scenario file is malformed or names unknown tabs
    pub const SCRIPT_ERROR: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Scenario file could not be parsed
    #[error("Script error: {0}")]
    Script(String),

    /// A script step names a tab that was never declared
    #[error("Unknown tab in script: {0}")]
    UnknownTab(String),

    /// Output could not be rendered
    #[error("Output error: {0}")]
    Output(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, output, IO)
    /// - 2: Script error (parse failure, unknown tab)
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Script(_) | Self::UnknownTab(_) => exit_codes::SCRIPT_ERROR,
            Self::Config(_) | Self::Output(_) | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
