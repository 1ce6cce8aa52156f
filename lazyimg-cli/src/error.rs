//! CLI error type.

use std::fmt;

use lazyimg::config::ConfigError;
use lazyimg::logging::LoggingError;
use lazyimg::LoadError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration file could not be read or is invalid.
    Config(String),
    /// Logging could not be initialized.
    Logging(String),
    /// Scenario file is missing, malformed, or describes an impossible page.
    Scenario(String),
    /// The async runtime could not be created.
    Runtime(String),
    /// A probe load failed.
    Probe(LoadError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Logging(_) => 78,
            CliError::Scenario(_) => 65,
            CliError::Runtime(_) => 70,
            CliError::Probe(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Logging(msg) => write!(f, "Logging error: {}", msg),
            CliError::Scenario(msg) => write!(f, "Scenario error: {}", msg),
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
            CliError::Probe(err) => write!(f, "Probe failed: {}", err),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Probe(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(err: LoggingError) -> Self {
        CliError::Logging(err.to_string())
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        CliError::Probe(err)
    }
}
