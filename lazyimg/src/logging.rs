//! Tracing subscriber setup.
//!
//! Installs a global `tracing` subscriber with:
//!
//! - an [`EnvFilter`] built from `RUST_LOG` when set, otherwise from the
//!   configured level directive
//! - a human-readable stderr layer with local `HH:MM:SS.mmm` timestamps
//! - optionally, a non-blocking daily-rolling file layer
//!
//! Library code only emits events; installing the subscriber is left to the
//! binary.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use time::macros::format_description;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log file name prefix; files are suffixed with the date.
pub const DEFAULT_LOG_FILE_PREFIX: &str = "lazyimg.log";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("cannot create log directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Directory for rolling log files; `None` logs to stderr only.
    pub directory: Option<PathBuf>,
    /// Log file name prefix.
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
            file_prefix: DEFAULT_LOG_FILE_PREFIX.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Replace the level directive.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Also write to rolling files under `directory`.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }
}

/// Keeps the background file writer alive.
///
/// Buffered lines are flushed when the guard is dropped, so hold it for the
/// lifetime of the program.
#[derive(Debug)]
pub struct LoggingGuard {
    file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// Whether a file layer was installed.
    pub fn has_file_writer(&self) -> bool {
        self.file_guard.is_some()
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if the level directive does not parse, the log directory cannot be
/// created, or a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(&config.level, std::env::var("RUST_LOG").ok().as_deref())?;

    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        offset,
        format_description!("[hour]:[minute]:[second].[subsecond digits:3]"),
    );

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(timer.clone())
        .with_target(false);

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory).map_err(|source| LoggingError::Directory {
                path: directory.clone(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_timer(timer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard { file_guard: guard })
}

/// Build the filter, preferring a non-empty `RUST_LOG` value over `level`.
fn build_filter(level: &str, env: Option<&str>) -> Result<EnvFilter, LoggingError> {
    let directive = match env {
        Some(env) if !env.trim().is_empty() => env,
        _ => level,
    };
    EnvFilter::try_new(directive).map_err(|e| LoggingError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.directory, None);
        assert_eq!(config.file_prefix, "lazyimg.log");
    }

    #[test]
    fn test_build_filter_from_level() {
        let filter = build_filter("lazyimg=debug,warn", None).unwrap();
        assert!(filter.to_string().contains("lazyimg=debug"));
    }

    #[test]
    fn test_build_filter_prefers_env() {
        let filter = build_filter("info", Some("trace")).unwrap();
        assert_eq!(filter.to_string(), "trace");

        let filter = build_filter("debug", Some("  ")).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn test_build_filter_rejects_garbage() {
        let err = build_filter("lazyimg=notalevel", None).unwrap_err();
        assert!(matches!(err, LoggingError::InvalidFilter { .. }));
        assert!(err.to_string().contains("lazyimg=notalevel"));
    }

    #[test]
    fn test_init_logging_installs_once() {
        let temp_dir = TempDir::new().unwrap();
        let directory = temp_dir.path().join("logs");
        let config = LoggingConfig::default()
            .with_level("debug")
            .with_directory(&directory);

        let guard = init_logging(&config).unwrap();
        assert!(guard.has_file_writer());
        assert!(directory.is_dir());

        let err = init_logging(&LoggingConfig::default()).unwrap_err();
        assert!(matches!(err, LoggingError::AlreadyInitialized(_)));
    }
}
