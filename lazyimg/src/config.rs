//! INI configuration file.
//!
//! Settings live in `<config dir>/lazyimg/config.ini`:
//!
//! ```ini
//! [loader]
//! timeout_secs = 30
//! max_bytes = 33554432
//! user_agent = lazyimg/0.1.0
//!
//! [logging]
//! level = info
//! directory =
//! ```
//!
//! Missing sections and keys fall back to defaults. An empty `directory`
//! disables file logging.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::loader::LoaderConfig;
use crate::logging::LoggingConfig;

const LOADER_SECTION: &str = "loader";
const LOGGING_SECTION: &str = "logging";

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("failed to write config file {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    #[error("invalid value '{value}' for [{section}] {key}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },

    #[error("could not determine the user config directory")]
    NoConfigDir,
}

/// Default configuration file location.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("lazyimg").join("config.ini"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    loader: LoaderConfig,
    logging: LoggingConfig,
}

impl ConfigFile {
    /// Build a configuration from its parts.
    pub fn new(loader: LoaderConfig, logging: LoggingConfig) -> Self {
        Self { loader, logging }
    }

    /// Load from the default location, or defaults if the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Read {
            path: PathBuf::from("<string>"),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |reason: String| ConfigError::Write {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        self.to_ini()
            .write_to_file(path)
            .map_err(|e| write_err(e.to_string()))
    }

    /// Loader settings.
    pub fn loader(&self) -> LoaderConfig {
        self.loader.clone()
    }

    /// Logging settings.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone()
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut loader = LoaderConfig::default();
        let mut logging = LoggingConfig::default();

        if let Some(section) = ini.section(Some(LOADER_SECTION)) {
            if let Some(value) = section.get("timeout_secs") {
                loader.timeout_secs = parse_positive(LOADER_SECTION, "timeout_secs", value)?;
            }
            if let Some(value) = section.get("max_bytes") {
                loader.max_bytes = parse_positive(LOADER_SECTION, "max_bytes", value)?;
            }
            if let Some(value) = section.get("user_agent") {
                let value = value.trim();
                if value.is_empty() {
                    return Err(invalid(LOADER_SECTION, "user_agent", value));
                }
                loader.user_agent = value.to_string();
            }
        }

        if let Some(section) = ini.section(Some(LOGGING_SECTION)) {
            if let Some(value) = section.get("level") {
                let value = value.trim();
                if value.is_empty() {
                    return Err(invalid(LOGGING_SECTION, "level", value));
                }
                logging.level = value.to_string();
            }
            if let Some(value) = section.get("directory") {
                let value = value.trim();
                logging.directory = (!value.is_empty()).then(|| PathBuf::from(value));
            }
        }

        Ok(Self { loader, logging })
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some(LOADER_SECTION))
            .set("timeout_secs", self.loader.timeout_secs.to_string())
            .set("max_bytes", self.loader.max_bytes.to_string())
            .set("user_agent", self.loader.user_agent.as_str());

        let directory = self
            .logging
            .directory
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        ini.with_section(Some(LOGGING_SECTION))
            .set("level", self.logging.level.as_str())
            .set("directory", directory);
        ini
    }
}

fn invalid(section: &str, key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_positive(section: &str, key: &str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(invalid(section, key, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = ConfigFile::parse("").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_parse_all_keys() {
        let config = ConfigFile::parse(
            "[loader]\n\
             timeout_secs = 5\n\
             max_bytes = 1024\n\
             user_agent = test-agent\n\
             [logging]\n\
             level = lazyimg=debug\n\
             directory = /var/log/lazyimg\n",
        )
        .unwrap();

        let loader = config.loader();
        assert_eq!(loader.timeout_secs, 5);
        assert_eq!(loader.max_bytes, 1024);
        assert_eq!(loader.user_agent, "test-agent");

        let logging = config.logging();
        assert_eq!(logging.level, "lazyimg=debug");
        assert_eq!(logging.directory, Some(PathBuf::from("/var/log/lazyimg")));
    }

    #[test]
    fn test_empty_directory_disables_file_logging() {
        let config = ConfigFile::parse("[logging]\ndirectory =\n").unwrap();
        assert_eq!(config.logging().directory, None);
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let err = ConfigFile::parse("[loader]\ntimeout_secs = soon\n").unwrap_err();
        match err {
            ConfigError::InvalidValue {
                section,
                key,
                value,
            } => {
                assert_eq!(section, "loader");
                assert_eq!(key, "timeout_secs");
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {}", other),
        }

        assert!(ConfigFile::parse("[loader]\nmax_bytes = 0\n").is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.ini");

        let config = ConfigFile::new(
            LoaderConfig::default().with_timeout_secs(12),
            LoggingConfig::default()
                .with_level("warn")
                .with_directory(temp_dir.path().join("logs")),
        );
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConfigFile::load_from(&temp_dir.path().join("absent.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
