//! `ConfigFile` loading, saving and default locations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::session::DEFAULT_OBSERVATION_TIMEOUT_SECS;

/// Default tower database file name inside the data directory.
pub const DEFAULT_STORE_FILE: &str = "celltowers.db";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "cellfix.log";

const APP_DIR: &str = "cellfix";
const CONFIG_FILE: &str = "config.ini";

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    #[error("failed to write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// `[store]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    /// Path to the read-only tower database.
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: data_directory().join(DEFAULT_STORE_FILE),
        }
    }
}

/// `[session]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Seconds to wait for a cell observation.
    pub observation_timeout: u64,
    /// Seconds to wait for a capability answer. `None` waits indefinitely.
    pub capability_timeout: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            observation_timeout: DEFAULT_OBSERVATION_TIMEOUT_SECS,
            capability_timeout: None,
        }
    }
}

impl SessionSettings {
    pub fn observation_timeout(&self) -> Duration {
        Duration::from_secs(self.observation_timeout)
    }

    pub fn capability_timeout(&self) -> Option<Duration> {
        self.capability_timeout.map(Duration::from_secs)
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: data_directory().join("logs"),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub store: StoreSettings,
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Loads from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();

        if let Some(section) = ini.section(Some("store")) {
            if let Some(v) = non_empty(section.get("path")) {
                config.store.path = expand_tilde(v);
            }
        }

        if let Some(section) = ini.section(Some("session")) {
            if let Some(v) = non_empty(section.get("observation_timeout")) {
                config.session.observation_timeout = parse_secs("session.observation_timeout", v)?;
            }
            if let Some(v) = non_empty(section.get("capability_timeout")) {
                config.session.capability_timeout =
                    Some(parse_secs("session.capability_timeout", v)?);
            }
        }

        if let Some(section) = ini.section(Some("logging")) {
            if let Some(v) = non_empty(section.get("directory")) {
                config.logging.directory = expand_tilde(v);
            }
            if let Some(v) = non_empty(section.get("file")) {
                config.logging.file = v.to_string();
            }
        }

        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Saves to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Saves to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some("store"))
            .set("path", self.store.path.to_string_lossy());
        ini.with_section(Some("session"))
            .set(
                "observation_timeout",
                self.session.observation_timeout.to_string(),
            )
            .set(
                "capability_timeout",
                self.session
                    .capability_timeout
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
            );
        ini.with_section(Some("logging"))
            .set("directory", self.logging.directory.to_string_lossy())
            .set("file", self.logging.file.as_str());

        ini.write_to_file(path).map_err(write_err)
    }
}

/// Directory holding `config.ini`.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Full path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE)
}

/// Directory holding the tower database and logs by default.
pub fn data_directory() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(super) fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    let secs: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: "expected a whole number of seconds".to_string(),
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(secs)
}

pub(super) fn expand_tilde(value: &str) -> PathBuf {
    match value.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(value)),
        None => PathBuf::from(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.session.observation_timeout, 10);
        assert_eq!(config.session.capability_timeout, None);
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.store.path = PathBuf::from("/data/towers.db");
        config.session.observation_timeout = 3;
        config.session.capability_timeout = Some(30);
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_empty_values_keep_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(
            &path,
            "[session]\nobservation_timeout =\ncapability_timeout =\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.session, SessionSettings::default());
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[session]\nobservation_timeout = soon\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("session.observation_timeout"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(parse_secs("session.observation_timeout", "0").is_err());
        assert_eq!(parse_secs("session.observation_timeout", " 7 ").unwrap(), 7);
    }

    #[test]
    fn test_session_durations() {
        let settings = SessionSettings {
            observation_timeout: 4,
            capability_timeout: Some(2),
        };
        assert_eq!(settings.observation_timeout(), Duration::from_secs(4));
        assert_eq!(settings.capability_timeout(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_config_file_path_ends_with_app_dir() {
        let path = config_file_path();
        assert!(path.ends_with("cellfix/config.ini"));
    }
}
