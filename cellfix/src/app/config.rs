//! Application configuration for CellfixApp.
//!
//! `AppConfig` is the resolved view of the configuration file plus any
//! command-line overrides. It is what [`CellfixApp`](super::CellfixApp)
//! needs to open the tower database and drive a session.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::AppError;
use crate::config::{config_file_path, ConfigFile, DEFAULT_LOG_FILE};
use crate::session::SessionConfig;

/// Application configuration combining all component configs.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Path to the read-only tower database.
    pub store_path: PathBuf,

    /// Timeouts for one acquisition attempt.
    pub session: SessionConfig,

    /// Directory for the log file.
    pub log_directory: PathBuf,

    /// Log file name.
    pub log_file: String,
}

impl AppConfig {
    /// Create a config for `store_path` with default session settings.
    ///
    /// Logs go to a `logs` directory next to the database.
    pub fn new(store_path: PathBuf) -> Self {
        let log_directory = store_path
            .parent()
            .map(|dir| dir.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"));
        Self {
            store_path,
            session: SessionConfig::default(),
            log_directory,
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }

    /// Create application config from the configuration file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            store_path: config.store.path.clone(),
            session: SessionConfig::default()
                .with_observation_timeout(config.session.observation_timeout())
                .with_capability_timeout(config.session.capability_timeout()),
            log_directory: config.logging.directory.clone(),
            log_file: config.logging.file.clone(),
        }
    }

    /// Load from the default configuration file.
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(&config_file_path())
    }

    /// Load from the configuration file at `path`. A missing file yields
    /// the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the file cannot be read or holds an
    /// invalid value.
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        let file = ConfigFile::load_from(path).map_err(|e| AppError::Config(e.to_string()))?;
        Ok(Self::from_config_file(&file))
    }

    /// Override the database path.
    pub fn with_store_path(mut self, path: PathBuf) -> Self {
        self.store_path = path;
        self
    }

    /// Override the observation timeout.
    pub fn with_observation_timeout(mut self, timeout: Duration) -> Self {
        self.session = self.session.with_observation_timeout(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_new() {
        let config = AppConfig::new(PathBuf::from("/data/cellfix/celltowers.db"));
        assert_eq!(config.log_directory, PathBuf::from("/data/cellfix/logs"));
        assert_eq!(config.log_file, "cellfix.log");
        assert_eq!(config.session.observation_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.store.path = PathBuf::from("/srv/towers.db");
        file.session.observation_timeout = 3;
        file.session.capability_timeout = Some(20);

        let config = AppConfig::from_config_file(&file);
        assert_eq!(config.store_path, PathBuf::from("/srv/towers.db"));
        assert_eq!(config.session.observation_timeout, Duration::from_secs(3));
        assert_eq!(
            config.session.capability_timeout,
            Some(Duration::from_secs(20))
        );
    }

    #[test]
    fn test_load_from_invalid_file_is_config_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[session]\nobservation_timeout = soon\n").unwrap();

        match AppConfig::load_from(&path) {
            Err(AppError::Config(msg)) => assert!(msg.contains("observation_timeout"), "{}", msg),
            other => panic!("expected a config error, got {:?}", other.map(|c| c.store_path)),
        }
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load_from(&temp.path().join("absent.ini")).unwrap();
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::new(PathBuf::from("a.db"))
            .with_store_path(PathBuf::from("b.db"))
            .with_observation_timeout(Duration::from_secs(1));

        assert_eq!(config.store_path, PathBuf::from("b.db"));
        assert_eq!(config.session.observation_timeout, Duration::from_secs(1));
    }
}
