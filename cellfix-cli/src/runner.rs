//! Shared command setup: configuration, logging, application start.

use std::path::PathBuf;

use cellfix::app::{AppConfig, CellfixApp};
use cellfix::logging::{init_logging, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Loaded configuration plus the logging guard for one CLI invocation.
pub struct CliRunner {
    config: AppConfig,
    _logging: Option<LoggingGuard>,
}

impl CliRunner {
    /// Loads the config file, applies `--db`, and starts logging.
    ///
    /// A log directory that cannot be created disables file logging but does
    /// not stop the command.
    pub fn new(db: Option<PathBuf>, verbose: bool) -> Result<Self, CliError> {
        let mut config = AppConfig::load()?;
        if let Some(db) = db {
            config = config.with_store_path(db);
        }

        let logging = match init_logging(&config.log_directory, &config.log_file, verbose) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Warning: file logging disabled: {}", e);
                None
            }
        };

        Ok(Self {
            config,
            _logging: logging,
        })
    }

    /// Log the command being run.
    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = cellfix::VERSION,
            store = %self.config.store_path.display(),
            "cellfix starting"
        );
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Start the application with `config`, usually derived from
    /// [`config`](Self::config).
    pub fn start_app(&self, config: AppConfig) -> Result<CellfixApp, CliError> {
        Ok(CellfixApp::start_sync(config)?)
    }
}
