//! CLI error types.

use std::fmt;

use cellfix::app::AppError;
use cellfix::cell::CellKey;
use cellfix::config::ConfigError;
use cellfix::session::Failure;

/// Errors reported by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration file or key problem.
    Config(String),

    /// Invalid combination of command-line arguments.
    Usage(String),

    /// Application failed to start or an operation failed outright.
    App(AppError),

    /// The acquisition attempt ended in `Failed`.
    LocateFailed(Failure),

    /// Direct lookup found no record.
    NotFound(CellKey),
}

impl CliError {
    /// Process exit status for this error.
    ///
    /// A finished attempt that failed is distinguished from errors that
    /// kept the command from running at all.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::LocateFailed(_) | CliError::NotFound(_) => 2,
            CliError::App(AppError::Interrupted) => 130,
            CliError::Config(_) | CliError::Usage(_) | CliError::App(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::App(e) => write!(f, "{}", e),
            CliError::LocateFailed(failure) => {
                write!(f, "Location unavailable: {}", failure.reason())
            }
            CliError::NotFound(key) => write!(f, "No tower record for cell {}", key),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::App(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}
