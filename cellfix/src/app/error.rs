//! Application error types.

use std::fmt;

use crate::resolver::ResolveError;
use crate::store::StoreError;

/// Errors that can occur during application lifecycle.
#[derive(Debug)]
pub enum AppError {
    /// Failed to open or read the tower database.
    Store(StoreError),

    /// A direct lookup failed.
    Resolve(ResolveError),

    /// Configuration error.
    Config(String),

    /// Failed to create the Tokio runtime.
    RuntimeCreation(String),

    /// The user interrupted a running attempt.
    Interrupted,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Store(e) => write!(f, "Tower database error: {}", e),
            AppError::Resolve(e) => write!(f, "Lookup failed: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::RuntimeCreation(msg) => {
                write!(f, "Failed to create Tokio runtime: {}", msg)
            }
            AppError::Interrupted => write!(f, "Interrupted"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Store(e) => Some(e),
            AppError::Resolve(e) => Some(e),
            AppError::Config(_) | AppError::RuntimeCreation(_) | AppError::Interrupted => None,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        AppError::Resolve(e)
    }
}
