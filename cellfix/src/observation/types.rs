//! Observation provider trait and errors.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::cell::{CellError, CellObservation};
use crate::BoxFuture;

/// Errors raised while acquiring an observation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Opaque failure message from the radio layer.
    #[error("{0}")]
    Radio(String),

    /// No registered LTE cell was visible.
    #[error("No cell information available")]
    NoServingCell,

    /// The observation source could not be read.
    #[error("failed to read observation from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The observation source was read but could not be parsed.
    #[error("malformed observation: {0}")]
    Malformed(String),

    /// The observation parsed but failed validation.
    #[error("invalid observation: {0}")]
    Invalid(#[from] CellError),

    /// The provider did not answer within the configured bound.
    #[error("no observation within {}ms", .0.as_millis())]
    TimedOut(Duration),
}

/// Single-shot source of cell observations.
///
/// Each call to [`fetch_one`](Self::fetch_one) is independent. The caller
/// never issues overlapping calls on the same provider.
pub trait ObservationProvider: Send + Sync {
    /// Fetches one observation of the serving cell.
    fn fetch_one(&self) -> BoxFuture<'_, Result<CellObservation, ProviderError>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
